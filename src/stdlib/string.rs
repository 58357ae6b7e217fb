use std::cell::RefCell;
use std::collections::hash_map::Entry;

use regex::Regex;
use rustc_hash::FxHashMap;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::native::{check_arity_min, expect_str, take_args};
use crate::numeric::Decimal;
use crate::token::Token;

use super::{builtin, define, loose_eq};

/// Distinct patterns held before the cache starts over.
const REGEX_CACHE_CAPACITY: usize = 256;

thread_local! {
    /// Compiled patterns for `~`, keyed by source text.
    static REGEX_CACHE: RefCell<FxHashMap<String, Regex>> = RefCell::new(FxHashMap::default());
}

fn with_regex<R>(pattern: &str, f: impl FnOnce(&Regex) -> R) -> Result<R> {
    REGEX_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();
        if cache.len() >= REGEX_CACHE_CAPACITY && !cache.contains_key(pattern) {
            cache.clear();
        }
        let regex = match cache.entry(pattern.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(
                Regex::new(pattern)
                    .map_err(|e| Error::invalid_argument(format!("~: invalid pattern: {e}")))?,
            ),
        };
        Ok(f(regex))
    })
}

// ============================================================================
// Concatenation
// ============================================================================

/// Concatenate the text of every argument
/// Usage: (+ "Total: " 42) => "Total: 42"
pub fn concat(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    Ok(Token::String(args.iter().map(Token::text).collect()))
}

// ============================================================================
// Searching
// ============================================================================

/// Whether the first string contains any of the others
/// Usage: (contains "Hello World" "World") => true
pub fn contains(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("contains", &args, 1)?;
    let haystack = expect_str("contains", &args[0])?;
    let mut found = false;
    for needle in &args[1..] {
        found |= haystack.contains(expect_str("contains", needle)?);
    }
    Ok(Token::Boolean(found))
}

/// Whether `haystack` holds `needle`: substring for strings, element for
/// lists, key for maps, equality otherwise.
fn holds(haystack: &Token, needle: &Token) -> bool {
    match haystack {
        Token::String(s) => s.contains(needle.text().as_str()),
        Token::List(items) => items.iter().any(|item| loose_eq(item, needle)),
        Token::Map(map) => map.contains_key(&needle.text()),
        other => loose_eq(other, needle),
    }
}

/// True when none of the later arguments holds the first
/// Usage: (notContains "x" "abc" "def") => true
pub fn not_contains(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("notContains", &args, 1)?;
    let needle = &args[0];
    Ok(Token::Boolean(
        !args[1..].iter().any(|haystack| holds(haystack, needle)),
    ))
}

/// Usage: (startsWith "Hello" "He") => true
pub fn starts_with(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text, prefix] = take_args("startsWith", args)?;
    let text = expect_str("startsWith", &text)?;
    Ok(Token::Boolean(text.starts_with(expect_str("startsWith", &prefix)?)))
}

/// Usage: (endsWith "Hello" "lo") => true
pub fn ends_with(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text, suffix] = take_args("endsWith", args)?;
    let text = expect_str("endsWith", &text)?;
    Ok(Token::Boolean(text.ends_with(expect_str("endsWith", &suffix)?)))
}

/// Regular expression match anywhere in the text
/// Usage: (~ "order-1234" "^order-[0-9]+$") => true
pub fn matches(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text, pattern] = take_args("~", args)?;
    let text = expect_str("~", &text)?;
    let pattern = expect_str("~", &pattern)?;
    Ok(Token::Boolean(with_regex(pattern, |regex| {
        regex.is_match(text)
    })?))
}

// ============================================================================
// Names and Splitting
// ============================================================================

/// Usage: (firstName "Ada King Lovelace") => "Ada"
pub fn first_name(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [name] = take_args("firstName", args)?;
    let name = expect_str("firstName", &name)?;
    Ok(Token::string(name.split_whitespace().next().unwrap_or_default()))
}

/// Usage: (lastName "Ada King Lovelace") => "Lovelace"
pub fn last_name(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [name] = take_args("lastName", args)?;
    let name = expect_str("lastName", &name)?;
    Ok(Token::string(name.split_whitespace().next_back().unwrap_or_default()))
}

/// Split on a separator; each part is typed by inference
/// Usage: (split "1,2,x" ",") => [1, 2, "x"]
pub fn split(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text, separator] = take_args("split", args)?;
    let text = expect_str("split", &text)?;
    let separator = expect_str("split", &separator)?;
    if separator.is_empty() {
        return Err(Error::invalid_argument("split: empty separator"));
    }
    Ok(Token::List(
        text.split(separator).map(Token::from_text).collect(),
    ))
}

/// Number of user-perceived characters
/// Usage: (count "héllo") => 5
pub fn count(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text] = take_args("count", args)?;
    let text = expect_str("count", &text)?;
    Ok(Token::Decimal(Decimal::from(text.graphemes(true).count())))
}

/// Usage: (reverse "abc") => "cba"
pub fn reverse(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [text] = take_args("reverse", args)?;
    let text = expect_str("reverse", &text)?;
    Ok(Token::String(text.graphemes(true).rev().collect()))
}

// ============================================================================
// Registration
// ============================================================================

pub(super) fn register(interp: &mut Interpreter<'_>) {
    const S: Kind = Kind::STRING;
    const B: Kind = Kind::BOOLEAN;

    define(
        interp,
        builtin("concat", &[Kind::ATOM], S)
            .variadic()
            .describe("Concatenated text of the arguments")
            .example("(concat \"a\" 1 true)"),
        concat,
    );
    // Registered after the arithmetic `+` so it is tried first
    define(
        interp,
        builtin("+", &[S, Kind::ATOM], S)
            .variadic()
            .describe("A string followed by the text of the other arguments")
            .example("(+ \"Total: \" 42)"),
        concat,
    );
    define(
        interp,
        builtin("contains", &[S, S], B)
            .variadic()
            .describe("Whether the first string contains any of the others")
            .example("(contains \"Hello World\" \"World\")"),
        contains,
    );
    define(
        interp,
        builtin("notContains", &[Kind::ATOM, Kind::VALUE], B)
            .variadic()
            .describe("Whether none of the later arguments contains the first")
            .example("(notContains \"x\" \"abc\" \"def\")"),
        not_contains,
    );
    define(
        interp,
        builtin("startsWith", &[S, S], B)
            .describe("Whether the string starts with the prefix")
            .example("(startsWith \"Hello\" \"He\")"),
        starts_with,
    );
    define(
        interp,
        builtin("endsWith", &[S, S], B)
            .describe("Whether the string ends with the suffix")
            .example("(endsWith \"Hello\" \"lo\")"),
        ends_with,
    );
    define(
        interp,
        builtin("~", &[S, S], B)
            .describe("Whether the regular expression matches the string")
            .example("(~ \"order-1234\" \"^order-[0-9]+$\")"),
        matches,
    );
    define(
        interp,
        builtin("firstName", &[S], S)
            .describe("First word of a full name")
            .example("(firstName \"Ada King Lovelace\")"),
        first_name,
    );
    define(
        interp,
        builtin("lastName", &[S], S)
            .describe("Last word of a full name")
            .example("(lastName \"Ada King Lovelace\")"),
        last_name,
    );
    define(
        interp,
        builtin("split", &[S, S], Kind::LIST)
            .describe("Parts of the string between separators")
            .example("(split \"a,b\" \",\")"),
        split,
    );
    define(
        interp,
        builtin("count", &[S], Kind::DECIMAL)
            .describe("Number of characters as a reader perceives them")
            .example("(count \"héllo\")"),
        count,
    );
    define(
        interp,
        builtin("reverse", &[S], S)
            .describe("The characters in reverse order")
            .example("(reverse \"abc\")"),
        reverse,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regex_cache_reports_invalid_patterns() {
        assert!(with_regex("(", |_| ()).is_err());
        assert!(with_regex("^a", |r| r.is_match("abc")).unwrap());
        REGEX_CACHE.with(|cache| assert!(cache.borrow().contains_key("^a")));
    }

    #[test]
    fn test_regex_cache_is_bounded() {
        for i in 0..REGEX_CACHE_CAPACITY * 2 + 3 {
            let pattern = format!("^a{i}$");
            assert!(with_regex(&pattern, |r| r.is_match(&format!("a{i}"))).unwrap());
            REGEX_CACHE.with(|cache| assert!(cache.borrow().len() <= REGEX_CACHE_CAPACITY));
        }
    }

    #[test]
    fn test_holds_by_haystack_kind() {
        assert!(holds(&Token::string("abc"), &Token::string("b")));
        assert!(holds(&Token::List(vec![Token::from(1)]), &Token::string("1")));
        assert!(holds(&Token::map([("k", Token::Null)]), &Token::string("k")));
        assert!(!holds(&Token::from(2), &Token::from(1)));
    }
}
