use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::native::{
    check_arity_min, expect_decimal, expect_index, expect_str, into_list, kind_mismatch,
    take_args,
};
use crate::numeric::Decimal;
use crate::token::Token;

use super::{builtin, compare_atoms, define, eval_with, iteration, loose_eq};

// ============================================================================
// Construction and Access
// ============================================================================

/// Usage: (list 1 2 3) => [1, 2, 3]
pub fn list(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    Ok(Token::List(args))
}

/// First element, or null for an empty list
/// Usage: (head (list 1 2)) => 1
pub fn head(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list] = take_args("head", args)?;
    Ok(into_list("head", list)?.into_iter().next().unwrap_or_default())
}

/// Every element but the first
/// Usage: (tail (list 1 2 3)) => [2, 3]
pub fn tail(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list] = take_args("tail", args)?;
    Ok(Token::List(into_list("tail", list)?.into_iter().skip(1).collect()))
}

/// Usage: (drop (list 1 2 3) 2) => [3]
pub fn drop(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list, count] = take_args("drop", args)?;
    let count = expect_index("drop", &count)?;
    Ok(Token::List(into_list("drop", list)?.into_iter().skip(count).collect()))
}

/// Usage: (item (list a b c) 1) => "b"
pub fn item(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list, index] = take_args("item", args)?;
    let index = expect_index("item", &index)?;
    let mut items = into_list("item", list)?;
    if index >= items.len() {
        return Err(Error::invalid_argument(format!(
            "item: index {index} out of range for a list of {}",
            items.len()
        )));
    }
    Ok(items.swap_remove(index))
}

/// Append the remaining arguments to a copy of the list
/// Usage: (push (list 1) 2 3) => [1, 2, 3]
pub fn push(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("push", &args, 1)?;
    let mut args = args.into_iter();
    let mut items = into_list("push", args.next().unwrap_or_default())?;
    items.extend(args);
    Ok(Token::List(items))
}

/// Like `push`, but list arguments are spliced in element by element
/// Usage: (append (list 1) (list 2 3) 4) => [1, 2, 3, 4]
pub fn append(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("append", &args, 1)?;
    let mut args = args.into_iter();
    let mut items = into_list("append", args.next().unwrap_or_default())?;
    for arg in args {
        match arg {
            Token::List(more) => items.extend(more),
            other => items.push(other),
        }
    }
    Ok(Token::List(items))
}

/// Usage: (count (list 1 2)) => 2
pub fn count(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [collection] = take_args("count", args)?;
    match &collection {
        Token::List(items) => Ok(Token::from(Decimal::from(items.len()))),
        Token::Map(map) => Ok(Token::from(Decimal::from(map.len()))),
        other => Err(kind_mismatch("count", Kind::COLLECTION, other)),
    }
}

/// Usage: (reverse (list 1 2 3)) => [3, 2, 1]
pub fn reverse(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list] = take_args("reverse", args)?;
    let mut items = into_list("reverse", list)?;
    items.reverse();
    Ok(Token::List(items))
}

/// Concatenate the text of every element
/// Usage: (join (list a b) ", ") => "a, b"
pub fn join(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("join", &args, 1)?;
    let separator = match args.get(1) {
        Some(separator) => expect_str("join", separator)?.to_string(),
        None => String::new(),
    };
    let items = into_list("join", args.into_iter().next().unwrap_or_default())?;
    let parts: Vec<String> = items.iter().map(Token::text).collect();
    Ok(Token::String(parts.join(&separator)))
}

/// Null, an empty string and an empty collection are empty
/// Usage: (isEmpty (list)) => true
pub fn is_empty(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value] = take_args("isEmpty", args)?;
    let empty = match &value {
        Token::Null => true,
        Token::String(s) => s.is_empty(),
        Token::List(items) => items.is_empty(),
        Token::Map(map) => map.is_empty(),
        _ => false,
    };
    Ok(Token::Boolean(empty))
}

// ============================================================================
// Ordering and Aggregates
// ============================================================================

/// Sort atoms of one kind
/// Usage: (sort (list 3 1 2)) => [1, 2, 3]
pub fn sort(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list] = take_args("sort", args)?;
    let mut items = into_list("sort", list)?;
    sort_tokens("sort", &mut items)?;
    Ok(Token::List(items))
}

fn sort_tokens(name: &str, items: &mut [Token]) -> Result<()> {
    if let Some(first) = items.first()
        && let Some(odd) = items
            .iter()
            .find(|item| compare_atoms(first, item).is_none())
    {
        return Err(kind_mismatch(name, first.kind(), odd));
    }
    items.sort_by(|a, b| compare_atoms(a, b).unwrap_or(Ordering::Equal));
    Ok(())
}

fn decimals<'a>(name: &str, items: &'a [Token]) -> Result<Vec<&'a Decimal>> {
    items.iter().map(|item| expect_decimal(name, item)).collect()
}

fn extreme(name: &str, values: Vec<&Decimal>, pick: Ordering) -> Result<Token> {
    values
        .into_iter()
        .reduce(|best, next| if next.cmp(best) == pick { next } else { best })
        .map(|best| Token::Decimal(best.clone()))
        .ok_or_else(|| Error::invalid_argument(format!("{name}: empty list")))
}

/// Usage: (min (list 3 1 2)) => 1
pub fn min_of_list(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list] = take_args("min", args)?;
    let items = into_list("min", list)?;
    extreme("min", decimals("min", &items)?, Ordering::Less)
}

/// Usage: (max (list 3 1 2)) => 3
pub fn max_of_list(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list] = take_args("max", args)?;
    let items = into_list("max", list)?;
    extreme("max", decimals("max", &items)?, Ordering::Greater)
}

/// Usage: (min 3 1 2) => 1
pub fn min(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    extreme("min", decimals("min", &args)?, Ordering::Less)
}

/// Usage: (max 3 1 2) => 3
pub fn max(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    extreme("max", decimals("max", &args)?, Ordering::Greater)
}

/// Usage: (sum (list 1 2 3)) => 6
pub fn sum(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [list] = take_args("sum", args)?;
    let items = into_list("sum", list)?;
    let total = decimals("sum", &items)?
        .into_iter()
        .fold(Decimal::zero(), |acc, value| acc.add(value));
    Ok(Token::Decimal(total))
}

// ============================================================================
// Iterators
// ============================================================================

/// Evaluate the body once per element, binding the element to the name
/// Usage: (map (. Items) x (. x Price)) => [...]
pub fn map(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let (items, name, body) = iteration("map", args)?;
    let results = items
        .into_iter()
        .map(|item| eval_with(interp, &name, item, body.clone()))
        .collect::<Result<Vec<_>>>()?;
    Ok(Token::List(results))
}

/// Usage: (exists (. List) x (= (. x SKU) "X")) => true
pub fn exists(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let (items, name, body) = iteration("exists", args)?;
    for item in items {
        if eval_with(interp, &name, item, body.clone())?.is_truthy() {
            return Ok(Token::Boolean(true));
        }
    }
    Ok(Token::Boolean(false))
}

/// Usage: (every (. List) x (> (. x Qty) 0)) => true
pub fn every(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let (items, name, body) = iteration("every", args)?;
    for item in items {
        if !eval_with(interp, &name, item, body.clone())?.is_truthy() {
            return Ok(Token::Boolean(false));
        }
    }
    Ok(Token::Boolean(true))
}

/// Sum of the body evaluated per element
/// Usage: (sum (. Cart) x (* (. x Price) (. x Qty))) => 42
pub fn sum_by(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let (items, name, body) = iteration("sum", args)?;
    let mut total = Decimal::zero();
    for item in items {
        let value = eval_with(interp, &name, item, body.clone())?;
        total = total.add(expect_decimal("sum", &value)?);
    }
    Ok(Token::Decimal(total))
}

/// Stable sort of the elements by a key computed per element.
fn sort_by_key(
    interp: &mut Interpreter<'_>,
    name: &str,
    key_kind: Kind,
    args: Vec<Token>,
) -> Result<Token> {
    let (items, variable, body) = iteration(name, args)?;
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let key = eval_with(interp, &variable, item.clone(), body.clone())?;
        if !key_kind.accepts(key.kind()) {
            return Err(kind_mismatch(name, key_kind, &key));
        }
        keyed.push((key, item));
    }
    keyed.sort_by(|(a, _), (b, _)| compare_atoms(a, b).unwrap_or(Ordering::Equal));
    Ok(Token::List(keyed.into_iter().map(|(_, item)| item).collect()))
}

/// Usage: (sortByNumber (. Items) x (. x Price)) => [...]
pub fn sort_by_number(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    sort_by_key(interp, "sortByNumber", Kind::DECIMAL, args)
}

/// Usage: (sortByString (. People) p (. p Name)) => [...]
pub fn sort_by_string(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    sort_by_key(interp, "sortByString", Kind::STRING, args)
}

/// Whether the list holds any of the values
/// Usage: (contains (list a b) b) => true
pub fn contains(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("contains", &args, 1)?;
    let mut args = args.into_iter();
    let items = into_list("contains", args.next().unwrap_or_default())?;
    let found = args.any(|needle| items.iter().any(|item| loose_eq(item, &needle)));
    Ok(Token::Boolean(found))
}

// ============================================================================
// Registration
// ============================================================================

type IteratorFn = fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token>;

pub(super) fn register(interp: &mut Interpreter<'_>) {
    const L: Kind = Kind::LIST;
    const D: Kind = Kind::DECIMAL;
    const S: Kind = Kind::STRING;
    const V: Kind = Kind::VALUE;
    const A: Kind = Kind::ANY;

    define(
        interp,
        builtin("list", &[V], L)
            .variadic()
            .describe("A list of the arguments")
            .example("(list 1 2 3)"),
        list,
    );
    define(
        interp,
        builtin("head", &[L], V)
            .describe("First element of a list, null when empty")
            .example("(head (list 1 2))"),
        head,
    );
    define(
        interp,
        builtin("tail", &[L], L)
            .describe("Every element but the first")
            .example("(tail (list 1 2 3))"),
        tail,
    );
    define(
        interp,
        builtin("drop", &[L, D], L)
            .describe("The list without its first n elements")
            .example("(drop (list 1 2 3) 2)"),
        drop,
    );
    define(
        interp,
        builtin("item", &[L, D], V)
            .describe("Element at a zero-based index")
            .example("(item (list a b c) 1)"),
        item,
    );
    define(
        interp,
        builtin("push", &[L, V], L)
            .variadic()
            .describe("A copy of the list with the values appended")
            .example("(push (list 1) 2 3)"),
        push,
    );
    define(
        interp,
        builtin("append", &[L, V], L)
            .variadic()
            .describe("A copy of the list with the values appended, splicing lists")
            .example("(append (list 1) (list 2 3))"),
        append,
    );
    define(
        interp,
        builtin("contains", &[L, V], Kind::BOOLEAN)
            .variadic()
            .describe("Whether the list holds any of the values")
            .example("(contains (list a b) b)"),
        contains,
    );
    define(
        interp,
        builtin("count", &[Kind::COLLECTION], D)
            .describe("Number of elements or entries")
            .example("(count (list 1 2))"),
        count,
    );
    define(
        interp,
        builtin("reverse", &[L], L)
            .describe("The elements in reverse order")
            .example("(reverse (list 1 2 3))"),
        reverse,
    );
    define(
        interp,
        builtin("join", &[L], S)
            .describe("Concatenated text of the elements")
            .example("(join (list a b))"),
        join,
    );
    define(
        interp,
        builtin("join", &[L, S], S)
            .describe("Text of the elements joined by a separator")
            .example("(join (list a b) \", \")"),
        join,
    );
    define(
        interp,
        builtin("isEmpty", &[V], Kind::BOOLEAN)
            .describe("Whether the value is null, an empty string or an empty collection")
            .example("(isEmpty (list))"),
        is_empty,
    );
    define(
        interp,
        builtin("sort", &[L], L)
            .describe("Elements in ascending order; all of one kind")
            .example("(sort (list 3 1 2))"),
        sort,
    );
    define(
        interp,
        builtin("min", &[D, D], D)
            .variadic()
            .describe("Smallest of the arguments")
            .example("(min 3 1 2)"),
        min,
    );
    define(
        interp,
        builtin("max", &[D, D], D)
            .variadic()
            .describe("Largest of the arguments")
            .example("(max 3 1 2)"),
        max,
    );
    define(
        interp,
        builtin("min", &[L], D)
            .describe("Smallest element of a list of decimals")
            .example("(min (list 3 1 2))"),
        min_of_list,
    );
    define(
        interp,
        builtin("max", &[L], D)
            .describe("Largest element of a list of decimals")
            .example("(max (list 3 1 2))"),
        max_of_list,
    );
    define(
        interp,
        builtin("sum", &[L], D)
            .describe("Sum of a list of decimals")
            .example("(sum (list 1 2 3))"),
        sum,
    );

    // Iterators, each in its `list name body` and legacy `list ((name) body)` form
    let iterators: [(&str, Kind, IteratorFn, &str, &str); 6] = [
        (
            "map",
            L,
            map,
            "The body evaluated once per element",
            "(map (. Items) x (. x Price))",
        ),
        (
            "exists",
            Kind::BOOLEAN,
            exists,
            "Whether the body holds for some element",
            "(exists (. Items) x (= (. x SKU) \"X\"))",
        ),
        (
            "every",
            Kind::BOOLEAN,
            every,
            "Whether the body holds for every element",
            "(every (. Items) x (> (. x Qty) 0))",
        ),
        (
            "sum",
            D,
            sum_by,
            "Sum of the body evaluated per element",
            "(sum (. Items) x (. x Price))",
        ),
        (
            "sortByNumber",
            L,
            sort_by_number,
            "Elements ordered by a decimal key",
            "(sortByNumber (. Items) x (. x Price))",
        ),
        (
            "sortByString",
            L,
            sort_by_string,
            "Elements ordered by a string key",
            "(sortByString (. Items) x (. x Name))",
        ),
    ];
    for (name, returns, body, description, example) in iterators {
        define(
            interp,
            builtin(name, &[L, A], returns)
                .describe(description)
                .example(example),
            body,
        );
        define(
            interp,
            builtin(name, &[L, S, A], returns)
                .describe(description)
                .example(example),
            body,
        );
    }
}
