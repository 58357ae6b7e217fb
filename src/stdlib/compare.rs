use std::cmp::Ordering;

use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::native::{expect_decimal, kind_mismatch, take_args};
use crate::token::Token;

use super::{builtin, define};

// ============================================================================
// Equality and Ordering
// ============================================================================

/// Kind-aware equality. Atoms of different kinds compare after the string
/// side is re-read as a typed atom, so `1` equals `"1"`.
pub(crate) fn loose_eq(a: &Token, b: &Token) -> bool {
    if a.kind() == b.kind() {
        return a == b;
    }
    match (a, b) {
        (Token::String(s), other) | (other, Token::String(s)) => &Token::from_text(s) == other,
        _ => false,
    }
}

/// Order two atoms of the same kind.
pub(crate) fn compare_atoms(a: &Token, b: &Token) -> Option<Ordering> {
    match (a, b) {
        (Token::Decimal(x), Token::Decimal(y)) => Some(x.cmp(y)),
        (Token::String(x), Token::String(y)) => Some(x.cmp(y)),
        (Token::Time(x), Token::Time(y)) => Some(x.cmp(y)),
        (Token::Boolean(x), Token::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Usage: (= 1 "1") => true
pub fn eq(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [a, b] = take_args("=", args)?;
    Ok(Token::Boolean(loose_eq(&a, &b)))
}

/// Usage: (!= 1 2) => true
pub fn ne(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [a, b] = take_args("!=", args)?;
    Ok(Token::Boolean(!loose_eq(&a, &b)))
}

/// Build an ordering comparison shared by the decimal, time and string
/// overloads of one operator.
fn ordering(
    name: &'static str,
    test: fn(Ordering) -> bool,
) -> impl Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token> + 'static {
    move |_interp: &mut Interpreter<'_>, args: Vec<Token>| {
        let [a, b] = take_args(name, args)?;
        let order = compare_atoms(&a, &b).ok_or_else(|| kind_mismatch(name, a.kind(), &b))?;
        Ok(Token::Boolean(test(order)))
    }
}

/// Inclusive range test
/// Usage: (between 5 1 10) => true
pub fn between(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value, low, high] = take_args("between", args)?;
    let value = expect_decimal("between", &value)?;
    let low = expect_decimal("between", &low)?;
    let high = expect_decimal("between", &high)?;
    Ok(Token::Boolean(low <= value && value <= high))
}

// ============================================================================
// Logic
// ============================================================================

/// Short-circuit conjunction over truthiness
/// Usage: (and (> 2 1) (. Enabled)) => true
pub fn and(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    for arg in args {
        if !interp.eval(arg)?.is_truthy() {
            return Ok(Token::Boolean(false));
        }
    }
    Ok(Token::Boolean(true))
}

/// Short-circuit disjunction over truthiness
/// Usage: (or false (list)) => true
pub fn or(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    for arg in args {
        if interp.eval(arg)?.is_truthy() {
            return Ok(Token::Boolean(true));
        }
    }
    Ok(Token::Boolean(false))
}

// ============================================================================
// Registration
// ============================================================================

pub(super) fn register(interp: &mut Interpreter<'_>) {
    const V: Kind = Kind::VALUE;
    const B: Kind = Kind::BOOLEAN;

    define(
        interp,
        builtin("=", &[V, V], B)
            .describe("Equality; a string compares equal to the atom it spells")
            .example("(= 1 \"1\")"),
        eq,
    );
    define(
        interp,
        builtin("!=", &[V, V], B)
            .describe("Negated equality")
            .example("(!= 1 2)"),
        ne,
    );

    let operators: [(&'static str, fn(Ordering) -> bool); 4] = [
        (">", Ordering::is_gt),
        ("<", Ordering::is_lt),
        (">=", Ordering::is_ge),
        ("<=", Ordering::is_le),
    ];
    for (name, test) in operators {
        for kind in [Kind::STRING, Kind::TIME, Kind::DECIMAL] {
            define(
                interp,
                builtin(name, &[kind, kind], B)
                    .describe(format!("Compare two {kind} values"))
                    .example(format!("({name} 2 1)")),
                ordering(name, test),
            );
        }
    }

    define(
        interp,
        builtin("between", &[Kind::DECIMAL; 3], B)
            .describe("Whether the first argument lies within the inclusive range of the other two")
            .example("(between 5 1 10)"),
        between,
    );
    define(
        interp,
        builtin("and", &[Kind::ANY], B)
            .variadic()
            .describe("True when every argument is truthy; stops at the first that is not")
            .example("(and true (> 2 1))"),
        and,
    );
    define(
        interp,
        builtin("or", &[Kind::ANY], B)
            .variadic()
            .describe("True when any argument is truthy; stops at the first that is")
            .example("(or false true)"),
        or,
    );
}
