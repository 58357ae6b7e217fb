use crate::error::Result;
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::native::{check_arity_min, expect_decimal, take_args};
use crate::numeric::Decimal;
use crate::token::Token;

use super::{builtin, define};

// ============================================================================
// Arithmetic Operations
// ============================================================================

/// Fold the decimal arguments left to right with `op`.
fn fold(
    name: &str,
    args: &[Token],
    op: impl Fn(&Decimal, &Decimal) -> Result<Decimal>,
) -> Result<Token> {
    check_arity_min(name, args, 1)?;
    let mut acc = expect_decimal(name, &args[0])?.clone();
    for arg in &args[1..] {
        acc = op(&acc, expect_decimal(name, arg)?)?;
    }
    Ok(Token::Decimal(acc))
}

/// Addition
/// Usage: (+ 1 2 3) => 6
pub fn add(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    fold("+", &args, |a, b| Ok(a.add(b)))
}

/// Subtraction; a single argument is negated
/// Usage: (- 10 3) => 7, (- 4) => -4
pub fn sub(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    if let [only] = args.as_slice() {
        return Ok(Token::Decimal(expect_decimal("-", only)?.neg()));
    }
    fold("-", &args, |a, b| Ok(a.sub(b)))
}

/// Multiplication
/// Usage: (* 2 3 4) => 24
pub fn mul(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    fold("*", &args, |a, b| Ok(a.mul(b)))
}

/// Division at the interpreter's configured precision
/// Usage: (/ 1 4) => 0.25
pub fn div(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let precision = interp.config().division_precision;
    fold("/", &args, |a, b| Ok(a.quo_with_precision(b, precision)?))
}

/// Remainder, with the sign of the dividend
/// Usage: (mod 7 3) => 1
pub fn modulo(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [a, b] = take_args("mod", args)?;
    let a = expect_decimal("mod", &a)?;
    let b = expect_decimal("mod", &b)?;
    Ok(Token::Decimal(a.rem(b)?))
}

/// Usage: (floor -1.5) => -2
pub fn floor(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value] = take_args("floor", args)?;
    Ok(Token::Decimal(expect_decimal("floor", &value)?.floor()))
}

/// Usage: (ceil 1.2) => 2
pub fn ceil(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value] = take_args("ceil", args)?;
    Ok(Token::Decimal(expect_decimal("ceil", &value)?.ceil()))
}

// ============================================================================
// Registration
// ============================================================================

pub(super) fn register(interp: &mut Interpreter<'_>) {
    const D: Kind = Kind::DECIMAL;

    define(
        interp,
        builtin("+", &[D, D], D)
            .variadic()
            .describe("Sum of the arguments")
            .example("(+ 1 2 3)"),
        add,
    );
    define(
        interp,
        builtin("-", &[D, D], D)
            .variadic()
            .describe("First argument minus the rest; negation with one argument")
            .example("(- 10 3)"),
        sub,
    );
    define(
        interp,
        builtin("*", &[D, D], D)
            .variadic()
            .describe("Product of the arguments")
            .example("(* 2 3 4)"),
        mul,
    );
    define(
        interp,
        builtin("/", &[D, D], D)
            .variadic()
            .describe("First argument divided by the rest")
            .example("(/ 1 4)"),
        div,
    );
    define(
        interp,
        builtin("mod", &[D, D], D)
            .describe("Remainder of truncated division")
            .example("(mod 7 3)"),
        modulo,
    );
    define(
        interp,
        builtin("floor", &[D], D)
            .describe("Largest integer not greater than the argument")
            .example("(floor 1.5)"),
        floor,
    );
    define(
        interp,
        builtin("ceil", &[D], D)
            .describe("Smallest integer not less than the argument")
            .example("(ceil 1.5)"),
        ceil,
    );
}
