use crate::error::{Error, Result};
use crate::interpreter::{Interpreter, Template};
use crate::kind::Kind;
use crate::native::{check_arity_min, expect_str, take_args};
use crate::signature::Signature;
use crate::token::Token;

use super::{builtin, define, eval_with, legacy_lambda};

// ============================================================================
// Values
// ============================================================================

/// Usage: (noop a b) => null
pub fn noop(_interp: &mut Interpreter<'_>, _args: Vec<Token>) -> Result<Token> {
    Ok(Token::Null)
}

/// Usage: (toString 1.50) => "1.5"
pub fn to_string(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value] = take_args("toString", args)?;
    Ok(Token::String(value.text()))
}

/// Usage: (not (. Enabled)) => false
pub fn not(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value] = take_args("not", args)?;
    Ok(Token::Boolean(!value.is_truthy()))
}

/// The argument, unevaluated; the interpreter evaluates it in the caller
/// Usage: (identity (+ 1 2)) => 3
pub fn identity(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value] = take_args("identity", args)?;
    Ok(value)
}

/// Usage: (panic "unreachable rule") => error
pub fn panic(_interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let message: Vec<String> = args.iter().map(Token::text).collect();
    Err(Error::UserPanic(message.join(" ")))
}

// ============================================================================
// Control Flow
// ============================================================================

/// Evaluate the second argument; on any error evaluate the first instead
/// Usage: (catch 22 (panic)) => 22
pub fn catch(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [fallback, attempt] = take_args("catch", args)?;
    match interp.eval(attempt) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::debug!(error = %err, "catch: falling back");
            interp.eval(fallback)
        }
    }
}

/// Evaluate the body in a child scope
/// Usage: (do ((set X 1) (+ (. X) 1))) => 2
pub fn do_scoped(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [body] = take_args("do", args)?;
    interp.new_scope().eval(body)
}

/// Bind a value to a name for the body
/// Usage: (do (. Cart) c (. c Total)) => 42
pub fn do_with(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value, name, body] = take_args("do", args)?;
    eval_with(interp, &name.text(), value, body)
}

/// Usage: (do (. Cart) ((c) (. c Total))) => 42
pub fn do_legacy(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [value, lambda] = take_args("do", args)?;
    let (name, body) = legacy_lambda("do", lambda)?;
    eval_with(interp, &name, value, body)
}

// ============================================================================
// Templates
// ============================================================================

/// Instantiate a template; the returned tree is evaluated by the caller
/// Usage: (! MultiplyWith2 4) => 8
pub fn instantiate(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("!", &args, 1)?;
    let name = expect_str("!", &args[0])?;
    let template = interp.resolve_template(name, &args[1..])?;
    template.instantiate(&args[1..])
}

/// Register or replace a template in the current scope
/// Usage: (setTemplate "Twice(Decimal)Decimal" (* 2 (# 0))) => null
pub fn set_template(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [signature, body] = take_args("setTemplate", args)?;
    let signature: Signature = expect_str("setTemplate", &signature)?.parse()?;
    interp.upsert_template(Template::new(signature, body));
    Ok(Token::Null)
}

// ============================================================================
// Registration
// ============================================================================

pub(super) fn register(interp: &mut Interpreter<'_>) {
    const V: Kind = Kind::VALUE;
    const A: Kind = Kind::ANY;

    define(
        interp,
        builtin("noop", &[A], Kind::NULL)
            .variadic()
            .describe("Ignore the arguments")
            .example("(noop (panic))"),
        noop,
    );
    define(
        interp,
        builtin("toString", &[V], Kind::STRING)
            .describe("Canonical text of the value")
            .example("(toString 1.50)"),
        to_string,
    );
    define(
        interp,
        builtin("not", &[V], Kind::BOOLEAN)
            .describe("Negated truthiness")
            .example("(not false)"),
        not,
    );
    define(
        interp,
        builtin("catch", &[A, A], V)
            .describe("The second argument, or the first when the second fails")
            .example("(catch 22 (panic))"),
        catch,
    );
    define(
        interp,
        builtin("do", &[A], V)
            .describe("Evaluate the body in a child scope")
            .example("(do ((set X 1) (+ (. X) 1)))"),
        do_scoped,
    );
    define(
        interp,
        builtin("do", &[V, A], V)
            .describe("Bind a value for a body written as `((name) body)`")
            .example("(do (. Cart) ((c) (. c Total)))"),
        do_legacy,
    );
    define(
        interp,
        builtin("do", &[V, Kind::STRING, A], V)
            .describe("Bind a value to a name for the body")
            .example("(do (. Cart) c (. c Total))"),
        do_with,
    );
    define(
        interp,
        builtin("identity", &[A], A)
            .describe("The argument itself")
            .example("(identity (+ 1 2))"),
        identity,
    );
    define(
        interp,
        builtin("!", &[Kind::STRING, A], A)
            .variadic()
            .describe("Instantiate a template with the arguments")
            .example("(! MultiplyWith2 4)"),
        instantiate,
    );
    define(
        interp,
        builtin("setTemplate", &[Kind::STRING, A], Kind::NULL)
            .describe("Register or replace a template in the current scope")
            .example("(setTemplate \"Twice(Decimal)Decimal\" (* 2 (# 0)))"),
        set_template,
    );
    define(
        interp,
        builtin("panic", &[V], V)
            .variadic()
            .describe("Abort the evaluation")
            .example("(panic \"unreachable\")"),
        panic,
    );
}
