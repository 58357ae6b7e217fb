use crate::error::{ErrorKind, Result};
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::native::{check_arity_min, take_args};
use crate::token::Token;

use super::{builtin, define};

// ============================================================================
// Binding Access
// ============================================================================

/// Read a dot path from the binding; no keys reads the whole binding
/// Usage: (. Cart Items 0 Price) => 9.99
pub fn read(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let path: Vec<String> = args.iter().map(Token::text).collect();
    interp.read_path(&path)
}

/// Install the last argument at the path spelled by the others, in the
/// current scope, and return it
/// Usage: (set Cart Total 42) => 42
pub fn set(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    check_arity_min("set", &args, 2)?;
    let mut args = args;
    let value = args.pop().unwrap_or_default();
    let path: Vec<String> = args.iter().map(Token::text).collect();
    interp.write_path(&path, value.clone())?;
    Ok(value)
}

/// Evaluate the path expression, falling back to the default when it reads
/// a missing name. Any other failure propagates.
/// Usage: (.| 0 (. Cart Discount)) => 0
pub fn safe_read(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let [default, path] = take_args(".|", args)?;
    match interp.eval(path) {
        Err(err) if err.kind() == ErrorKind::UnboundName => Ok(default),
        other => other,
    }
}

// ============================================================================
// Registration
// ============================================================================

pub(super) fn register(interp: &mut Interpreter<'_>) {
    const V: Kind = Kind::VALUE;

    define(
        interp,
        builtin(".", &[Kind::ATOM], V)
            .variadic()
            .describe("Value at a path of keys and list indices in the binding")
            .example("(. Cart Items 0 Price)"),
        read,
    );
    define(
        interp,
        builtin("set", &[Kind::ATOM, V, V], V)
            .variadic()
            .describe("Install the last argument at the path given by the others")
            .example("(set Cart Total 42)"),
        set,
    );
    for name in [".|", "safeRead"] {
        define(
            interp,
            builtin(name, &[V, Kind::ANY], V)
                .describe("Value of the path expression, or the default when a name is missing")
                .example(format!("({name} 0 (. Cart Discount))")),
            safe_read,
        );
    }
}
