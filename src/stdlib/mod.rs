//! Standard library native functions
//!
//! The built-in catalogue registered into every root interpreter. Each group
//! lives in its own module and exposes a `register` function; registration
//! order matters because later overloads of the same name are tried first.

mod arithmetic;
mod binding;
mod compare;
mod control;
mod list;
mod map;
mod string;
mod time;

use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::native::{Function, into_list};
use crate::signature::Signature;
use crate::token::Token;

pub(crate) use compare::{compare_atoms, loose_eq};

/// Register all standard library functions in the given interpreter
pub fn register_stdlib(interp: &mut Interpreter<'_>) {
    arithmetic::register(interp);
    compare::register(interp);
    list::register(interp);
    map::register(interp);
    string::register(interp);
    time::register(interp);
    binding::register(interp);
    control::register(interp);
}

// ============================================================================
// Registration Helpers
// ============================================================================

/// Signature of a built-in with fixed parameters.
fn builtin(name: &str, parameters: &[Kind], returns: Kind) -> Signature {
    Signature::new(name)
        .params(parameters.iter().copied())
        .returns(returns)
}

fn define<F>(interp: &mut Interpreter<'_>, signature: Signature, body: F)
where
    F: Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token> + 'static,
{
    interp.install(Function::new(signature, body));
}

// ============================================================================
// Iteration Helpers
// ============================================================================

/// Evaluate `body` in a child scope that binds `name` to `value`.
fn eval_with(interp: &Interpreter<'_>, name: &str, value: Token, body: Token) -> Result<Token> {
    let mut scope = interp.new_scope();
    scope.set(name, value)?;
    scope.eval(body)
}

/// Split the legacy `((name) body)` form into its name and body.
fn legacy_lambda(function: &str, token: Token) -> Result<(String, Token)> {
    if let Token::Block(block) = &token
        && block.head.is_empty()
        && let [Token::Block(binder), body] = block.children.as_slice()
        && !binder.head.is_empty()
        && binder.children.is_empty()
    {
        return Ok((binder.head.clone(), body.clone()));
    }
    Err(Error::invalid_argument(format!(
        "{function}: expected `((name) body)`, got {token}"
    )))
}

/// Items, loop variable and body of an iterator call, in either its
/// `list name body` form or its legacy `list ((name) body)` form.
fn iteration(function: &str, args: Vec<Token>) -> Result<(Vec<Token>, String, Token)> {
    let mut args = args.into_iter();
    let list = into_list(function, args.next().unwrap_or_default())?;
    match (args.next(), args.next()) {
        (Some(name), Some(body)) => Ok((list, name.text(), body)),
        (Some(lambda), None) => {
            let (name, body) = legacy_lambda(function, lambda)?;
            Ok((list, name, body))
        }
        _ => Err(Error::invalid_argument(format!(
            "{function}: missing loop body"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    #[test]
    fn test_legacy_lambda_shape() {
        let (name, body) = legacy_lambda("map", lex("((x) (+ x 1))").unwrap()).unwrap();
        assert_eq!(name, "x");
        assert_eq!(body, lex("(+ x 1)").unwrap());
    }

    #[test]
    fn test_legacy_lambda_rejects_other_shapes() {
        assert!(legacy_lambda("map", lex("(+ x 1)").unwrap()).is_err());
        assert!(legacy_lambda("map", lex("((x y) z)").unwrap()).is_err());
    }
}
