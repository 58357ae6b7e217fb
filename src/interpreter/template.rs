//! User-defined templates and positional placeholder substitution.

use tracing::debug;

use crate::error::{Error, Result};
use crate::signature::Signature;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Block, Token};

/// Head of a placeholder block: `(# 0)` stands for the first argument.
const PLACEHOLDER: &str = "#";

/// Substitution passes before a template is declared divergent.
const MAX_PASSES: usize = 64;

/// A signature paired with a body tree stored verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    signature: Signature,
    body: Token,
}

impl Template {
    pub fn new(signature: Signature, body: Token) -> Self {
        Template { signature, body }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn body(&self) -> &Token {
        &self.body
    }

    /// A copy of the body with every `(# i)` replaced by `args[i]`.
    ///
    /// Passes repeat until one makes no replacement, so a placeholder that
    /// arrives inside an argument is resolved too.
    pub fn instantiate(&self, args: &[Token]) -> Result<Token> {
        debug!(signature = %self.signature, args = args.len(), "instantiate template");
        let mut body = self.body.clone();
        for _ in 0..MAX_PASSES {
            let mut replaced = false;
            body = substitute(body, args, &mut replaced)?;
            if !replaced {
                return Ok(body);
            }
        }
        Err(Error::invalid_argument(format!(
            "template {}: placeholders still present after {MAX_PASSES} passes",
            self.signature
        )))
    }
}

fn substitute(token: Token, args: &[Token], replaced: &mut bool) -> Result<Token> {
    let Token::Block(block) = token else {
        return Ok(token);
    };
    if let Some(index) = placeholder_index(&block)? {
        *replaced = true;
        return args.get(index).cloned().ok_or_else(|| {
            Error::invalid_argument(format!(
                "placeholder (# {index}) out of range for {} argument(s)",
                args.len()
            ))
        });
    }
    let (head, children) = block.into_parts();
    let children = ensure_sufficient_stack(|| {
        children
            .into_iter()
            .map(|child| substitute(child, args, replaced))
            .collect::<Result<Vec<_>>>()
    })?;
    Ok(Token::Block(Block::new(head, children)))
}

fn placeholder_index(block: &Block) -> Result<Option<usize>> {
    if block.head != PLACEHOLDER {
        return Ok(None);
    }
    match block.children.first() {
        Some(Token::Decimal(index)) => Ok(Some(index.to_usize().map_err(|_| {
            Error::invalid_argument(format!("invalid placeholder index {index}"))
        })?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn template(sig: &str, body: &str) -> Template {
        Template::new(sig.parse().unwrap(), lex(body).unwrap())
    }

    #[test]
    fn test_placeholders_are_replaced_everywhere() {
        let t = template("Twice(Decimal)Decimal", "(+ (# 0) (# 0))");
        let body = t.instantiate(&[Token::from(4)]).unwrap();
        assert_eq!(body, lex("(+ 4 4)").unwrap());
    }

    #[test]
    fn test_placeholder_inside_argument_resolves() {
        let t = template("Wrap(Any, Any)Any", "(f (# 0))");
        let body = t
            .instantiate(&[lex("(g (# 1))").unwrap(), Token::from(7)])
            .unwrap();
        assert_eq!(body, lex("(f (g 7))").unwrap());
    }

    #[test]
    fn test_out_of_range_placeholder_fails() {
        let t = template("Bad(Decimal)Decimal", "(* 2 (# 3))");
        assert!(t.instantiate(&[Token::from(1)]).is_err());
    }

    #[test]
    fn test_self_referential_argument_is_divergent() {
        let t = template("Loop(Any)Any", "(f (# 0))");
        let err = t.instantiate(&[lex("(g (# 0))").unwrap()]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_body_is_untouched() {
        let t = template("Id(Any)Any", "(identity (# 0))");
        let before = t.body().clone();
        t.instantiate(&[Token::from(1)]).unwrap();
        assert_eq!(t.body(), &before);
    }
}
