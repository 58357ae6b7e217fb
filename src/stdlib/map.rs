use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::token::{Token, TokenMap};

use super::{builtin, define};

// ============================================================================
// Map Construction
// ============================================================================

/// Build a map from `(Key value...)` pair blocks or flat `key value` pairs.
///
/// A pair block with no value maps its key to null, one value to that value
/// evaluated, several values to the list of them evaluated. A block that
/// resolves to a function call is a computed flat key instead.
///
/// Usage: (kv (Name "Joe") (Tags a b)) => {Name:"Joe", Tags:["a", "b"]}
/// Usage: (kv Name "Joe" Age 42) => {Name:"Joe", Age:42}
/// Usage: (kv (. Field) 1) => {Price:1}
pub fn kv(interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
    let mut map = TokenMap::new();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg {
            Token::Block(block)
                if !block.head.is_empty() && !matches!(interp.resolve(&block), Ok(Some(_))) =>
            {
                let (key, children) = block.into_parts();
                let mut values = children
                    .into_iter()
                    .map(|child| interp.eval(child))
                    .collect::<Result<Vec<_>>>()?;
                let value = match values.len() {
                    0 => Token::Null,
                    1 => values.remove(0),
                    _ => Token::List(values),
                };
                map.insert(key, value);
            }
            key => {
                let key = interp.eval(key)?.text();
                let value = args.next().ok_or_else(|| {
                    Error::invalid_argument(format!("kv: key `{key}` has no value"))
                })?;
                map.insert(key, interp.eval(value)?);
            }
        }
    }
    Ok(Token::Map(map))
}

// ============================================================================
// Registration
// ============================================================================

pub(super) fn register(interp: &mut Interpreter<'_>) {
    define(
        interp,
        builtin("kv", &[Kind::ANY], Kind::MAP)
            .variadic()
            .describe(
                "A map from `(Key value)` pairs or flat key/value arguments; \
                 a call in key position is a computed key",
            )
            .example("(kv (Name \"Joe\") (Age 42))"),
        kv,
    );
}
