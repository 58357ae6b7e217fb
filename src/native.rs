//! Native function utilities and helpers
//!
//! A [`Function`] pairs a [`Signature`] with a Rust closure. The extraction
//! helpers below turn argument tokens into typed payloads, reporting a
//! kind mismatch against the calling function's name.

use std::fmt;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::interpreter::Interpreter;
use crate::kind::Kind;
use crate::numeric::Decimal;
use crate::signature::Signature;
use crate::token::{Timestamp, Token, TokenMap};

/// Implementation of a registered function.
pub type NativeFn = Rc<dyn Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token>>;

// ============================================================================
// Function
// ============================================================================

#[derive(Clone)]
pub struct Function {
    signature: Signature,
    body: NativeFn,
}

impl Function {
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&mut Interpreter<'_>, Vec<Token>) -> Result<Token> + 'static,
    {
        Function {
            signature,
            body: Rc::new(body),
        }
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub(crate) fn call(&self, interp: &mut Interpreter<'_>, args: Vec<Token>) -> Result<Token> {
        (self.body)(interp, args)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature.to_string())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Value Extraction Helpers
// ============================================================================

pub fn kind_mismatch(name: &str, expected: Kind, found: &Token) -> Error {
    Error::KindMismatch {
        context: name.to_string(),
        expected,
        found: found.kind(),
    }
}

/// Extract a decimal from a Token
pub fn expect_decimal<'a>(name: &str, token: &'a Token) -> Result<&'a Decimal> {
    token
        .as_decimal()
        .ok_or_else(|| kind_mismatch(name, Kind::DECIMAL, token))
}

/// Extract a string from a Token
pub fn expect_str<'a>(name: &str, token: &'a Token) -> Result<&'a str> {
    token
        .as_str()
        .ok_or_else(|| kind_mismatch(name, Kind::STRING, token))
}

pub fn expect_bool(name: &str, token: &Token) -> Result<bool> {
    token
        .as_bool()
        .ok_or_else(|| kind_mismatch(name, Kind::BOOLEAN, token))
}

pub fn expect_time<'a>(name: &str, token: &'a Token) -> Result<&'a Timestamp> {
    token
        .as_time()
        .ok_or_else(|| kind_mismatch(name, Kind::TIME, token))
}

pub fn expect_list<'a>(name: &str, token: &'a Token) -> Result<&'a [Token]> {
    token
        .as_list()
        .ok_or_else(|| kind_mismatch(name, Kind::LIST, token))
}

pub fn expect_map<'a>(name: &str, token: &'a Token) -> Result<&'a TokenMap> {
    token
        .as_map()
        .ok_or_else(|| kind_mismatch(name, Kind::MAP, token))
}

/// Take ownership of a list argument.
pub fn into_list(name: &str, token: Token) -> Result<Vec<Token>> {
    match token {
        Token::List(items) => Ok(items),
        other => Err(kind_mismatch(name, Kind::LIST, &other)),
    }
}

/// A non-negative integer argument used as an index or a count.
pub fn expect_index(name: &str, token: &Token) -> Result<usize> {
    let decimal = expect_decimal(name, token)?;
    if !decimal.is_integer() || decimal.is_negative() {
        return Err(Error::invalid_argument(format!(
            "{name}: expected a non-negative integer, got {decimal}"
        )));
    }
    Ok(decimal.to_usize()?)
}

// ============================================================================
// Argument Checking Helpers
// ============================================================================

/// Destructure exactly `N` arguments.
///
/// ```ignore
/// let [list, separator] = take_args("join", args)?;
/// ```
pub fn take_args<const N: usize>(name: &str, args: Vec<Token>) -> Result<[Token; N]> {
    args.try_into().map_err(|args: Vec<Token>| Error::Arity {
        name: name.to_string(),
        count: args.len(),
    })
}

/// Check that the number of arguments is at least n
pub fn check_arity_min(name: &str, args: &[Token], min: usize) -> Result<()> {
    if args.len() < min {
        return Err(Error::Arity {
            name: name.to_string(),
            count: args.len(),
        });
    }
    Ok(())
}
