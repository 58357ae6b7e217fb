//! Talang: an embeddable S-expression language for rules and templates.
//!
//! The host builds an [`Interpreter`], binds data into it, registers
//! extension functions and templates, then lexes and evaluates short
//! expressions:
//!
//! ```
//! use talang::{Interpreter, Token};
//!
//! let mut interp = Interpreter::new();
//! interp
//!     .set("Cart", Token::map([("Total", Token::from(40))]))
//!     .unwrap();
//! let total = interp.lex_and_evaluate("(+ 2 (. Cart Total))").unwrap();
//! assert_eq!(total, Token::from(42));
//! ```
//!
//! A [`Token`] is at once the AST node, the runtime value and the binding
//! medium. Calls resolve by name, arity and [`Kind`] against the overloads
//! visible from the current scope; a block no overload accepts is left as
//! it is.

pub mod error;
pub mod interpreter;
pub mod kind;
pub mod lexer;
pub mod native;
pub mod numeric;
pub mod signature;
mod stack;
pub mod stdlib;
pub mod token;

// Re-export commonly used items for convenience
pub use error::{Error, ErrorKind, Result};
pub use interpreter::{Config, Interpreter, InterpreterBuilder, Template};
pub use kind::Kind;
pub use lexer::{Lexer, lex};
pub use native::{Function, NativeFn};
pub use numeric::{Decimal, DecimalError};
pub use signature::Signature;
pub use token::{Block, Timestamp, Token, TokenMap};
