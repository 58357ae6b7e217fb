//! `InterpreterBuilder` for creating root interpreters with various configurations.

use tracing::Span;

use super::Interpreter;
use crate::numeric::DIVISION_PRECISION;
use crate::stdlib::register_stdlib;
use crate::token::{Token, TokenMap};

/// Settings shared by a root interpreter and every scope opened from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting of block evaluations before `RecursionLimit` is raised.
    pub max_depth: usize,
    /// Type-check trees instead of evaluating them.
    pub dry_run: bool,
    /// Fractional digits kept by `/`.
    pub division_precision: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_depth: 256,
            dry_run: false,
            division_precision: DIVISION_PRECISION,
        }
    }
}

/// Builder for a root [`Interpreter`].
///
/// ```
/// use talang::{Interpreter, Token};
///
/// let mut interp = Interpreter::builder()
///     .max_depth(64)
///     .binding(Token::map([("Total", Token::from(41))]))
///     .build();
/// let result = interp.lex_and_evaluate("(+ (. Total) 1)").unwrap();
/// assert_eq!(result, Token::from(42));
/// ```
#[derive(Debug)]
pub struct InterpreterBuilder {
    config: Config,
    binding: Token,
    span: Option<Span>,
    stdlib: bool,
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        InterpreterBuilder {
            config: Config::default(),
            binding: Token::Map(TokenMap::new()),
            span: None,
            stdlib: true,
        }
    }

    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.config.max_depth = max_depth;
        self
    }

    /// Validate instead of evaluating: `evaluate` resolves every call and
    /// returns the tree untouched.
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.config.dry_run = dry_run;
        self
    }

    #[must_use]
    pub fn division_precision(mut self, precision: u32) -> Self {
        self.config.division_precision = precision;
        self
    }

    /// Set the initial binding root.
    #[must_use]
    pub fn binding(mut self, binding: Token) -> Self {
        self.binding = binding;
        self
    }

    /// Run every evaluation inside `span`.
    #[must_use]
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Start with empty registries instead of the built-in catalogue.
    #[must_use]
    pub fn without_stdlib(mut self) -> Self {
        self.stdlib = false;
        self
    }

    pub fn build(self) -> Interpreter<'static> {
        let mut interp = Interpreter::root(self.config, self.binding, self.span);
        if self.stdlib {
            register_stdlib(&mut interp);
        }
        interp
    }
}
