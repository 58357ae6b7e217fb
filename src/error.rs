//! Error taxonomy for lexing, dispatch and evaluation.
//!
//! Built-ins return an [`Error`]; the interpreter wraps it in [`Error::Call`]
//! with the signature of the function that raised it, so a failure deep inside
//! nested calls carries a stack-trace-like chain of signatures.

use thiserror::Error;

use crate::kind::Kind;
use crate::numeric::DecimalError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Unterminated quote, unbalanced paren.
    #[error("syntax error at offset {position}: {message}")]
    Syntax { position: usize, message: String },

    /// A dot path or `set` walked into a missing key.
    #[error("unbound name `{0}`")]
    UnboundName(String),

    /// An argument's kind is incompatible with the signature after evaluation.
    #[error("kind mismatch in `{context}`: expected {expected}, found {found}")]
    KindMismatch {
        context: String,
        expected: Kind,
        found: Kind,
    },

    /// The name is registered but no overload takes this many arguments.
    #[error("no overload of `{name}` accepts {count} argument(s)")]
    Arity { name: String, count: usize },

    #[error("template not found: `{0}`")]
    TemplateNotFound(String),

    #[error("panic: {0}")]
    UserPanic(String),

    #[error("maximum recursion depth of {0} reached")]
    RecursionLimit(usize),

    /// Register/update/remove contract violation.
    #[error("registry conflict: {0}")]
    RegistryConflict(String),

    #[error("invalid signature `{text}`: {reason}")]
    InvalidSignature { text: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Decimal(#[from] DecimalError),

    /// An error raised inside the function with the given signature.
    #[error("{signature}: {source}")]
    Call {
        signature: String,
        #[source]
        source: Box<Error>,
    },
}

/// Discriminant of [`Error`] with the call wrapping stripped away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Syntax,
    UnboundName,
    KindMismatch,
    Arity,
    TemplateNotFound,
    UserPanic,
    RecursionLimit,
    RegistryConflict,
    InvalidSignature,
    InvalidArgument,
    Decimal,
}

impl Error {
    pub fn syntax(position: usize, message: impl Into<String>) -> Self {
        Error::Syntax {
            position,
            message: message.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Error::InvalidArgument(message.into())
    }

    /// Wrap this error with the signature of the enclosing call.
    pub fn within(self, signature: impl ToString) -> Self {
        Error::Call {
            signature: signature.to_string(),
            source: Box::new(self),
        }
    }

    /// The innermost error, below every [`Error::Call`] wrapper.
    pub fn root(&self) -> &Error {
        let mut current = self;
        while let Error::Call { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Syntax { .. } => ErrorKind::Syntax,
            Error::UnboundName(_) => ErrorKind::UnboundName,
            Error::KindMismatch { .. } => ErrorKind::KindMismatch,
            Error::Arity { .. } => ErrorKind::Arity,
            Error::TemplateNotFound(_) => ErrorKind::TemplateNotFound,
            Error::UserPanic(_) => ErrorKind::UserPanic,
            Error::RecursionLimit(_) => ErrorKind::RecursionLimit,
            Error::RegistryConflict(_) => ErrorKind::RegistryConflict,
            Error::InvalidSignature { .. } => ErrorKind::InvalidSignature,
            Error::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Error::Decimal(_) => ErrorKind::Decimal,
            Error::Call { source, .. } => source.kind(),
        }
    }

    /// Signatures of the calls this error travelled through, outermost first.
    pub fn trace(&self) -> Vec<&str> {
        let mut frames = Vec::new();
        let mut current = self;
        while let Error::Call { signature, source } = current {
            frames.push(signature.as_str());
            current = source;
        }
        frames
    }
}
