/// Lexing errors.
///
/// Malformed literals, bad escapes and stray characters, each with the
/// position of the offending text.
pub mod lex_error;
/// Parsing errors.
///
/// Raised when the token stream does not match the grammar.
pub mod parse_error;
/// Static checking errors.
///
/// Name resolution and type errors found before any code runs.
pub mod check_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation and execution:
/// division by zero, out-of-bounds indexing, invalid pointers and bad builtin
/// arguments.
pub mod runtime_error;

pub use check_error::{CheckError, NameError, TypeError};
pub use lex_error::{LexError, LexErrorKind};
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;
use thiserror::Error;

/// Process exit code for errors found before execution.
pub const STATIC_ERROR_EXIT_CODE: i32 = 2;
/// Process exit code for errors raised during execution.
pub const RUNTIME_ERROR_EXIT_CODE: i32 = 1;

/// Any error the pipeline can produce, tagged by phase.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Malformed token.
    #[error(transparent)]
    Lex(#[from] LexError),
    /// Unexpected or missing token.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Undefined names, type errors and mutability violations.
    #[error(transparent)]
    Check(#[from] CheckError),
    /// Failure during execution.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Reports whether the error was found before any program code ran.
    #[must_use]
    pub const fn is_static(&self) -> bool {
        !matches!(self, Self::Runtime(_))
    }

    /// The process exit code this error maps to.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        if self.is_static() { STATIC_ERROR_EXIT_CODE } else { RUNTIME_ERROR_EXIT_CODE }
    }
}

impl From<NameError> for Error {
    fn from(err: NameError) -> Self {
        Self::Check(CheckError::Name(err))
    }
}

impl From<TypeError> for Error {
    fn from(err: TypeError) -> Self {
        Self::Check(CheckError::Type(err))
    }
}
