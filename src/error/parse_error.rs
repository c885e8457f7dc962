use thiserror::Error;

use crate::ast::Position;

/// Errors raised while building the syntax tree.
///
/// Parsing is fail-fast: the first error aborts the whole program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A token other than the expected one.
    #[error("Parse error at {pos}: expected {expected}, found {found}")]
    UnexpectedToken {
        /// Description of what the grammar allowed here.
        expected: String,
        /// The token that was found.
        found:    String,
        /// Where it was found.
        pos:      Position,
    },
    /// The token stream ended too early.
    #[error("Parse error: unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput {
        /// Description of what the grammar allowed here.
        expected: String,
    },
    /// An array length in a type was not a non-negative integer literal.
    #[error("Parse error at {pos}: invalid array length `{found}`")]
    InvalidArrayLength {
        /// The offending token.
        found: String,
        /// Where it was found.
        pos:   Position,
    },
}
