use thiserror::Error;

use crate::ast::Position;

/// The reason a token could not be produced.
///
/// This doubles as the `logos` error type, so the default variant is what the
/// lexer reports for characters that start no token at all.
#[derive(Debug, Clone, PartialEq, Eq, Default, Error)]
pub enum LexErrorKind {
    /// A character that begins no token.
    #[default]
    #[error("unrecognized character")]
    UnrecognizedCharacter,
    /// A string literal without its closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// A char literal without its closing quote, or with more than one
    /// character inside.
    #[error("unterminated or overlong char literal")]
    UnterminatedChar,
    /// A backslash followed by a character with no escape meaning.
    #[error("invalid escape sequence `\\{0}`")]
    InvalidEscape(char),
    /// An integer literal that does not fit its width.
    #[error("integer literal `{literal}` is out of range for {width}")]
    IntegerOutOfRange {
        /// The literal as written.
        literal: String,
        /// The width it was checked against.
        width:   &'static str,
    },
    /// A float literal that failed to parse.
    #[error("malformed float literal `{0}`")]
    MalformedFloat(String),
}

/// A malformed token together with where it starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Lex error at {pos}: {kind} (found `{lexeme}`)")]
pub struct LexError {
    /// What went wrong.
    pub kind:   LexErrorKind,
    /// The offending source text.
    pub lexeme: String,
    /// Where the offending text starts.
    pub pos:    Position,
}
