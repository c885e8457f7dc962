use std::iter::Peekable;

use crate::{
    ast::{Expr, Position, Program},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            binary::parse_logical_or,
            statement::{Parsed, parse_statement},
        },
    },
};

pub type ParseResult<T> = Result<T, ParseError>;

/// Parses a whole token stream into a [`Program`].
///
/// Every top-level element must be a complete statement. An unterminated
/// expression is only allowed as the value of a block, so one at the top
/// level is reported as a missing `;`.
///
/// # Errors
/// Returns the first [`ParseError`] encountered.
///
/// # Examples
/// ```
/// use obstruct::interpreter::{lexer::tokenize, parser::core::parse_program};
///
/// let tokens = tokenize("fn main(args: vec<<str>>) { $$ 1; }").unwrap();
/// let program = parse_program(&tokens).unwrap();
/// assert_eq!(program.statements.len(), 1);
/// ```
pub fn parse_program(tokens: &[(Token, Position)]) -> ParseResult<Program> {
    let mut iter = tokens.iter().peekable();
    let mut statements = Vec::new();

    while iter.peek().is_some() {
        match parse_statement(&mut iter, None)? {
            Parsed::Statement(statement) => statements.push(statement),
            Parsed::Tail(expr) => {
                return Err(ParseError::UnexpectedEndOfInput { expected: format!("`;` after expression at {}",
                                                                                expr.pos()), });
            },
        }
    }

    Ok(Program { statements })
}

/// Parses a full expression.
///
/// This is the entry point for expression parsing.
/// It begins at the lowest-precedence level, logical OR, and recursively
/// descends through the precedence hierarchy.
///
/// Grammar: `expression := logical_or`
pub fn parse_expression<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    parse_logical_or(tokens)
}
