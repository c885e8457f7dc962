use std::iter::Peekable;

use crate::{
    ast::Position,
    error::ParseError,
    interpreter::{lexer::Token, parser::core::ParseResult},
};

/// Builds the error for finding `found` where `expected` was required.
///
/// Returns `None` when there is no token left, so callers can attach their own
/// end-of-input message.
pub(in crate::interpreter::parser) fn unexpected(found: Option<&(Token, Position)>,
                                                 expected: &str)
                                                 -> Option<ParseError> {
    found.map(|(tok, pos)| ParseError::UnexpectedToken { expected: expected.to_string(),
                                                         found:    tok.to_string(),
                                                         pos:      *pos, })
}

/// Error for the next token, which did not fit `expected`.
pub(in crate::interpreter::parser) fn error_at_next<'a, I>(tokens: &mut Peekable<I>,
                                                           expected: &str)
                                                           -> ParseError
    where I: Iterator<Item = &'a (Token, Position)>
{
    unexpected(tokens.peek().copied(), expected).unwrap_or_else(|| {
                                                    ParseError::UnexpectedEndOfInput { expected: expected.to_string() }
                                                })
}

/// Consumes `expected` and returns its position, or fails.
pub(in crate::interpreter::parser) fn expect<'a, I>(tokens: &mut Peekable<I>,
                                                    expected: &Token)
                                                    -> ParseResult<Position>
    where I: Iterator<Item = &'a (Token, Position)>
{
    match tokens.peek() {
        Some((tok, pos)) if tok == expected => {
            let pos = *pos;
            tokens.next();
            Ok(pos)
        },
        _ => Err(error_at_next(tokens, &expected.to_string())),
    }
}

/// Consumes the next token if it equals `token`.
pub(in crate::interpreter::parser) fn consume_if<'a, I>(tokens: &mut Peekable<I>,
                                                        token: &Token)
                                                        -> Option<Position>
    where I: Iterator<Item = &'a (Token, Position)>
{
    match tokens.peek() {
        Some((tok, pos)) if tok == token => {
            let pos = *pos;
            tokens.next();
            Some(pos)
        },
        _ => None,
    }
}

/// Reports whether the next token equals `token`.
pub(in crate::interpreter::parser) fn peek_is<'a, I>(tokens: &mut Peekable<I>, token: &Token) -> bool
    where I: Iterator<Item = &'a (Token, Position)>
{
    matches!(tokens.peek(), Some((tok, _)) if tok == token)
}

/// Parses a comma-separated list of items until a closing token.
///
/// This utility is shared by array literals, argument lists, parameter lists
/// and generic lists. An immediately encountered closing token produces an
/// empty list. A trailing comma before the closing token is accepted.
///
/// Grammar (simplified): `list := item ("," item)* ","?`
///
/// # Errors
/// Returns a `ParseError` if an item fails to parse, if a token other than `,`
/// or `closing` follows an item, or if the stream ends first.
pub(in crate::interpreter::parser) fn parse_comma_separated<'a, I, T>(
    tokens: &mut Peekable<I>,
    parse_item: impl Fn(&mut Peekable<I>) -> ParseResult<T>,
    closing: &Token)
    -> ParseResult<Vec<T>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut items = Vec::new();
    if consume_if(tokens, closing).is_some() {
        return Ok(items);
    }
    loop {
        items.push(parse_item(tokens)?);
        if consume_if(tokens, closing).is_some() {
            break;
        }
        if consume_if(tokens, &Token::Comma).is_none() {
            return Err(error_at_next(tokens, &format!("`,` or {closing}")));
        }
        if consume_if(tokens, closing).is_some() {
            break;
        }
    }
    Ok(items)
}

/// Parses a plain identifier and returns its name and position.
///
/// # Errors
/// Returns a `ParseError` if the next token is not an identifier.
pub(in crate::interpreter::parser) fn parse_identifier<'a, I>(tokens: &mut Peekable<I>)
                                                              -> ParseResult<(String, Position)>
    where I: Iterator<Item = &'a (Token, Position)>
{
    match tokens.peek() {
        Some((Token::Identifier(name), pos)) => {
            let result = (name.clone(), *pos);
            tokens.next();
            Ok(result)
        },
        _ => Err(error_at_next(tokens, "identifier")),
    }
}
