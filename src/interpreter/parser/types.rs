use std::iter::Peekable;

use crate::{
    ast::{Param, Position},
    error::ParseError,
    interpreter::{
        lexer::Token,
        parser::{
            core::ParseResult,
            utils::{consume_if, error_at_next, expect, parse_comma_separated, parse_identifier},
        },
    },
    types::{FunctionType, ParamType, Type},
};

/// Parses a type annotation.
///
/// Grammar:
/// ```text
///     type := "fn" "(" ("@"? type),* ")" ("->" type)?
///           | ("vec" | "ptr" | "ref") "<<" type ">>"
///           | "arr" "<<" type "," INTEGER ">>"
///           | IDENT
/// ```
/// Identifiers that are not primitive type names become generic placeholders;
/// the checker rejects the ones that are not in scope.
///
/// # Errors
/// Returns a `ParseError` for malformed annotations, including a
/// non-integer array length.
pub fn parse_type<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if consume_if(tokens, &Token::Fn).is_some() {
        return parse_function_type(tokens);
    }

    let (name, _) = parse_identifier(tokens)?;
    match name.as_str() {
        "vec" | "ptr" | "ref" => {
            expect(tokens, &Token::Shl)?;
            let inner = Box::new(parse_type(tokens)?);
            expect(tokens, &Token::Shr)?;
            Ok(match name.as_str() {
                "vec" => Type::Vec(inner),
                "ptr" => Type::Ptr(inner),
                _ => Type::Ref(inner),
            })
        },
        "arr" => {
            expect(tokens, &Token::Shl)?;
            let inner = parse_type(tokens)?;
            expect(tokens, &Token::Comma)?;
            let len = match tokens.next() {
                Some((Token::Integer(lit), pos)) => {
                    usize::try_from(lit.value).map_err(|_| ParseError::InvalidArrayLength { found: lit.value.to_string(),
                                                                                            pos:   *pos, })?
                },
                Some((tok, pos)) => {
                    return Err(ParseError::InvalidArrayLength { found: tok.to_string(),
                                                                pos:   *pos, });
                },
                None => {
                    return Err(ParseError::UnexpectedEndOfInput { expected: "array length".to_string() });
                },
            };
            expect(tokens, &Token::Shr)?;
            Ok(Type::Arr(Box::new(inner), len))
        },
        _ => Ok(Type::primitive(&name).unwrap_or(Type::Param(name))),
    }
}

/// Parses the remainder of `fn(params) -> ret` after the `fn` keyword.
fn parse_function_type<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Type>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    expect(tokens, &Token::LParen)?;
    let params = parse_comma_separated(tokens,
                                       |tokens| {
                                           let mutable = consume_if(tokens, &Token::At).is_some();
                                           Ok(ParamType { ty: parse_type(tokens)?,
                                                          mutable })
                                       },
                                       &Token::RParen)?;
    let ret = if consume_if(tokens, &Token::Arrow).is_some() {
        parse_type(tokens)?
    } else {
        Type::Unit
    };
    Ok(Type::Function(FunctionType { generics: Vec::new(),
                                     params,
                                     ret: Box::new(ret) }))
}

/// Parses an optional generic parameter list such as `<<T, U>>`.
///
/// Returns an empty list when the next token is not `<<`.
pub fn parse_generic_params<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<String>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if consume_if(tokens, &Token::Shl).is_none() {
        return Ok(Vec::new());
    }
    parse_comma_separated(tokens, |tokens| parse_identifier(tokens).map(|(name, _)| name), &Token::Shr)
}

/// Parses a generic argument list such as `<<i32, vec<<str>>>>`.
///
/// The caller has already checked that the next token is `<<`.
pub fn parse_type_args<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Type>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    expect(tokens, &Token::Shl)?;
    parse_comma_separated(tokens, parse_type, &Token::Shr)
}

/// Parses a parenthesized parameter list.
///
/// Grammar: `params := "(" ("@"? IDENT ":" type),* ")"`
pub fn parse_params<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Vec<Param>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    expect(tokens, &Token::LParen)?;
    parse_comma_separated(tokens,
                          |tokens| {
                              let marker = consume_if(tokens, &Token::At);
                              let (name, name_pos) = parse_identifier(tokens)?;
                              if consume_if(tokens, &Token::Colon).is_none() {
                                  return Err(error_at_next(tokens, "`:` and a parameter type"));
                              }
                              let ty = parse_type(tokens)?;
                              Ok(Param { name,
                                         ty,
                                         mutable: marker.is_some(),
                                         pos: marker.unwrap_or(name_pos) })
                          },
                          &Token::RParen)
}

/// Parses an optional `-> type` return annotation.
pub fn parse_return_type<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Option<Type>>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if consume_if(tokens, &Token::Arrow).is_some() {
        parse_type(tokens).map(Some)
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{interpreter::lexer::tokenize, types::IntWidth};

    fn ty(source: &str) -> ParseResult<Type> {
        let tokens = tokenize(source).unwrap();
        parse_type(&mut tokens.iter().peekable())
    }

    #[test]
    fn nested_containers() {
        assert_eq!(ty("ptr<<vec<<i64>>>>").unwrap(),
                   Type::Ptr(Box::new(Type::Vec(Box::new(Type::Int(IntWidth::I64))))));
        assert_eq!(ty("arr<<char, 4>>").unwrap(), Type::Arr(Box::new(Type::Char), 4));
    }

    #[test]
    fn function_types_keep_mutability() {
        let parsed = ty("fn(i32, @str) -> bool").unwrap();
        assert_eq!(parsed.to_string(), "fn(i32, @str) -> bool");
        assert_eq!(ty("fn()").unwrap().to_string(), "fn() -> unit");
    }

    #[test]
    fn unknown_names_become_placeholders() {
        assert_eq!(ty("T").unwrap(), Type::Param("T".into()));
    }

    #[test]
    fn array_length_must_be_an_integer() {
        assert!(matches!(ty("arr<<i32, x>>"), Err(ParseError::InvalidArrayLength { .. })));
    }
}
