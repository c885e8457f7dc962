use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{Expr, Function, Position, Statement, VarDecl},
    interpreter::{
        lexer::Token,
        parser::{
            block::{parse_block, parse_for, parse_if_chain, parse_while},
            core::{ParseResult, parse_expression},
            types::{parse_generic_params, parse_params, parse_return_type, parse_type},
            utils::{consume_if, error_at_next, expect, parse_identifier, peek_is},
        },
    },
};

/// Result of parsing one element of a statement list.
#[derive(Debug)]
pub enum Parsed {
    /// A complete statement.
    Statement(Statement),
    /// An unterminated expression directly before the closing token; it is
    /// the value of the enclosing block.
    Tail(Expr),
}

/// Parses a single statement.
///
/// Dispatches on the first token:
/// - `fn` starts a named function,
/// - `#` / `#@` start a declaration,
/// - `del` and `ret` start their statements,
/// - an identifier followed by `=` is an assignment,
/// - `?`, `$?`, `for` and `{` start block-like expressions, which need no `;`,
/// - anything else is an expression that must end in `;`.
///
/// `closing` is the token that ends the enclosing statement list (`}` for
/// blocks, `None` at the top level). An expression immediately followed by it
/// is returned as [`Parsed::Tail`].
///
/// # Errors
/// Returns a `ParseError` if the statement is malformed or a required `;` is
/// missing.
pub fn parse_statement<'a, I>(tokens: &mut Peekable<I>, closing: Option<&Token>) -> ParseResult<Parsed>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let Some((token, pos)) = tokens.peek().copied() else {
        return Err(error_at_next(tokens, "statement"));
    };
    let pos = *pos;

    let statement = match token {
        Token::Fn => return parse_function_declaration(tokens).map(Parsed::Statement),
        Token::Hash | Token::HashAt => parse_variable_declaration(tokens)?,
        Token::Del => {
            tokens.next();
            let (name, _) = parse_identifier(tokens)?;
            Statement::Delete { name, pos }
        },
        Token::Ret => {
            tokens.next();
            let value = if peek_is(tokens, &Token::Semicolon) {
                None
            } else {
                Some(parse_expression(tokens)?)
            };
            Statement::Return { value, pos }
        },
        Token::Question | Token::DollarQuestion | Token::For | Token::LBrace => {
            let expr = match token {
                Token::Question => parse_if_chain(tokens)?,
                Token::DollarQuestion => parse_while(tokens)?,
                Token::For => parse_for(tokens)?,
                _ => Expr::Block(parse_block(tokens)?),
            };
            return Ok(finish_block_like(tokens, expr, closing));
        },
        Token::Identifier(_) if is_assignment(tokens) => parse_assignment(tokens)?,
        _ => {
            let expr = parse_expression(tokens)?;
            if consume_if(tokens, &Token::Semicolon).is_some() {
                return Ok(Parsed::Statement(Statement::Expression(expr)));
            }
            if let Some(closing) = closing
               && peek_is(tokens, closing)
            {
                return Ok(Parsed::Tail(expr));
            }
            return Err(error_at_next(tokens, "`;`"));
        },
    };

    expect(tokens, &Token::Semicolon)?;
    Ok(Parsed::Statement(statement))
}

/// Wraps a block-like expression: it is the block's value when it sits right
/// before `closing`, and a statement otherwise. A following `;` is optional.
fn finish_block_like<'a, I>(tokens: &mut Peekable<I>, expr: Expr, closing: Option<&Token>) -> Parsed
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    if consume_if(tokens, &Token::Semicolon).is_some() {
        return Parsed::Statement(Statement::Expression(expr));
    }
    match closing {
        Some(closing) if peek_is(tokens, closing) => Parsed::Tail(expr),
        _ => Parsed::Statement(Statement::Expression(expr)),
    }
}

/// Looks past an identifier for a single `=`.
fn is_assignment<'a, I>(tokens: &Peekable<I>) -> bool
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut lookahead = tokens.clone();
    lookahead.next();
    matches!(lookahead.peek(), Some((Token::Equals, _)))
}

/// Parses `name = value` (without the `;`).
fn parse_assignment<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let (name, pos) = parse_identifier(tokens)?;
    expect(tokens, &Token::Equals)?;
    let value = parse_expression(tokens)?;
    Ok(Statement::Assignment { name, value, pos })
}

/// Parses a variable declaration (without the `;`).
///
/// A declaration has the form `# name: type = value`, where `#@` instead of
/// `#` makes the binding mutable. Both the annotation and the initializer are
/// optional here; the checker rejects declarations that have neither.
fn parse_variable_declaration<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let (mutable, pos) = match tokens.next() {
        Some((Token::HashAt, pos)) => (true, *pos),
        Some((_, pos)) => (false, *pos),
        None => return Err(error_at_next(tokens, "`#` or `#@`")),
    };
    let (name, _) = parse_identifier(tokens)?;

    let ty = if consume_if(tokens, &Token::Colon).is_some() {
        Some(parse_type(tokens)?)
    } else {
        None
    };
    let init = if consume_if(tokens, &Token::Equals).is_some() {
        Some(parse_expression(tokens)?)
    } else {
        None
    };

    Ok(Statement::VarDecl(VarDecl { name,
                                    mutable,
                                    ty,
                                    init,
                                    resolved: None,
                                    pos }))
}

/// Parses a named function.
///
/// Grammar: `function := "fn" IDENT generics? params ("->" type)? block`
fn parse_function_declaration<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Statement>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let pos = expect(tokens, &Token::Fn)?;
    let (name, _) = parse_identifier(tokens)?;
    let generics = parse_generic_params(tokens)?;
    let params = parse_params(tokens)?;
    let ret = parse_return_type(tokens)?;
    let body = parse_block(tokens)?;

    Ok(Statement::Function { name,
                             function: Rc::new(Function { generics,
                                                          params,
                                                          ret,
                                                          body,
                                                          pos }),
                             pos })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::ParseError,
        interpreter::{lexer::tokenize, parser::core::parse_program},
        types::Type,
    };

    fn program(source: &str) -> Result<Vec<Statement>, ParseError> {
        let tokens = tokenize(source).unwrap();
        parse_program(&tokens).map(|p| p.statements)
    }

    #[test]
    fn declarations_with_and_without_parts() {
        let statements = program("# a = 1; #@ b: i64 = 2; # c: str;").unwrap();
        let Statement::VarDecl(b) = &statements[1] else {
            panic!("expected declaration");
        };
        assert!(b.mutable);
        assert_eq!(b.ty, Some(Type::Int(crate::types::IntWidth::I64)));

        let Statement::VarDecl(c) = &statements[2] else {
            panic!("expected declaration");
        };
        assert!(!c.mutable);
        assert!(c.init.is_none());
    }

    #[test]
    fn generic_function_declaration() {
        let statements = program("fn id<<T>>(x: T) -> T { x }").unwrap();
        let Statement::Function { name, function, .. } = &statements[0] else {
            panic!("expected function");
        };
        assert_eq!(name, "id");
        assert_eq!(function.generics, vec!["T".to_string()]);
        assert_eq!(function.ret, Some(Type::Param("T".into())));
    }

    #[test]
    fn assignment_delete_and_return() {
        let statements = program("x = 3; del x; fn f() { ret; }").unwrap();
        assert!(matches!(statements[0], Statement::Assignment { .. }));
        assert!(matches!(statements[1], Statement::Delete { .. }));
    }

    #[test]
    fn missing_semicolon_reports_expected_and_found() {
        let err = program("# a = 1 # b = 2;").unwrap_err();
        let ParseError::UnexpectedToken { expected, found, pos } = err else {
            panic!("expected unexpected-token error");
        };
        assert_eq!(expected, "`;`");
        assert_eq!(found, "`#`");
        assert_eq!(pos.column, 9);
    }

    #[test]
    fn top_level_needs_terminators() {
        assert!(program("1 + 2").is_err());
        assert!(program("$$ 1 + 2;").is_ok());
    }
}
