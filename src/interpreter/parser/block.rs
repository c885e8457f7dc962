use std::iter::Peekable;

use crate::{
    ast::{Block, Expr, IfChain, Position},
    interpreter::{
        lexer::Token,
        parser::{
            core::{ParseResult, parse_expression},
            statement::{Parsed, parse_statement},
            utils::{consume_if, error_at_next, expect, parse_identifier, peek_is},
        },
    },
};

/// Parses a braced block.
///
/// Statements are collected until `}`. An expression directly before the
/// closing brace without a `;` becomes the block's trailing value and is
/// stored apart from the statements, so "the last expression may omit its
/// terminator" is a property of the tree rather than of evaluation.
///
/// Grammar: `block := "{" statement* expression? "}"`
///
/// # Errors
/// Returns a `ParseError` when the block is not closed or a statement inside
/// it is malformed.
pub fn parse_block<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Block>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let pos = expect(tokens, &Token::LBrace)?;
    let mut statements = Vec::new();
    let mut tail = None;

    while !peek_is(tokens, &Token::RBrace) {
        if tokens.peek().is_none() {
            return Err(error_at_next(tokens, "`}`"));
        }
        match parse_statement(tokens, Some(&Token::RBrace))? {
            Parsed::Statement(statement) => statements.push(statement),
            Parsed::Tail(expr) => {
                tail = Some(Box::new(expr));
                break;
            },
        }
    }
    expect(tokens, &Token::RBrace)?;

    Ok(Block { statements,
               tail,
               pos })
}

/// Parses a conditional chain.
///
/// Syntax:
/// ```text
///     ? <condition> { ... }
///     ~? <condition> { ... }
///     ~ { ... }
/// ```
/// Any number of `~?` branches may follow the leading `?`, and a final `~`
/// branch is optional. Branches are collected into a flat ordered list
/// instead of nesting.
pub fn parse_if_chain<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let pos = expect(tokens, &Token::Question)?;
    let mut branches = Vec::new();

    let condition = parse_expression(tokens)?;
    branches.push((condition, parse_block(tokens)?));

    while consume_if(tokens, &Token::TildeQuestion).is_some() {
        let condition = parse_expression(tokens)?;
        branches.push((condition, parse_block(tokens)?));
    }

    let otherwise = if consume_if(tokens, &Token::Tilde).is_some() {
        Some(parse_block(tokens)?)
    } else {
        None
    };

    Ok(Expr::IfChain(IfChain { branches,
                               otherwise,
                               pos }))
}

/// Parses a while loop.
///
/// Grammar: `while := "$?" expression block`
pub fn parse_while<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let pos = expect(tokens, &Token::DollarQuestion)?;
    let condition = parse_expression(tokens)?;
    let body = parse_block(tokens)?;
    Ok(Expr::While { condition: Box::new(condition),
                     body,
                     pos })
}

/// Parses a range loop.
///
/// The range is half-open: `for i in 0..5 { }` visits 0 through 4.
///
/// Grammar: `for := "for" IDENT "in" expression ".." expression block`
pub fn parse_for<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let pos = expect(tokens, &Token::For)?;
    let (var, _) = parse_identifier(tokens)?;
    expect(tokens, &Token::In)?;
    let start = parse_expression(tokens)?;
    expect(tokens, &Token::DotDot)?;
    let end = parse_expression(tokens)?;
    let body = parse_block(tokens)?;
    Ok(Expr::For { var,
                   start: Box::new(start),
                   end: Box::new(end),
                   body,
                   pos })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ast::Statement, interpreter::lexer::tokenize};

    fn block(source: &str) -> Block {
        let tokens = tokenize(source).unwrap();
        parse_block(&mut tokens.iter().peekable()).unwrap()
    }

    #[test]
    fn trailing_expression_is_kept_apart() {
        let parsed = block("{ # a = 1; a + 1 }");
        assert_eq!(parsed.statements.len(), 1);
        assert!(parsed.tail.is_some());
    }

    #[test]
    fn terminated_last_statement_means_no_tail() {
        let parsed = block("{ # a = 1; a + 1; }");
        assert_eq!(parsed.statements.len(), 2);
        assert!(parsed.tail.is_none());
    }

    #[test]
    fn block_like_statements_need_no_semicolon() {
        let parsed = block("{ ? true { 1; } $? false { } for i in 0..2 { } 5 }");
        assert_eq!(parsed.statements.len(), 3);
        assert!(matches!(parsed.statements[0], Statement::Expression(Expr::IfChain(_))));
        assert!(parsed.tail.is_some());
    }

    #[test]
    fn if_chain_is_flat() {
        let parsed = block("{ ? a { 1 } ~? b { 2 } ~? c { 3 } ~ { 4 } }");
        let Some(tail) = parsed.tail else {
            panic!("chain should be the trailing value");
        };
        let Expr::IfChain(chain) = *tail else {
            panic!("expected chain");
        };
        assert_eq!(chain.branches.len(), 3);
        assert!(chain.otherwise.is_some());
    }

    #[test]
    fn unclosed_block_is_an_error() {
        let tokens = tokenize("{ # a = 1;").unwrap();
        assert!(parse_block(&mut tokens.iter().peekable()).is_err());
    }
}
