use std::iter::Peekable;

use crate::{
    ast::{BinaryOperator, Expr, Position},
    interpreter::{
        lexer::Token,
        parser::{core::ParseResult, unary::parse_unary},
    },
};

/// Parses logical OR expressions.
///
/// Grammar: `logical_or := logical_and ("||" logical_and)*`
pub fn parse_logical_or<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    parse_left_assoc(tokens, parse_logical_and, &[BinaryOperator::Or])
}

/// Parses logical AND expressions.
///
/// Grammar: `logical_and := comparison ("&&" comparison)*`
pub fn parse_logical_and<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    parse_left_assoc(tokens, parse_comparison, &[BinaryOperator::And])
}

/// Parses comparison expressions.
///
/// Only the single-character `<` and `>` compare; `<<` and `>>` are reserved
/// for generic lists and never reach this level as operators.
///
/// Grammar: `comparison := additive (("==" | "!=" | "<" | "<=" | ">" | ">=")
/// additive)*`
pub fn parse_comparison<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    parse_left_assoc(tokens,
                     parse_additive,
                     &[BinaryOperator::Equal,
                       BinaryOperator::NotEqual,
                       BinaryOperator::Less,
                       BinaryOperator::LessEqual,
                       BinaryOperator::Greater,
                       BinaryOperator::GreaterEqual])
}

/// Parses addition and subtraction expressions.
///
/// The rule is: `additive := multiplicative (("+" | "-") multiplicative)*`
pub fn parse_additive<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    parse_left_assoc(tokens, parse_multiplicative, &[BinaryOperator::Add, BinaryOperator::Sub])
}

/// Parses multiplication-level expressions.
///
/// The rule is: `multiplicative := power (("*" | "/" | "%") power)*`
pub fn parse_multiplicative<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    parse_left_assoc(tokens,
                     parse_power,
                     &[BinaryOperator::Mul, BinaryOperator::Div, BinaryOperator::Rem])
}

/// Parses exponentiation.
///
/// Like every other binary level, `^` associates to the left, so `2 ^ 3 ^ 2`
/// is `(2 ^ 3) ^ 2`.
pub fn parse_power<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    parse_left_assoc(tokens, parse_unary, &[BinaryOperator::Pow])
}

/// Folds `operand (op operand)*` into a left-leaning tree for the listed
/// operators.
fn parse_left_assoc<'a, I>(tokens: &mut Peekable<I>,
                           operand: fn(&mut Peekable<I>) -> ParseResult<Expr>,
                           ops: &[BinaryOperator])
                           -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let mut left = operand(tokens)?;
    while let Some((token, pos)) = tokens.peek()
          && let Some(op) = token_to_binary_operator(token)
          && ops.contains(&op)
    {
        let pos = *pos;
        tokens.next();
        let right = operand(tokens)?;
        left = Expr::Binary { op,
                              left: Box::new(left),
                              right: Box::new(right),
                              pos };
    }
    Ok(left)
}

/// Converts a token to its corresponding binary operator, if any.
const fn token_to_binary_operator(token: &Token) -> Option<BinaryOperator> {
    match token {
        Token::Plus => Some(BinaryOperator::Add),
        Token::Minus => Some(BinaryOperator::Sub),
        Token::Star => Some(BinaryOperator::Mul),
        Token::Slash => Some(BinaryOperator::Div),
        Token::Percent => Some(BinaryOperator::Rem),
        Token::Caret => Some(BinaryOperator::Pow),
        Token::EqEq => Some(BinaryOperator::Equal),
        Token::BangEq => Some(BinaryOperator::NotEqual),
        Token::Less => Some(BinaryOperator::Less),
        Token::LessEq => Some(BinaryOperator::LessEqual),
        Token::Greater => Some(BinaryOperator::Greater),
        Token::GreaterEq => Some(BinaryOperator::GreaterEqual),
        Token::AndAnd => Some(BinaryOperator::And),
        Token::OrOr => Some(BinaryOperator::Or),
        _ => None,
    }
}
