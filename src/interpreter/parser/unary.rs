use std::{iter::Peekable, rc::Rc};

use crate::{
    ast::{Call, Expr, Function, Literal, Position, UnaryOperator},
    interpreter::{
        lexer::Token,
        parser::{
            block::{parse_block, parse_for, parse_if_chain, parse_while},
            core::{ParseResult, parse_expression},
            types::{parse_generic_params, parse_params, parse_return_type, parse_type_args},
            utils::{consume_if, error_at_next, expect, parse_comma_separated, parse_identifier},
        },
    },
};

/// Parses a unary expression.
///
/// Supports prefix operators:
/// - `-` arithmetic negation
/// - `!` logical negation
///
/// Prefix operators nest, so `--x` and `!!b` are accepted.
///
/// Grammar: `unary := ("-" | "!") unary | postfix`
pub fn parse_unary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let op = match tokens.peek() {
        Some((Token::Minus, pos)) => Some((UnaryOperator::Negate, *pos)),
        Some((Token::Bang, pos)) => Some((UnaryOperator::Not, *pos)),
        _ => None,
    };
    if let Some((op, pos)) = op {
        tokens.next();
        let expr = parse_unary(tokens)?;
        return Ok(Expr::Unary { op,
                                expr: Box::new(expr),
                                pos });
    }

    let primary = parse_primary(tokens)?;
    parse_postfix(tokens, primary)
}

/// Parses a primary expression: the operand at the highest precedence.
///
/// Grammar (simplified):
/// ```text
///     primary := literal
///              | path
///              | "in" | "quit"
///              | "(" expression ")"
///              | "[" elements "]"
///              | block | if_chain | while | for
///              | lambda
///              | ("$" | "$$") expression
/// ```
pub(crate) fn parse_primary<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let Some((token, pos)) = tokens.peek().copied() else {
        return Err(error_at_next(tokens, "expression"));
    };
    let pos = *pos;

    match token {
        Token::Integer(lit) => {
            tokens.next();
            Ok(Expr::Literal { value: Literal::Int { value:    lit.value,
                                                     width:    lit.width.unwrap_or_default(),
                                                     suffixed: lit.width.is_some(), },
                               pos })
        },
        Token::Float(v) => literal(tokens, Literal::from(*v), pos),
        Token::Bool(b) => literal(tokens, Literal::from(*b), pos),
        Token::Char(c) => literal(tokens, Literal::from(*c), pos),
        Token::Str(s) => literal(tokens, Literal::from(s.clone()), pos),
        Token::Identifier(_) => parse_path(tokens),
        Token::In | Token::Quit => {
            tokens.next();
            let name = if matches!(token, Token::In) { "in" } else { "quit" };
            Ok(Expr::Identifier { name: name.to_string(),
                                  pos })
        },
        Token::LParen => {
            tokens.next();
            let expr = parse_expression(tokens)?;
            expect(tokens, &Token::RParen)?;
            Ok(expr)
        },
        Token::LBracket => {
            tokens.next();
            let elements = parse_comma_separated(tokens, parse_expression, &Token::RBracket)?;
            Ok(Expr::Array { elements, pos })
        },
        Token::LBrace => Ok(Expr::Block(parse_block(tokens)?)),
        Token::Question => parse_if_chain(tokens),
        Token::DollarQuestion => parse_while(tokens),
        Token::For => parse_for(tokens),
        Token::Lam => parse_lambda(tokens),
        Token::Dollar | Token::DollarDollar => {
            tokens.next();
            let expr = parse_expression(tokens)?;
            Ok(Expr::Print { newline: matches!(token, Token::DollarDollar),
                             expr: Box::new(expr),
                             pos })
        },
        _ => Err(error_at_next(tokens, "expression")),
    }
}

fn literal<'a, I>(tokens: &mut Peekable<I>, value: Literal, pos: Position) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    tokens.next();
    Ok(Expr::Literal { value, pos })
}

/// Parses `IDENT ("::" IDENT)*` into a single identifier node.
///
/// Builtin paths such as `vec::push` and `i32::new` are kept as one name.
fn parse_path<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let (mut name, pos) = parse_identifier(tokens)?;
    while consume_if(tokens, &Token::ColonColon).is_some() {
        let (segment, _) = parse_identifier(tokens)?;
        name.push_str("::");
        name.push_str(&segment);
    }
    Ok(Expr::Identifier { name, pos })
}

/// Parses postfix operators applied to an expression.
///
/// Handles two kinds of postfix constructs, which may be chained:
///
/// 1. **Calls**, optionally with explicit generic arguments:
/// ```text
///        f(a, b)
///        vec::new<<i32>>()
/// ```
/// 2. **Indexing**: `a[0][1]`
///
/// A `<<` after an identifier is only read as a generic list when it forms a
/// complete type-argument list immediately followed by `(`. Otherwise the
/// cursor is restored and the tokens are left for the operator grammar.
fn parse_postfix<'a, I>(tokens: &mut Peekable<I>, mut node: Expr) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    loop {
        let mut generics = Vec::new();
        if matches!(node, Expr::Identifier { .. }) && matches!(tokens.peek(), Some((Token::Shl, _))) {
            let mut attempt = tokens.clone();
            if let Ok(args) = parse_type_args(&mut attempt)
               && matches!(attempt.peek(), Some((Token::LParen, _)))
            {
                *tokens = attempt;
                generics = args;
            }
        }

        match tokens.peek() {
            Some((Token::LParen, _)) => {
                tokens.next();
                let args = parse_comma_separated(tokens, parse_expression, &Token::RParen)?;
                let pos = node.pos();
                node = Expr::Call(Call { callee: Box::new(node),
                                         args,
                                         generics,
                                         instantiation: Vec::new(),
                                         pos });
            },
            Some((Token::LBracket, pos)) => {
                let pos = *pos;
                tokens.next();
                let index = parse_expression(tokens)?;
                expect(tokens, &Token::RBracket)?;
                node = Expr::Index { target: Box::new(node),
                                     index: Box::new(index),
                                     pos };
            },
            _ => break,
        }
    }
    Ok(node)
}

/// Parses a lambda expression.
///
/// Grammar: `lambda := "lam" generics? params ("->" type)? block`
fn parse_lambda<'a, I>(tokens: &mut Peekable<I>) -> ParseResult<Expr>
    where I: Iterator<Item = &'a (Token, Position)> + Clone
{
    let pos = expect(tokens, &Token::Lam)?;
    let generics = parse_generic_params(tokens)?;
    let params = parse_params(tokens)?;
    let ret = parse_return_type(tokens)?;
    let body = parse_block(tokens)?;
    Ok(Expr::Lambda { function: Rc::new(Function { generics,
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
        ast::BinaryOperator, error::ParseError, interpreter::lexer::tokenize, types::Type,
    };

    fn expr(source: &str) -> ParseResult<Expr> {
        let tokens = tokenize(source).unwrap();
        let mut iter = tokens.iter().peekable();
        let parsed = parse_expression(&mut iter)?;
        assert!(iter.next().is_none(), "trailing tokens in {source:?}");
        Ok(parsed)
    }

    #[test]
    fn generic_call_after_identifier() {
        let Expr::Call(call) = expr("vec::new<<i32>>()").unwrap() else {
            panic!("expected a call");
        };
        assert_eq!(call.generics, vec![Type::I32]);
        assert!(matches!(*call.callee, Expr::Identifier { ref name, .. } if name == "vec::new"));
    }

    #[test]
    fn failed_generic_list_backtracks() {
        // `a << b` cannot be a type-argument list followed by `(`, so the
        // tokens stay unconsumed and the caller sees the `<<`.
        let tokens = tokenize("a << b").unwrap();
        let mut iter = tokens.iter().peekable();
        let parsed = parse_expression(&mut iter).unwrap();
        assert!(matches!(parsed, Expr::Identifier { .. }));
        assert_eq!(iter.next().map(|(t, _)| t), Some(&Token::Shl));
    }

    #[test]
    fn comparisons_are_not_generics() {
        let parsed = expr("a < b").unwrap();
        assert!(matches!(parsed, Expr::Binary { op: BinaryOperator::Less, .. }));
    }

    #[test]
    fn operators_are_left_associative() {
        let Expr::Binary { op, left, .. } = expr("10 - 4 - 3").unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOperator::Sub);
        assert!(matches!(*left, Expr::Binary { op: BinaryOperator::Sub, .. }));

        let Expr::Binary { left, .. } = expr("2 ^ 3 ^ 2").unwrap() else {
            panic!("expected binary");
        };
        assert!(matches!(*left, Expr::Binary { op: BinaryOperator::Pow, .. }));
    }

    #[test]
    fn precedence_binds_multiplication_tighter() {
        let Expr::Binary { op, right, .. } = expr("1 + 2 * 3").unwrap() else {
            panic!("expected binary");
        };
        assert_eq!(op, BinaryOperator::Add);
        assert!(matches!(*right, Expr::Binary { op: BinaryOperator::Mul, .. }));
    }

    #[test]
    fn print_wraps_the_whole_expression() {
        let Expr::Print { newline, expr: inner, .. } = expr("$$ 1 + 2").unwrap() else {
            panic!("expected print");
        };
        assert!(newline);
        assert!(matches!(*inner, Expr::Binary { .. }));
    }

    #[test]
    fn lambda_with_mutable_parameter() {
        let Expr::Lambda { function, .. } = expr("lam(@x: i32, y: i32) -> i32 { x + y }").unwrap()
        else {
            panic!("expected lambda");
        };
        assert!(function.params[0].mutable);
        assert!(!function.params[1].mutable);
        assert_eq!(function.ret, Some(Type::I32));
        assert!(function.body.tail.is_some());
    }

    #[test]
    fn calls_and_indexing_chain() {
        let parsed = expr("f(1)(2)[0]").unwrap();
        let Expr::Index { target, .. } = parsed else {
            panic!("expected index");
        };
        assert!(matches!(*target, Expr::Call(_)));
    }

    #[test]
    fn missing_operand_reports_expected_expression() {
        assert!(matches!(expr("1 +"), Err(ParseError::UnexpectedEndOfInput { .. })));
        assert!(matches!(expr("1 + ;"), Err(ParseError::UnexpectedToken { .. })));
    }
}
