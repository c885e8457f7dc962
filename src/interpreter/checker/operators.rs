use crate::{
    ast::{BinaryOperator, Expr, Position, UnaryOperator},
    error::TypeError,
    interpreter::checker::{
        core::{CheckResult, Checker},
        expression::is_flexible_literal,
    },
    types::Type,
};

/// The result type of `left op right`, or `None` if the operator does not
/// apply to these operand types.
///
/// Arithmetic requires both sides to share a type: integers of one width or
/// two floats. `+` also concatenates strings, and appends a char to a
/// string. There are no implicit conversions.
#[must_use]
pub fn binary_rule(op: BinaryOperator, left: &Type, right: &Type) -> Option<Type> {
    use BinaryOperator::{Add, And, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mul, NotEqual, Or, Pow, Rem,
                         Sub};

    // A diverging operand takes the shape of the other one.
    let (left, right) = match (left, right) {
        (Type::Never, Type::Never) => return Some(Type::Never),
        (Type::Never, other) | (other, Type::Never) => (other, other),
        pair => pair,
    };

    match op {
        Add | Sub | Mul | Div | Rem | Pow => match (left, right) {
            (Type::Int(a), Type::Int(b)) if a == b => Some(left.clone()),
            (Type::Float, Type::Float) => Some(Type::Float),
            (Type::Str, Type::Str | Type::Char) if op == Add => Some(Type::Str),
            _ => None,
        },
        Equal | NotEqual => {
            (left == right && !matches!(left, Type::Function(_))).then_some(Type::Bool)
        },
        Less | LessEqual | Greater | GreaterEqual => {
            let ordered = matches!(left, Type::Int(_) | Type::Float | Type::Char | Type::Str);
            (left == right && ordered).then_some(Type::Bool)
        },
        And | Or => (*left == Type::Bool && *right == Type::Bool).then_some(Type::Bool),
    }
}

/// The result type of `op operand`.
#[must_use]
pub fn unary_rule(op: UnaryOperator, operand: &Type) -> Option<Type> {
    match (op, operand) {
        (_, Type::Never) => Some(Type::Never),
        (UnaryOperator::Negate, Type::Int(_) | Type::Float) | (UnaryOperator::Not, Type::Bool) => Some(operand.clone()),
        _ => None,
    }
}

const fn is_arithmetic(op: BinaryOperator) -> bool {
    matches!(op,
             BinaryOperator::Add
             | BinaryOperator::Sub
             | BinaryOperator::Mul
             | BinaryOperator::Div
             | BinaryOperator::Rem
             | BinaryOperator::Pow)
}

impl Checker {
    /// Checks a binary operation.
    ///
    /// An unsuffixed literal operand adopts the width of the other operand,
    /// so `x + 1` works for any integer `x`. When both sides are such
    /// literals, an integer width expected by the context applies to
    /// arithmetic.
    pub(crate) fn check_binary(&mut self,
                               op: BinaryOperator,
                               left: &mut Box<Expr>,
                               right: &mut Box<Expr>,
                               pos: Position,
                               expected: Option<&Type>)
                               -> CheckResult<Type> {
        let outer = match expected {
            Some(ty @ Type::Int(_)) if is_arithmetic(op) => Some(ty),
            _ => None,
        };

        let right_first = is_flexible_literal(left) && !is_flexible_literal(right);
        let (first, second) = if right_first { (right, left) } else { (left, right) };

        let first_ty = self.check_expr(first, outer)?;
        let hint = if first_ty.is_int() { Some(&first_ty) } else { outer };
        let second_ty = self.check_expr(second, hint)?;

        let (left_ty, right_ty) = if right_first { (second_ty, first_ty) } else { (first_ty, second_ty) };
        binary_rule(op, &left_ty, &right_ty).ok_or_else(|| {
                                                 TypeError::InvalidOperands { op,
                                                                              left: left_ty,
                                                                              right: right_ty,
                                                                              pos }.into()
                                             })
    }

    /// Checks a prefix operation.
    pub(crate) fn check_unary(&mut self,
                              op: UnaryOperator,
                              expr: &mut Box<Expr>,
                              pos: Position,
                              expected: Option<&Type>)
                              -> CheckResult<Type> {
        let hint = match (op, expected) {
            (UnaryOperator::Negate, Some(ty @ Type::Int(_))) => Some(ty),
            _ => None,
        };
        let operand = self.check_expr(expr, hint)?;
        unary_rule(op, &operand).ok_or_else(|| TypeError::InvalidOperand { op, operand, pos }.into())
    }
}
