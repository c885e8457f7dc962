use crate::{
    ast::{BinaryOperator, Expr, Position},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates `left op right`.
    ///
    /// `&&` and `||` evaluate their right operand only when the left one
    /// does not decide the result. Every other operator evaluates both
    /// operands, left first.
    pub fn eval_binary_op(&mut self,
                          op: BinaryOperator,
                          left: &Expr,
                          right: &Expr,
                          pos: Position)
                          -> EvalResult<Value> {
        match op {
            BinaryOperator::And | BinaryOperator::Or => {
                let lhs = self.eval(left)?.as_bool(&op.to_string(), pos)?;
                if lhs == (op == BinaryOperator::Or) {
                    return Ok(Value::Bool(lhs));
                }
                let rhs = self.eval(right)?.as_bool(&op.to_string(), pos)?;
                Ok(Value::Bool(rhs))
            },
            _ => {
                let lhs = self.eval(left)?;
                let rhs = self.eval(right)?;
                Ok(Self::eval_binary(op, &lhs, &rhs, pos)?)
            },
        }
    }

    /// Evaluates a binary operation between two values.
    ///
    /// This function routes the operation to specialized handlers depending on
    /// the operator. Arithmetic goes to `eval_scalar_op`, equality and
    /// ordering to `eval_comparison`. Logical operators are applied directly
    /// here, without short-circuiting, since both values already exist.
    ///
    /// # Example
    /// ```
    /// use obstruct::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let result = Context::eval_binary(BinaryOperator::Add,
    ///                                   &Value::from(3),
    ///                                   &Value::from(4),
    ///                                   Default::default());
    /// assert_eq!(result.unwrap(), Value::from(7));
    /// ```
    pub fn eval_binary(op: BinaryOperator, left: &Value, right: &Value, pos: Position) -> Result<Value, RuntimeError> {
        use BinaryOperator::{Add, And, Div, Equal, Greater, GreaterEqual, Less, LessEqual, Mul, NotEqual, Or, Pow, Rem,
                             Sub};

        match op {
            Add | Sub | Mul | Div | Rem | Pow => Self::eval_scalar_op(op, left, right, pos),
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => {
                Self::eval_comparison(op, left, right, pos)
            },
            And | Or => match (left, right) {
                (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(if op == And { *a && *b } else { *a || *b })),
                _ => Err(invalid_operands(op, left, right, pos)),
            },
        }
    }
}

/// The error for an operator applied to values it does not support.
pub(crate) fn invalid_operands(op: BinaryOperator, left: &Value, right: &Value, pos: Position) -> RuntimeError {
    RuntimeError::InvalidOperands { op: op.to_string(),
                                    details: format!("{} and {}", left.kind(), right.kind()),
                                    pos }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, run_captured};

    fn output(body: &str) -> String {
        run_captured(&format!("fn main(args: vec<<str>>) {{ {body} }}"), "", &Config::default()).stdout
    }

    #[test]
    fn logical_operators_short_circuit() {
        assert_eq!(output("# f = lam() -> bool { $$ \"called\"; true }; $$ false && f(); $$ true || f();"),
                   "false\ntrue\n");
        assert_eq!(output("# f = lam() -> bool { $ \"called \"; true }; $$ true && f();"),
                   "called true\n");
    }

    #[test]
    fn precedence_is_respected() {
        assert_eq!(output("$$ 2 + 3 * 4 ^ 2;"), "50\n");
        assert_eq!(output("$$ 10 - 4 - 3;"), "3\n");
        assert_eq!(output("$$ 1 < 2 && 3 >= 3 || false;"), "true\n");
    }
}
