use crate::{
    ast::{Position, UnaryOperator},
    error::RuntimeError,
    interpreter::{evaluator::core::Context, value::core::Value},
    util::num::wrap,
};

impl Context {
    /// Evaluates a unary operation on a value.
    ///
    /// Supported operators:
    /// - `Negate`: integer negation, wrapping at the operand's width, and
    ///   float negation.
    /// - `Not`: boolean negation.
    ///
    /// # Example
    /// ```
    /// use obstruct::{
    ///     ast::UnaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    ///     types::IntWidth,
    /// };
    ///
    /// let v = Context::eval_unary(UnaryOperator::Negate, &Value::from(5), Default::default()).unwrap();
    /// assert_eq!(v, Value::from(-5));
    ///
    /// let min = Value::Int { value: -128, width: IntWidth::I8 };
    /// let v = Context::eval_unary(UnaryOperator::Negate, &min, Default::default()).unwrap();
    /// assert_eq!(v, min);
    ///
    /// let v = Context::eval_unary(UnaryOperator::Not, &Value::Bool(false), Default::default()).unwrap();
    /// assert_eq!(v, Value::Bool(true));
    /// ```
    pub fn eval_unary(op: UnaryOperator, value: &Value, pos: Position) -> Result<Value, RuntimeError> {
        match (op, value) {
            (UnaryOperator::Negate, Value::Int { value, width }) => Ok(Value::Int { value: wrap(*width,
                                                                                               value.wrapping_neg()),
                                                                                    width: *width, }),
            (UnaryOperator::Negate, Value::Float(f)) => Ok(Value::Float(-f)),
            (UnaryOperator::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
            _ => Err(RuntimeError::InvalidOperands { op: op.to_string(),
                                                     details: value.kind().to_string(),
                                                     pos }),
        }
    }
}
