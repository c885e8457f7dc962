use crate::{
    ast::{BinaryOperator, Position},
    error::RuntimeError,
    interpreter::{
        evaluator::{binary::core::invalid_operands, core::Context},
        value::core::Value,
    },
    types::IntWidth,
    util::num::{wrap, wrapping_pow},
};

impl Context {
    /// Evaluates an arithmetic operation.
    ///
    /// Both operands must have the same type. Integers wrap around at their
    /// width, so `127i8 + 1i8` is `-128i8`. Division and remainder by zero
    /// fail for integers and floats alike. `+` also concatenates a string
    /// with another string or with a character.
    ///
    /// # Errors
    /// - `DivisionByZero` for `/` or `%` with a zero divisor.
    /// - `NegativeExponent` for an integer raised to a negative power.
    /// - `InvalidOperands` for any other combination.
    ///
    /// # Example
    /// ```
    /// use obstruct::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    ///     types::IntWidth,
    /// };
    ///
    /// let x = Value::Int { value: 100, width: IntWidth::I8 };
    /// let y = Value::Int { value: 100, width: IntWidth::I8 };
    ///
    /// let result = Context::eval_scalar_op(BinaryOperator::Add, &x, &y, Default::default()).unwrap();
    /// assert_eq!(result, Value::Int { value: -56, width: IntWidth::I8 });
    ///
    /// let result = Context::eval_scalar_op(BinaryOperator::Mul,
    ///                                      &Value::Float(1.5),
    ///                                      &Value::Float(2.0),
    ///                                      Default::default()).unwrap();
    /// assert_eq!(result, Value::Float(3.0));
    /// ```
    pub fn eval_scalar_op(op: BinaryOperator, left: &Value, right: &Value, pos: Position) -> Result<Value, RuntimeError> {
        match (left, right) {
            (Value::Int { value: a, width: wa }, Value::Int { value: b, width: wb }) if wa == wb => {
                Ok(Value::Int { value: int_op(op, *wa, *a, *b, pos)?,
                                width: *wa, })
            },
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(float_op(op, *a, *b, pos)?)),
            (Value::Str(a), Value::Str(b)) if op == BinaryOperator::Add => Ok(Value::Str(format!("{a}{b}"))),
            (Value::Str(a), Value::Char(c)) if op == BinaryOperator::Add => {
                let mut joined = a.clone();
                joined.push(*c);
                Ok(Value::Str(joined))
            },
            _ => Err(invalid_operands(op, left, right, pos)),
        }
    }
}

fn int_op(op: BinaryOperator, width: IntWidth, a: i64, b: i64, pos: Position) -> Result<i64, RuntimeError> {
    use BinaryOperator::{Add, Div, Mul, Pow, Rem, Sub};

    let raw = match op {
        Add => a.wrapping_add(b),
        Sub => a.wrapping_sub(b),
        Mul => a.wrapping_mul(b),
        Div | Rem if b == 0 => return Err(RuntimeError::DivisionByZero { pos }),
        Div => a.wrapping_div(b),
        Rem => a.wrapping_rem(b),
        Pow => {
            let Ok(exponent) = u64::try_from(b) else {
                return Err(RuntimeError::NegativeExponent { exponent: b,
                                                            pos });
            };
            wrapping_pow(a, exponent)
        },
        _ => {
            return Err(RuntimeError::InvalidOperands { op: op.to_string(),
                                                       details: "integers".to_string(),
                                                       pos });
        },
    };
    Ok(wrap(width, raw))
}

fn float_op(op: BinaryOperator, a: f64, b: f64, pos: Position) -> Result<f64, RuntimeError> {
    use BinaryOperator::{Add, Div, Mul, Pow, Rem, Sub};

    Ok(match op {
        Add => a + b,
        Sub => a - b,
        Mul => a * b,
        Div | Rem if b == 0.0 => return Err(RuntimeError::DivisionByZero { pos }),
        Div => a / b,
        Rem => a % b,
        Pow => a.powf(b),
        _ => {
            return Err(RuntimeError::InvalidOperands { op: op.to_string(),
                                                       details: "floats".to_string(),
                                                       pos });
        },
    })
}
