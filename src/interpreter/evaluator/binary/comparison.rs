use std::cmp::Ordering;

use crate::{
    ast::{BinaryOperator, Position},
    error::RuntimeError,
    interpreter::{
        evaluator::{binary::core::invalid_operands, core::Context},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a comparison of the form `Value <Operator> Value`.
    ///
    /// `==` and `!=` compare structurally, so containers are equal when their
    /// elements are. The ordering operators accept integers of one width,
    /// floats, characters and strings; strings order lexicographically.
    ///
    /// # Example
    /// ```
    /// use obstruct::{
    ///     ast::BinaryOperator,
    ///     interpreter::{evaluator::core::Context, value::core::Value},
    /// };
    ///
    /// let lt = Context::eval_comparison(BinaryOperator::Less,
    ///                                   &Value::from("abc"),
    ///                                   &Value::from("abd"),
    ///                                   Default::default());
    /// assert_eq!(lt.unwrap(), Value::Bool(true));
    /// ```
    pub fn eval_comparison(op: BinaryOperator,
                           left: &Value,
                           right: &Value,
                           pos: Position)
                           -> Result<Value, RuntimeError> {
        match op {
            BinaryOperator::Equal => Ok(Value::Bool(left == right)),
            BinaryOperator::NotEqual => Ok(Value::Bool(left != right)),
            _ if matches!((left, right), (Value::Float(a), Value::Float(b)) if a.is_nan() || b.is_nan()) => {
                Ok(Value::Bool(false))
            },
            _ => {
                let ordering = order(left, right).ok_or_else(|| invalid_operands(op, left, right, pos))?;
                Ok(Value::Bool(match op {
                                   BinaryOperator::Less => ordering == Ordering::Less,
                                   BinaryOperator::LessEqual => ordering != Ordering::Greater,
                                   BinaryOperator::Greater => ordering == Ordering::Greater,
                                   _ => ordering != Ordering::Less,
                               }))
            },
        }
    }
}

/// Orders two values of the same orderable type. Returns `None` for
/// unorderable pairs.
fn order(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int { value: a, width: wa }, Value::Int { value: b, width: wb }) if wa == wb => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Char(a), Value::Char(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, run_captured};

    fn output(body: &str) -> String {
        run_captured(&format!("fn main(args: vec<<str>>) {{ {body} }}"), "", &Config::default()).stdout
    }

    #[test]
    fn orderings() {
        assert_eq!(output("$$ 1 < 2; $$ 2 <= 2; $$ 3 > 4; $$ 'a' >= 'b';"), "true\ntrue\nfalse\nfalse\n");
        assert_eq!(output("$$ \"apple\" < \"banana\"; $$ 1.5 > 0.5;"), "true\ntrue\n");
    }

    #[test]
    fn containers_compare_by_content() {
        assert_eq!(output("# a = [1, 2]; # b = [1, 2]; $$ a == b; $$ a != [2, 1];"), "true\ntrue\n");
    }
}
