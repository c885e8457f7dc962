use crate::{
    ast::{Block, Expr, Position},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a `$?` loop.
    ///
    /// The condition is evaluated before every iteration, and each iteration
    /// runs the body in a fresh scope. The loop itself yields unit.
    pub fn eval_while(&mut self, condition: &Expr, body: &Block) -> EvalResult<Value> {
        while self.eval(condition)?.as_bool("$?", condition.pos())? {
            self.eval_block(body)?;
        }
        Ok(Value::Unit)
    }

    /// Evaluates a `for` loop over the half-open range `start..end`.
    ///
    /// Both bounds are evaluated once, before the first iteration. The loop
    /// variable is an immutable binding of the bounds' width in a scope of
    /// its own, so every iteration sees a fresh binding. An empty or reversed
    /// range runs zero times.
    ///
    /// # Example
    /// ```
    /// use obstruct::{config::Config, run_captured};
    ///
    /// let source = "fn main(args: vec<<str>>) { for i in 0..3 { $ i; } }";
    /// assert_eq!(run_captured(source, "", &Config::default()).stdout, "012");
    /// ```
    pub fn eval_for(&mut self,
                    var: &str,
                    start: &Expr,
                    end: &Expr,
                    body: &Block,
                    pos: Position)
                    -> EvalResult<Value> {
        let (first, width) = match self.eval(start)? {
            Value::Int { value, width } => (value, width),
            other => {
                return Err(RuntimeError::InvalidOperands { op:      "..".to_string(),
                                                           details: format!("range start is {}", other.kind()),
                                                           pos, }.into());
            },
        };
        let last = self.eval(end)?.as_int("..", pos)?;

        for value in first..last {
            tracing::trace!(var, value, "loop iteration");
            self.scoped(|ctx| {
                    ctx.env.declare(ctx.scope, var, Value::Int { value, width }, false);
                    ctx.eval_block(body)
                })?;
        }
        Ok(Value::Unit)
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, run_captured};

    fn output(body: &str) -> String {
        run_captured(&format!("fn main(args: vec<<str>>) {{ {body} }}"), "", &Config::default()).stdout
    }

    #[test]
    fn for_excludes_the_end() {
        assert_eq!(output("for i in 0..5 { $$ i; }"), "0\n1\n2\n3\n4\n");
        assert_eq!(output("for i in 3..1 { $$ i; }"), "");
    }

    #[test]
    fn for_bounds_are_evaluated_once() {
        assert_eq!(output("#@ n = 3; for i in 0..n { n = n + 1; } $$ n;"), "6\n");
    }

    #[test]
    fn while_reevaluates_its_condition() {
        assert_eq!(output("#@ i = 0; $? i < 3 { $ i; i = i + 1; }"), "012");
    }

    #[test]
    fn every_iteration_gets_a_fresh_scope() {
        assert_eq!(output("for i in 0..2 { # sq = i * i; $$ sq; }"), "0\n1\n");
    }

    #[test]
    fn ret_leaves_the_loop() {
        let source = "fn first_even(limit: i32) -> i32 { for i in 1..limit { ? i % 2 == 0 { ret i; } } -1 }
                      fn main(args: vec<<str>>) { $$ first_even(10); }";
        assert_eq!(run_captured(source, "", &Config::default()).stdout, "2\n");
    }
}
