use crate::{
    ast::{Block, IfChain},
    interpreter::{
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
};

impl Context {
    /// Evaluates a block in a child scope.
    ///
    /// Each statement runs in order. The block's value is its trailing
    /// expression, or unit when it has none. Bindings declared in the block are
    /// dropped on exit, the last declared first.
    pub fn eval_block(&mut self, block: &Block) -> EvalResult<Value> {
        self.scoped(|ctx| ctx.eval_block_body(block))
    }

    /// Evaluates a block's statements and tail in the current scope.
    pub(crate) fn eval_block_body(&mut self, block: &Block) -> EvalResult<Value> {
        for statement in &block.statements {
            self.exec_statement(statement)?;
        }
        match &block.tail {
            Some(tail) => self.eval(tail),
            None => Ok(Value::Unit),
        }
    }

    /// Evaluates a conditional chain.
    ///
    /// Guards are tried in source order and only the body of the first true
    /// one runs. If none holds, the `~` body runs, or the chain yields unit
    /// when there is none.
    pub fn eval_if_chain(&mut self, chain: &IfChain) -> EvalResult<Value> {
        for (condition, body) in &chain.branches {
            if self.eval(condition)?.as_bool("?", condition.pos())? {
                return self.eval_block(body);
            }
        }
        match &chain.otherwise {
            Some(body) => self.eval_block(body),
            None => Ok(Value::Unit),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, run_captured};

    fn output(body: &str) -> String {
        run_captured(&format!("fn main(args: vec<<str>>) {{ {body} }}"), "", &Config::default()).stdout
    }

    #[test]
    fn first_true_guard_wins() {
        assert_eq!(output("? false { $$ 1; } ~? true { $$ 2; } ~? true { $$ 3; } ~ { $$ 4; }"), "2\n");
        assert_eq!(output("? false { $$ 1; } ~ { $$ 4; }"), "4\n");
        assert_eq!(output("$$ ? false { $$ 1; };"), "()\n");
    }

    #[test]
    fn block_value_is_its_tail() {
        assert_eq!(output("# v = { # a = 2; a * 3 }; $$ v;"), "6\n");
        assert_eq!(output("$$ { 5; };"), "()\n");
    }

    #[test]
    fn chains_yield_values() {
        assert_eq!(output("# x = 7; $$ ? x > 5 { \"big\" } ~ { \"small\" };"), "big\n");
    }
}
