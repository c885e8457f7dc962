use crate::{
    ast::{Expr, Position},
    error::{NameError, RuntimeError},
    interpreter::{
        evaluator::core::{Context, EvalResult, Unwind},
        runtime::environment::ScopeId,
        value::core::{MAX_DEFAULT_CELLS, Value},
    },
    types::Type,
};

impl Context {
    /// Runs `f` inside a fresh child scope of the current one.
    ///
    /// The scope is closed again whichever way `f` finishes, dropping its
    /// bindings in reverse declaration order. `quit()` is the exception: it
    /// leaves every scope as it is.
    pub fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> EvalResult<T>) -> EvalResult<T> {
        let parent = self.scope;
        let scope = self.env.push_scope(parent);
        self.enter(scope, parent, f)
    }

    /// Runs `f` with `scope` as the current scope, then closes `scope` and
    /// returns to `resume`.
    pub(crate) fn enter<T>(&mut self,
                           scope: ScopeId,
                           resume: ScopeId,
                           f: impl FnOnce(&mut Self) -> EvalResult<T>)
                           -> EvalResult<T> {
        self.scope = scope;
        let result = f(self);
        self.scope = resume;
        if !matches!(result, Err(Unwind::Quit(_))) {
            self.env.pop_scope(scope);
        }
        result
    }

    /// Looks up a variable by name.
    ///
    /// Lookup starts in the current scope and walks outwards. The value is
    /// copied out of its cell, so later writes to the binding do not affect
    /// it.
    ///
    /// # Example
    /// ```
    /// use obstruct::interpreter::{evaluator::core::Context, runtime::host::Host, value::core::Value};
    ///
    /// let (host, _) = Host::captured("", None);
    /// let mut ctx = Context::new(host);
    /// let global = ctx.env.global();
    /// ctx.env.declare(global, "x", Value::from(10), false);
    ///
    /// let v = ctx.eval_variable("x", Default::default()).unwrap();
    /// assert_eq!(v, Value::from(10));
    /// ```
    pub fn eval_variable(&self, name: &str, pos: Position) -> EvalResult<Value> {
        let cell = self.env.lookup(self.scope, name, pos)?;
        let value = self.env
                        .get(cell)
                        .cloned()
                        .ok_or_else(|| NameError::Deleted { name: name.to_string(),
                                                            pos })?;
        Ok(value)
    }

    /// Evaluates `target[index]` for strings, vectors and arrays.
    ///
    /// Strings are indexed by character.
    pub fn eval_index(&mut self, target: &Expr, index: &Expr, pos: Position) -> EvalResult<Value> {
        let target = self.eval(target)?;
        let index = self.eval(index)?.as_int("index", pos)?;

        let out_of_bounds = |len| RuntimeError::IndexOutOfBounds { index, len, pos };
        match target {
            Value::Str(s) => {
                let len = s.chars().count();
                usize::try_from(index).ok()
                                      .and_then(|i| s.chars().nth(i))
                                      .map(Value::Char)
                                      .ok_or_else(|| out_of_bounds(len).into())
            },
            Value::Vec(items) | Value::Arr(items) => {
                let len = items.len();
                usize::try_from(index).ok()
                                      .and_then(|i| items.into_iter().nth(i))
                                      .ok_or_else(|| out_of_bounds(len).into())
            },
            other => Err(RuntimeError::InvalidOperands { op:      "[]".to_string(),
                                                         details: format!("cannot index {}", other.kind()),
                                                         pos, }.into()),
        }
    }

    /// Builds the default value of a concrete type.
    ///
    /// Arrays whose defaults would hold more than [`MAX_DEFAULT_CELLS`]
    /// values fail before anything is allocated.
    pub(crate) fn default_value(ty: &Type, pos: Position) -> EvalResult<Value> {
        if ty.cells().is_none_or(|cells| cells > MAX_DEFAULT_CELLS) {
            return Err(RuntimeError::AllocationFailed { ty: ty.to_string(),
                                                        pos }.into());
        }
        Value::default_for(ty).ok_or_else(|| {
                                  RuntimeError::NoDefault { ty: ty.to_string(),
                                                            pos }.into()
                              })
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, run_captured};

    #[test]
    fn indexing_checks_bounds() {
        let captured = run_captured("fn main(args: vec<<str>>) { # a = [1, 2]; $$ a[2]; }", "", &Config::default());
        assert_eq!(captured.exit_code(), 1);

        let captured = run_captured("fn main(args: vec<<str>>) { $$ \"héllo\"[1]; }", "", &Config::default());
        assert_eq!(captured.stdout, "é\n");
    }

    #[test]
    fn negative_indices_are_out_of_bounds() {
        let captured = run_captured("fn main(args: vec<<str>>) { # a = [1, 2]; $$ a[-1]; }", "", &Config::default());
        assert_eq!(captured.exit_code(), 1);
    }
}
