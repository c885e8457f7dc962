use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Call, Expr, Position},
    error::RuntimeError,
    interpreter::{
        builtins::core::{BuiltinCall, BuiltinDef, Constraint, lookup as lookup_builtin},
        evaluator::core::{Argument, Context, EvalResult, GenericFrame, Unwind},
        runtime::environment::CellId,
        value::core::{Closure, Reference, Value},
    },
    types::Type,
};

/// Deepest nesting of user function calls before `StackOverflow`.
pub const MAX_CALL_DEPTH: usize = 10_000;

// Native stack left before a call moves onto a freshly allocated segment.
const STACK_RED_ZONE: usize = 128 * 1024;
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024;

impl Context {
    /// Evaluates a function call.
    ///
    /// The evaluator first checks whether the callee names a builtin. If so,
    /// the arguments are evaluated and handed to the native function.
    /// Otherwise the callee is evaluated to a closure and called.
    pub fn eval_call(&mut self, call: &Call) -> EvalResult<Value> {
        if let Expr::Identifier { name, .. } = call.callee.as_ref()
           && let Some(def) = lookup_builtin(name)
        {
            return self.call_builtin(def, call);
        }

        let callee = self.eval(&call.callee)?;
        let Value::Function(closure) = &callee else {
            return Err(RuntimeError::NotCallable { pos: call.pos }.into());
        };

        let mut args = Vec::with_capacity(call.args.len());
        for (param, arg) in closure.function.params.iter().zip(&call.args) {
            if param.mutable {
                args.push(Argument::Shared(self.place(arg, call.pos)?));
            } else {
                args.push(Argument::Value(self.eval(arg)?));
            }
        }
        let generics: Vec<Type> = call.instantiation.iter().map(|ty| self.concrete(ty)).collect();
        self.call_value(&callee, args, &generics, call.pos)
    }

    /// Calls a function value with already evaluated arguments.
    ///
    /// Parameters are bound in a new scope whose parent is the closure's
    /// environment: the global scope for named functions, the defining scope
    /// for lambdas. The body then runs in a block scope nested inside. A
    /// `ret` anywhere in the body ends the call with its value.
    ///
    /// # Errors
    /// Fails when the callee is not a function, when the argument count is
    /// wrong, when a lambda outlived the scope it captured, or when more than
    /// [`MAX_CALL_DEPTH`] calls are already running.
    pub fn call_value(&mut self,
                      callee: &Value,
                      args: Vec<Argument>,
                      generics: &[Type],
                      pos: Position)
                      -> EvalResult<Value> {
        let Value::Function(closure) = callee else {
            return Err(RuntimeError::NotCallable { pos }.into());
        };
        let function = &closure.function;
        let name = closure.name.as_deref().unwrap_or("lambda");
        if args.len() != function.params.len() {
            return Err(RuntimeError::ArgumentCountMismatch { name: name.to_string(),
                                                             expected: function.params.len().to_string(),
                                                             found: args.len(),
                                                             pos }.into());
        }
        if !self.env.is_live(closure.env) {
            return Err(RuntimeError::ExpiredClosure { pos }.into());
        }
        if self.depth >= MAX_CALL_DEPTH {
            return Err(RuntimeError::StackOverflow { depth: self.depth,
                                                     pos }.into());
        }
        tracing::debug!(function = name, args = args.len(), depth = self.depth, "call");

        let frame = Self::generic_frame(closure, generics);
        let caller_generics = std::mem::replace(&mut self.generics, frame);
        let caller_scope = self.scope;
        let params = self.env.push_scope(closure.env);

        for (param, arg) in function.params.iter().zip(args) {
            match arg {
                Argument::Value(value) => {
                    self.env.declare(params, &param.name, value, param.mutable);
                },
                Argument::Shared(cell) => self.env.alias(params, &param.name, cell),
            }
        }

        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || {
            self.enter(params, caller_scope, |ctx| ctx.eval_block(&function.body))
        });
        self.depth -= 1;
        self.generics = caller_generics;

        match result {
            Ok(value) | Err(Unwind::Return(value)) => Ok(value),
            Err(unwind) => Err(unwind),
        }
    }

    /// Builds the generic frame a call runs with: whatever the closure
    /// captured, plus this call's instantiation of the function's own
    /// parameters.
    fn generic_frame(closure: &Closure, generics: &[Type]) -> GenericFrame {
        if closure.function.generics.is_empty() {
            return Rc::clone(&closure.generics);
        }
        let mut frame: HashMap<String, Type> = (*closure.generics).clone();
        for (name, ty) in closure.function.generics.iter().zip(generics) {
            frame.insert(name.clone(), ty.clone());
        }
        Rc::new(frame)
    }

    /// Resolves an argument that must name a binding to that binding's cell.
    fn place(&self, arg: &Expr, pos: Position) -> EvalResult<CellId> {
        match arg {
            Expr::Identifier { name, pos } => Ok(self.env.lookup(self.scope, name, *pos)?),
            other => Err(RuntimeError::InvalidArgument { name:    "@".to_string(),
                                                         details: format!("expected a variable, found an expression at {}",
                                                                          other.pos()),
                                                         pos, }.into()),
        }
    }

    /// Evaluates the arguments of a builtin call and dispatches it.
    ///
    /// A `Place` builtin receives a reference to its argument's binding
    /// instead of a copy of the value.
    fn call_builtin(&mut self, def: &'static BuiltinDef, call: &Call) -> EvalResult<Value> {
        if !def.arity.check(call.args.len()) {
            return Err(RuntimeError::ArgumentCountMismatch { name:     def.name.to_string(),
                                                             expected: def.arity.to_string(),
                                                             found:    call.args.len(),
                                                             pos:      call.pos, }.into());
        }

        let mut args = Vec::with_capacity(call.args.len());
        for (i, arg) in call.args.iter().enumerate() {
            let value = match (def.constraint, i, arg) {
                (Constraint::Place, 0, Expr::Identifier { name, .. }) => {
                    let cell = self.place(arg, call.pos)?;
                    Value::Ref(Reference { cell,
                                           name: name.clone() })
                },
                _ => self.eval(arg)?,
            };
            args.push(value);
        }
        let types = call.instantiation.iter().map(|ty| self.concrete(ty)).collect();

        tracing::debug!(builtin = def.name, "call");
        (def.func)(self,
                   BuiltinCall { name: def.name,
                                 args,
                                 types,
                                 pos: call.pos })
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, run_captured};

    fn output(source: &str) -> String {
        run_captured(source, "", &Config::default()).stdout
    }

    #[test]
    fn named_functions_compute_values() {
        let source = "fn add(a: i32, b: i32) -> i32 { a + b }
                      fn main(args: vec<<str>>) { $$ add(10, 5); }";
        assert_eq!(output(source), "15\n");
    }

    #[test]
    fn mutable_parameters_share_the_callers_binding() {
        let source = "fn bump(@n: i32) { n = n + 1; }
                      fn main(args: vec<<str>>) { #@ a = 1; bump(a); bump(a); $$ a; }";
        assert_eq!(output(source), "3\n");
    }

    #[test]
    fn value_parameters_are_copies() {
        let source = "fn clear(v: vec<<i32>>) -> i32 { len(v) }
                      fn main(args: vec<<str>>) { # v = vec::new<<i32>>(); $$ clear(v); }";
        assert_eq!(output(source), "0\n");
    }

    #[test]
    fn lambdas_see_their_defining_scope() {
        let source = "fn main(args: vec<<str>>) {
                          #@ total = 0;
                          # add = lam(x: i32) { total = total + x; };
                          add(2); add(3);
                          $$ total;
                      }";
        assert_eq!(output(source), "5\n");
    }

    #[test]
    fn expired_closures_fail() {
        let source = "fn main(args: vec<<str>>) {
                          #@ f = lam() -> i32 { 0 };
                          { # k = 4; f = lam() -> i32 { k }; }
                          $$ f();
                      }";
        assert_eq!(run_captured(source, "", &Config::default()).exit_code(), 1);
    }

    #[test]
    fn generic_functions_know_their_instantiation() {
        let source = "fn describe<<T>>(x: T) -> str { type(x) }
                      fn main(args: vec<<str>>) { $$ describe(1i8); $$ describe(vec::new<<str>>()); }";
        assert_eq!(output(source), "i8\nvec<<str>>\n");
    }

    #[test]
    fn recursion_works() {
        let source = "fn fact(n: i64) -> i64 { ? n <= 1 { 1 } ~ { n * fact(n - 1) } }
                      fn main(args: vec<<str>>) { $$ fact(20); }";
        assert_eq!(output(source), "2432902008176640000\n");
    }

    #[test]
    fn deep_recursion_stays_on_the_grown_stack() {
        let source = "fn down(n: i32) -> i32 { ? n == 0 { 0 } ~ { 1 + down(n - 1) } }
                      fn main(args: vec<<str>>) { $$ down(9000); }";
        assert_eq!(output(source), "9000\n");
    }

    #[test]
    fn main_receives_its_arguments() {
        let source = "fn main(args: vec<<str>>) { $$ len(args); $$ args[1]; }";
        let config = Config::default().with_args(vec!["prog.obs".into(), "extra".into()]);
        assert_eq!(run_captured(source, "", &config).stdout, "2\nextra\n");
    }

    #[test]
    fn main_return_value_is_the_exit_code() {
        let source = "fn main(args: vec<<str>>) -> i32 { 7 }";
        assert_eq!(run_captured(source, "", &Config::default()).exit_code(), 7);
    }
}
