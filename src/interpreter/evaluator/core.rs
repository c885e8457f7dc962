use std::{collections::HashMap, rc::Rc};

use crate::{
    ast::{Expr, Position, Program, Statement},
    error::{NameError, RuntimeError},
    interpreter::{
        checker::core::ENTRY_POINT,
        runtime::{
            environment::{CellId, Environment, ScopeId},
            heap::Heap,
            host::Host,
        },
        value::core::{Closure, Value},
    },
    types::Type,
    util::num::exit_code,
};

/// Result type used by the evaluator.
///
/// The error side carries every way evaluation can leave an expression
/// early, not only failures.
pub type EvalResult<T> = Result<T, Unwind>;

/// Concrete types bound to generic parameter names.
pub type GenericFrame = Rc<HashMap<String, Type>>;

/// Non-local exits from evaluation.
#[derive(Debug)]
pub enum Unwind {
    /// A runtime error; aborts the program.
    Error(RuntimeError),
    /// `ret`, caught at the nearest call boundary.
    Return(Value),
    /// `quit()`; stops the program without finalising any scope.
    Quit(i32),
}

impl From<RuntimeError> for Unwind {
    fn from(err: RuntimeError) -> Self {
        Self::Error(err)
    }
}

impl From<NameError> for Unwind {
    fn from(err: NameError) -> Self {
        Self::Error(RuntimeError::Name(err))
    }
}

/// Stores the runtime evaluation context.
///
/// This struct holds the interpreter state: the scope arena with all binding
/// cells, the heap behind `ptr<<T>>` values, the host services and the
/// position of evaluation within the arena.
///
/// ## Usage
///
/// A `Context` runs one program. [`Context::run_program`] hoists functions,
/// runs the top-level statements and calls `main`.
pub struct Context {
    /// Scopes and binding cells.
    pub env:             Environment,
    /// Heap slots.
    pub heap:            Heap,
    /// Output, input and window.
    pub host:            Host,
    /// The scope new bindings go into.
    pub scope:           ScopeId,
    /// Generic arguments of the function currently running.
    pub(crate) generics: GenericFrame,
    /// Number of user calls currently running.
    pub(crate) depth:    usize,
}

impl Context {
    /// Creates a context with an empty global scope.
    #[must_use]
    pub fn new(host: Host) -> Self {
        let env = Environment::new();
        let scope = env.global();
        Self { env,
               heap: Heap::new(),
               host,
               scope,
               generics: GenericFrame::default(),
               depth: 0 }
    }

    /// Runs a checked program and returns its exit code.
    ///
    /// Named functions are bound in the global scope first, top-level
    /// statements then run in order, and finally `main` is called with
    /// `args`, whose first element is conventionally the program path. When
    /// `main` returns, the global bindings are dropped.
    ///
    /// # Errors
    /// Unwinds with `Unwind::Error` on a runtime error and `Unwind::Quit` when
    /// the program calls `quit()`.
    pub fn run_program(&mut self, program: &Program, args: Vec<String>) -> EvalResult<i32> {
        tracing::info!(statements = program.statements.len(), "program started");
        let global = self.env.global();

        for statement in &program.statements {
            if let Statement::Function { name, function, .. } = statement {
                let closure = Closure { name:     Some(name.clone()),
                                        function: Rc::clone(function),
                                        env:      global,
                                        generics: GenericFrame::default(), };
                self.env
                    .declare(global, name, Value::Function(Rc::new(closure)), false);
            }
        }

        for statement in &program.statements {
            self.exec_statement(statement)?;
        }

        let entry = Expr::Identifier { name: ENTRY_POINT.to_string(),
                                       pos:  Position::default(), };
        let main = self.eval(&entry)?;
        let args = Value::Vec(args.into_iter().map(Value::Str).collect());
        let result = self.call_value(&main, vec![Argument::Value(args)], &[], Position::default())?;

        let code = match result {
            Value::Int { value, .. } => exit_code(value),
            _ => 0,
        };
        self.env.pop_scope(global);
        tracing::info!(exit_code = code,
                       live_slots = self.heap.live_slots(),
                       "program finished");
        Ok(code)
    }

    /// Evaluates an expression and returns the resulting value.
    ///
    /// This is the main entry point for expression evaluation. Every well
    /// typed expression produces a value; constructs without a meaningful
    /// one, such as loops, produce unit.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal { value, .. } => Ok(Value::from(value)),
            Expr::Identifier { name, pos } => self.eval_variable(name, *pos),
            Expr::Binary { op, left, right, pos } => self.eval_binary_op(*op, left, right, *pos),
            Expr::Unary { op, expr, pos } => {
                let value = self.eval(expr)?;
                Ok(Self::eval_unary(*op, &value, *pos)?)
            },
            Expr::Call(call) => self.eval_call(call),
            Expr::Index { target, index, pos } => self.eval_index(target, index, *pos),
            Expr::Array { elements, .. } => {
                let values = elements.iter()
                                     .map(|element| self.eval(element))
                                     .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::Arr(values))
            },
            Expr::Block(block) => self.eval_block(block),
            Expr::IfChain(chain) => self.eval_if_chain(chain),
            Expr::While { condition, body, .. } => self.eval_while(condition, body),
            Expr::For { var,
                        start,
                        end,
                        body,
                        pos, } => self.eval_for(var, start, end, body, *pos),
            Expr::Lambda { function, .. } => {
                let closure = Closure { name:     None,
                                        function: Rc::clone(function),
                                        env:      self.scope,
                                        generics: Rc::clone(&self.generics), };
                Ok(Value::Function(Rc::new(closure)))
            },
            Expr::Print { newline, expr, pos } => {
                let value = self.eval(expr)?;
                let mut text = value.to_string();
                if *newline {
                    text.push('\n');
                }
                self.host.write(&text, *pos)?;
                Ok(value)
            },
        }
    }

    /// Replaces the generic parameters in `ty` with the arguments of the
    /// running function.
    #[must_use]
    pub fn concrete(&self, ty: &Type) -> Type {
        if self.generics.is_empty() { ty.clone() } else { ty.substitute(&self.generics) }
    }
}

/// How an argument reaches a parameter.
#[derive(Debug)]
pub enum Argument {
    /// A copy of the value, bound to a fresh cell.
    Value(Value),
    /// The caller's own cell, for `@` parameters.
    Shared(CellId),
}
