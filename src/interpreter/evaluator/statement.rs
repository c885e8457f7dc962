use crate::{
    ast::{Statement, VarDecl},
    error::RuntimeError,
    interpreter::{
        evaluator::core::{Context, EvalResult, Unwind},
        value::core::Value,
    },
};

impl Context {
    /// Executes a single statement in the current scope.
    ///
    /// Named functions were bound when the program started, so their
    /// declarations are skipped here.
    pub fn exec_statement(&mut self, statement: &Statement) -> EvalResult<()> {
        match statement {
            Statement::Function { .. } => Ok(()),
            Statement::VarDecl(decl) => self.exec_declaration(decl),
            Statement::Assignment { name, value, pos } => {
                let value = self.eval(value)?;
                let cell = self.env.lookup(self.scope, name, *pos)?;
                if !self.env.is_mutable(cell) {
                    return Err(RuntimeError::ImmutableAssignment { name: name.clone(),
                                                                   pos:  *pos, }.into());
                }
                if !self.env.set(cell, value) {
                    return Err(RuntimeError::DanglingReference { name: name.clone(),
                                                                 pos:  *pos, }.into());
                }
                Ok(())
            },
            Statement::Delete { name, pos } => {
                self.env.delete(self.scope, name, *pos)?;
                Ok(())
            },
            Statement::Return { value, .. } => {
                let value = match value {
                    Some(value) => self.eval(value)?,
                    None => Value::Unit,
                };
                Err(Unwind::Return(value))
            },
            Statement::Expression(expr) => {
                self.eval(expr)?;
                Ok(())
            },
        }
    }

    fn exec_declaration(&mut self, decl: &VarDecl) -> EvalResult<()> {
        let value = match (&decl.init, &decl.resolved) {
            (Some(init), _) => self.eval(init)?,
            (None, Some(ty)) => {
                Self::default_value(&self.concrete(ty), decl.pos)?
            },
            (None, None) => {
                return Err(RuntimeError::NoDefault { ty:  "unknown".to_string(),
                                                     pos: decl.pos, }.into());
            },
        };
        self.env.declare(self.scope, &decl.name, value, decl.mutable);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{config::Config, run_captured};

    fn run_main(body: &str) -> crate::Captured {
        run_captured(&format!("fn main(args: vec<<str>>) {{ {body} }}"), "", &Config::default())
    }

    #[test]
    fn mutable_bindings_can_be_reassigned() {
        let captured = run_main("#@ x = 1; x = x + 41; $$ x;");
        assert_eq!(captured.stdout, "42\n");
    }

    #[test]
    fn declarations_without_initializer_use_defaults() {
        let captured = run_main("# n: i64; # s: str; # b: bool; # a: arr<<i8, 2>>; $$ n; $$ s; $$ b; $$ a;");
        assert_eq!(captured.stdout, "0\n\nfalse\n[0, 0]\n");
    }

    #[test]
    fn shadowing_in_a_block_leaves_the_outer_binding() {
        let captured = run_main("# x = 1; { # x = 2; $$ x; } $$ x;");
        assert_eq!(captured.stdout, "2\n1\n");
    }

    #[test]
    fn delete_inside_a_loop_is_caught_at_run_time() {
        let captured = run_main("#@ x = 1; #@ i = 0; $? i < 2 { i = i + 1; del x; }");
        assert_eq!(captured.exit_code(), 1);
    }

    #[test]
    fn globals_run_before_main() {
        let source = "# greeting = \"hi\"; $$ greeting; fn main(args: vec<<str>>) { $$ greeting; }";
        let captured = run_captured(source, "", &Config::default());
        assert_eq!(captured.stdout, "hi\nhi\n");
    }
}
