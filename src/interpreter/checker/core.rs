use std::rc::Rc;

use crate::{
    ast::{Function, Position, Program, Statement},
    error::{CheckError, NameError, TypeError},
    interpreter::checker::scope::{ScopeKind, TypeScope},
    types::{FunctionType, ParamType, Type},
};

/// Result type used by the checker.
pub type CheckResult<T> = Result<T, CheckError>;

/// Name of the entry point every program must define.
pub const ENTRY_POINT: &str = "main";

/// Static checking state.
///
/// The checker walks the tree once, resolving names against a stack of typed
/// scopes. It annotates the tree as it goes: unsuffixed integer literals
/// receive their final width, declarations their resolved type and calls
/// their generic instantiation.
pub struct Checker {
    /// Open scopes, global first.
    pub(crate) scopes:   Vec<TypeScope>,
    /// Declared return types of the enclosing functions and lambdas.
    pub(crate) returns:  Vec<Type>,
    /// Generic parameter names visible in type annotations.
    pub(crate) generics: Vec<Vec<String>>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    /// Creates a checker with only the global scope.
    #[must_use]
    pub fn new() -> Self {
        Self { scopes:   vec![TypeScope::new(ScopeKind::Global)],
               returns:  Vec::new(),
               generics: Vec::new(), }
    }

    /// Checks a whole program.
    ///
    /// Named functions are hoisted first so that any top-level code and any
    /// function body can call any function. Top-level statements are then
    /// checked in order, and function bodies last, when every global is
    /// known.
    ///
    /// # Errors
    /// Returns the first name or type error found.
    ///
    /// # Examples
    /// ```
    /// use obstruct::{interpreter::checker::core::Checker, parse_source};
    ///
    /// let mut program = parse_source("fn main(args: vec<<str>>) { # x: i64 = 1; }").unwrap();
    /// assert!(Checker::new().check_program(&mut program).is_ok());
    /// ```
    pub fn check_program(&mut self, program: &mut Program) -> CheckResult<()> {
        for statement in &program.statements {
            if let Statement::Function { name, function, pos } = statement {
                let ty = self.signature(function, *pos)?;
                self.declare(name, Type::Function(ty), false, *pos)?;
                tracing::debug!(function = %name, "hoisted function");
            }
        }

        for statement in &mut program.statements {
            if !matches!(statement, Statement::Function { .. }) {
                self.check_statement(statement)?;
            }
        }

        for statement in &mut program.statements {
            if let Statement::Function { name, function, .. } = statement {
                tracing::debug!(function = %name, "checking function body");
                self.check_function(Rc::make_mut(function), ScopeKind::Function)?;
            }
        }

        self.check_entry_point(program)
    }

    /// Builds the type of a function from its declaration, validating every
    /// annotation.
    pub(crate) fn signature(&mut self, function: &Function, pos: Position) -> CheckResult<FunctionType> {
        self.generics.push(function.generics.clone());
        let result = self.resolve_signature(function, pos);
        self.generics.pop();
        result
    }

    fn resolve_signature(&self, function: &Function, pos: Position) -> CheckResult<FunctionType> {
        let mut params = Vec::with_capacity(function.params.len());
        for param in &function.params {
            self.resolve_type(&param.ty, param.pos)?;
            params.push(ParamType { ty:      param.ty.clone(),
                                    mutable: param.mutable, });
        }
        let ret = function.ret.clone().unwrap_or(Type::Unit);
        self.resolve_type(&ret, pos)?;
        Ok(FunctionType { generics: function.generics.clone(),
                          params,
                          ret: Box::new(ret) })
    }

    /// Checks a function or lambda body against its signature.
    ///
    /// Parameters live in a scope of their own with the body block nested
    /// inside, which is exactly the shape the evaluator builds for a call.
    pub(crate) fn check_function(&mut self, function: &mut Function, kind: ScopeKind) -> CheckResult<FunctionType> {
        let ty = self.signature(function, function.pos)?;

        self.generics.push(function.generics.clone());
        self.push_scope(kind);
        for param in &function.params {
            self.declare(&param.name, param.ty.clone(), param.mutable, param.pos)?;
        }
        self.returns.push((*ty.ret).clone());

        let body = self.check_block(&mut function.body, Some(&ty.ret));

        self.returns.pop();
        self.pop_scope();
        self.generics.pop();

        let body = body?;
        if !ty.ret.accepts(&body) {
            let pos = function.body
                              .tail
                              .as_ref()
                              .map_or(function.body.pos, |tail| tail.pos());
            return Err(TypeError::Mismatch { expected: (*ty.ret).clone(),
                                             found: body,
                                             pos }.into());
        }
        Ok(ty)
    }

    fn check_entry_point(&self, program: &Program) -> CheckResult<()> {
        for statement in &program.statements {
            let Statement::Function { name, function, pos } = statement else {
                continue;
            };
            if name != ENTRY_POINT {
                continue;
            }

            let args_ok = function.params.len() == 1
                          && !function.params[0].mutable
                          && function.params[0].ty == Type::Vec(Box::new(Type::Str));
            let ret_ok = matches!(function.ret, None | Some(Type::Unit | Type::Int(_)));
            if function.generics.is_empty() && args_ok && ret_ok {
                return Ok(());
            }
            let found = self.lookup_global(ENTRY_POINT).unwrap_or(Type::Unit);
            return Err(TypeError::InvalidMain { found, pos: *pos }.into());
        }
        Err(NameError::MissingMain.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ast::{Expr, Literal},
        parse_source,
        types::IntWidth,
    };

    fn check(source: &str) -> CheckResult<Program> {
        let mut program = parse_source(source).unwrap();
        Checker::new().check_program(&mut program)?;
        Ok(program)
    }

    fn with_main(body: &str) -> String {
        format!("fn main(args: vec<<str>>) {{ {body} }}")
    }

    #[test]
    fn missing_main_is_a_name_error() {
        assert_eq!(check("# x = 1;").unwrap_err(), CheckError::Name(NameError::MissingMain));
    }

    #[test]
    fn main_signature_is_validated() {
        assert!(check("fn main(args: vec<<str>>) -> i32 { 0 }").is_ok());
        assert!(matches!(check("fn main() { }"),
                         Err(CheckError::Type(TypeError::InvalidMain { .. }))));
        assert!(matches!(check("fn main(args: vec<<str>>) -> str { \"\" }"),
                         Err(CheckError::Type(TypeError::InvalidMain { .. }))));
    }

    #[test]
    fn functions_are_hoisted() {
        let source = "fn main(args: vec<<str>>) { $$ later(1); }
                      fn later(x: i32) -> i32 { x }";
        assert!(check(source).is_ok());
    }

    #[test]
    fn named_functions_do_not_see_caller_locals() {
        let source = "fn helper() -> i32 { hidden }
                      fn main(args: vec<<str>>) { # hidden = 1; $$ helper(); }";
        assert!(matches!(check(source),
                         Err(CheckError::Name(NameError::Undefined { ref name, .. })) if name == "hidden"));
    }

    #[test]
    fn named_functions_see_globals() {
        let source = "# limit: i64 = 10;
                      fn main(args: vec<<str>>) { $$ limit; }";
        assert!(check(source).is_ok());
    }

    #[test]
    fn literal_widths_are_annotated() {
        let program = check(&with_main("# x: i8 = 100;")).unwrap();
        let Statement::Function { function, .. } = &program.statements[0] else {
            panic!("expected main");
        };
        let Statement::VarDecl(decl) = &function.body.statements[0] else {
            panic!("expected declaration");
        };
        assert!(matches!(decl.init,
                         Some(Expr::Literal { value: Literal::Int { width: IntWidth::I8, .. }, .. })));
        assert_eq!(decl.resolved, Some(Type::Int(IntWidth::I8)));
    }

    #[test]
    fn body_type_must_match_return_type() {
        assert!(matches!(check("fn f() -> i32 { true }
                                fn main(args: vec<<str>>) { }"),
                         Err(CheckError::Type(TypeError::Mismatch { .. }))));
        assert!(check("fn f() -> i32 { ret 1; }
                       fn main(args: vec<<str>>) { }").is_ok());
    }
}
