use crate::{
    ast::{Block, Statement, VarDecl},
    error::TypeError,
    interpreter::checker::{
        core::{CheckResult, Checker},
        scope::ScopeKind,
    },
    types::Type,
};

impl Checker {
    /// Checks one statement and reports whether it diverges, that is whether
    /// control never continues past it.
    ///
    /// `ret` always diverges; an expression statement diverges when its type
    /// is `Never`, as for `quit()`.
    pub(crate) fn check_statement(&mut self, statement: &mut Statement) -> CheckResult<bool> {
        match statement {
            Statement::Function { name, pos, .. } => Err(TypeError::NestedFunction { name: name.clone(),
                                                                                   pos:  *pos, }.into()),
            Statement::VarDecl(decl) => {
                self.check_declaration(decl)?;
                Ok(false)
            },
            Statement::Assignment { name, value, pos } => {
                let target = self.lookup(name, *pos)?;
                if !target.mutable {
                    return Err(TypeError::ImmutableAssignment { name: name.clone(),
                                                                pos:  *pos, }.into());
                }
                self.expect_type(value, &target.ty)?;
                Ok(false)
            },
            Statement::Delete { name, pos } => {
                self.delete(name, *pos)?;
                Ok(false)
            },
            Statement::Return { value, pos } => {
                let Some(expected) = self.returns.last().cloned() else {
                    return Err(TypeError::ReturnOutsideFunction { pos: *pos }.into());
                };
                match value {
                    Some(value) => self.expect_type(value, &expected)?,
                    None if expected.accepts(&Type::Unit) => {},
                    None => {
                        return Err(TypeError::Mismatch { expected,
                                                         found: Type::Unit,
                                                         pos: *pos }.into());
                    },
                }
                Ok(true)
            },
            Statement::Expression(expr) => Ok(self.check_expr(expr, None)? == Type::Never),
        }
    }

    /// Checks a declaration and introduces its name.
    ///
    /// The initializer is checked before the name exists, so `# x = x + 1;`
    /// reads an outer `x`.
    fn check_declaration(&mut self, decl: &mut VarDecl) -> CheckResult<()> {
        let ty = match (&decl.ty, &mut decl.init) {
            (None, None) => {
                return Err(TypeError::MissingTypeAndValue { name: decl.name.clone(),
                                                            pos:  decl.pos, }.into());
            },
            (Some(ty), None) => {
                self.resolve_type(ty, decl.pos)?;
                if !ty.has_default() {
                    return Err(TypeError::NoDefault { ty:  ty.clone(),
                                                      pos: decl.pos, }.into());
                }
                ty.clone()
            },
            (Some(ty), Some(init)) => {
                self.resolve_type(ty, decl.pos)?;
                self.expect_type(init, ty)?;
                ty.clone()
            },
            (None, Some(init)) => self.check_expr(init, None)?,
        };
        tracing::debug!(name = %decl.name, ty = %ty, "declared");
        self.declare(&decl.name, ty.clone(), decl.mutable, decl.pos)?;
        decl.resolved = Some(ty);
        Ok(())
    }

    /// Checks a block in a scope of its own.
    ///
    /// The block's type is that of its trailing expression. Without one it is
    /// `Never` if some statement diverges and unit otherwise.
    pub(crate) fn check_block(&mut self, block: &mut Block, expected: Option<&Type>) -> CheckResult<Type> {
        self.push_scope(ScopeKind::Block);
        let result = self.check_block_body(block, expected);
        self.pop_scope();
        result
    }

    fn check_block_body(&mut self, block: &mut Block, expected: Option<&Type>) -> CheckResult<Type> {
        let mut diverges = false;
        for statement in &mut block.statements {
            diverges |= self.check_statement(statement)?;
        }
        match &mut block.tail {
            Some(tail) => self.check_expr(tail, expected),
            None if diverges => Ok(Type::Never),
            None => Ok(Type::Unit),
        }
    }
}
