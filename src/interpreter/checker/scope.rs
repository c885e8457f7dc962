use crate::{
    ast::Position,
    error::{NameError, TypeError},
    interpreter::{
        builtins::core::is_builtin,
        checker::core::{CheckResult, Checker},
    },
    types::Type,
};

/// What opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The program's top level.
    Global,
    /// A block, loop iteration or branch.
    Block,
    /// Parameters of a named function. Lookups that get past it continue in
    /// the global scope.
    Function,
    /// Parameters of a lambda. Lookups continue in the enclosing scopes.
    Lambda,
}

/// A name as the checker sees it.
#[derive(Debug, Clone)]
pub struct TypeBinding {
    /// Declared name.
    pub name:    String,
    /// Static type.
    pub ty:      Type,
    /// Declared with `#@` or `@`.
    pub mutable: bool,
    /// Removed by `del`.
    pub deleted: bool,
}

/// One level of the checker's scope stack.
#[derive(Debug, Clone)]
pub struct TypeScope {
    /// What opened the scope.
    pub kind:     ScopeKind,
    /// Bindings in declaration order.
    pub bindings: Vec<TypeBinding>,
    /// Bindings of enclosing scopes deleted from inside this one, as
    /// `(scope, binding)` indices. Their deletion is only certain until this
    /// scope closes.
    nested_deletions: Vec<(usize, usize)>,
}

impl TypeScope {
    /// Creates an empty scope.
    #[must_use]
    pub const fn new(kind: ScopeKind) -> Self {
        Self { kind,
               bindings: Vec::new(),
               nested_deletions: Vec::new() }
    }
}

/// The result of a successful lookup.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Static type.
    pub ty:       Type,
    /// Whether the binding may be written.
    pub mutable:  bool,
    /// `true` when the binding belongs to an enclosing function or lambda.
    pub captured: bool,
}

struct Location {
    scope:    usize,
    binding:  usize,
    captured: bool,
}

impl Checker {
    /// Opens a scope.
    pub(crate) fn push_scope(&mut self, kind: ScopeKind) {
        self.scopes.push(TypeScope::new(kind));
    }

    /// Closes the innermost scope.
    ///
    /// Deletions it made in enclosing scopes are forgotten: whether they
    /// happened depends on control flow, so later uses are left to the
    /// evaluator.
    pub(crate) fn pop_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };
        for (s, b) in scope.nested_deletions {
            if let Some(binding) = self.scopes.get_mut(s).and_then(|scope| scope.bindings.get_mut(b)) {
                binding.deleted = false;
            }
        }
    }

    /// Declares a name in the innermost scope.
    ///
    /// A name may be declared again in the same scope only after it was
    /// deleted there.
    pub(crate) fn declare(&mut self, name: &str, ty: Type, mutable: bool, pos: Position) -> CheckResult<()> {
        if is_builtin(name) {
            return Err(NameError::BuiltinRedefinition { name: name.to_string(),
                                                        pos }.into());
        }
        let Some(scope) = self.scopes.last_mut() else {
            return Ok(());
        };
        if scope.bindings.iter().any(|b| b.name == name && !b.deleted) {
            return Err(NameError::AlreadyDeclared { name: name.to_string(),
                                                    pos }.into());
        }
        scope.bindings.push(TypeBinding { name: name.to_string(),
                                          ty,
                                          mutable,
                                          deleted: false });
        Ok(())
    }

    /// Resolves a name.
    ///
    /// The nearest binding decides, so a deleted binding hides any outer one
    /// of the same name.
    pub(crate) fn lookup(&self, name: &str, pos: Position) -> CheckResult<Resolved> {
        let location = self.locate(name)
                           .ok_or_else(|| NameError::Undefined { name: name.to_string(),
                                                                 pos })?;
        let binding = &self.scopes[location.scope].bindings[location.binding];
        if binding.deleted {
            return Err(NameError::Deleted { name: name.to_string(),
                                            pos }.into());
        }
        Ok(Resolved { ty:       binding.ty.clone(),
                      mutable:  binding.mutable,
                      captured: location.captured, })
    }

    /// Type of a global binding, if there is one.
    pub(crate) fn lookup_global(&self, name: &str) -> Option<Type> {
        self.scopes
            .first()?
            .bindings
            .iter()
            .rev()
            .find(|b| b.name == name)
            .map(|b| b.ty.clone())
    }

    /// Marks the nearest binding of `name` as deleted.
    pub(crate) fn delete(&mut self, name: &str, pos: Position) -> CheckResult<()> {
        let location = self.locate(name)
                           .ok_or_else(|| NameError::Undefined { name: name.to_string(),
                                                                 pos })?;
        if location.captured {
            return Err(NameError::DeleteCaptured { name: name.to_string(),
                                                   pos }.into());
        }
        let innermost = self.scopes.len() - 1;
        let binding = &mut self.scopes[location.scope].bindings[location.binding];
        if binding.deleted {
            return Err(NameError::Deleted { name: name.to_string(),
                                            pos }.into());
        }
        binding.deleted = true;
        if location.scope != innermost {
            self.scopes[innermost].nested_deletions
                                  .push((location.scope, location.binding));
        }
        Ok(())
    }

    /// Validates that every placeholder in `ty` names a generic parameter in
    /// scope.
    pub(crate) fn resolve_type(&self, ty: &Type, pos: Position) -> CheckResult<()> {
        match ty {
            Type::Param(name) => {
                if self.generics.iter().any(|g| g.contains(name)) {
                    Ok(())
                } else {
                    Err(TypeError::UnknownType { name: name.clone(),
                                                 pos }.into())
                }
            },
            Type::Vec(inner) | Type::Arr(inner, _) | Type::Ptr(inner) | Type::Ref(inner) => {
                self.resolve_type(inner, pos)
            },
            Type::Function(func) => {
                for param in &func.params {
                    self.resolve_type(&param.ty, pos)?;
                }
                self.resolve_type(&func.ret, pos)
            },
            _ => Ok(()),
        }
    }

    /// Walks outwards from the innermost scope. Leaving a named function's
    /// parameter scope jumps to the global scope.
    fn locate(&self, name: &str) -> Option<Location> {
        let mut captured = false;
        let mut index = self.scopes.len();
        while index > 0 {
            index -= 1;
            let scope = &self.scopes[index];
            if let Some(binding) = scope.bindings.iter().rposition(|b| b.name == name) {
                return Some(Location { scope: index,
                                       binding,
                                       captured });
            }
            match scope.kind {
                ScopeKind::Function => {
                    captured = true;
                    index = index.min(1);
                },
                ScopeKind::Lambda => captured = true,
                ScopeKind::Global | ScopeKind::Block => {},
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CheckError;

    #[test]
    fn function_scopes_skip_to_globals() {
        let mut checker = Checker::new();
        checker.declare("g", Type::Bool, false, Position::default()).unwrap();
        checker.push_scope(ScopeKind::Block);
        checker.declare("local", Type::Bool, false, Position::default()).unwrap();
        checker.push_scope(ScopeKind::Function);

        assert!(checker.lookup("g", Position::default()).unwrap().captured);
        assert!(matches!(checker.lookup("local", Position::default()),
                         Err(CheckError::Name(NameError::Undefined { .. }))));
    }

    #[test]
    fn lambda_scopes_see_enclosing_bindings() {
        let mut checker = Checker::new();
        checker.push_scope(ScopeKind::Block);
        checker.declare("local", Type::Bool, true, Position::default()).unwrap();
        checker.push_scope(ScopeKind::Lambda);

        let resolved = checker.lookup("local", Position::default()).unwrap();
        assert!(resolved.captured);
        assert!(resolved.mutable);
        assert!(matches!(checker.delete("local", Position::default()),
                         Err(CheckError::Name(NameError::DeleteCaptured { .. }))));
    }

    #[test]
    fn nested_deletions_are_forgotten_on_exit() {
        let mut checker = Checker::new();
        checker.push_scope(ScopeKind::Block);
        checker.declare("x", Type::I32, false, Position::default()).unwrap();
        checker.push_scope(ScopeKind::Block);
        checker.delete("x", Position::default()).unwrap();
        assert!(checker.lookup("x", Position::default()).is_err());

        checker.pop_scope();
        assert!(checker.lookup("x", Position::default()).is_ok());
    }

    #[test]
    fn redeclaration_needs_a_delete_first() {
        let mut checker = Checker::new();
        checker.declare("x", Type::I32, false, Position::default()).unwrap();
        assert!(matches!(checker.declare("x", Type::I32, false, Position::default()),
                         Err(CheckError::Name(NameError::AlreadyDeclared { .. }))));
        checker.delete("x", Position::default()).unwrap();
        assert!(checker.declare("x", Type::Bool, false, Position::default()).is_ok());
    }

    #[test]
    fn builtin_names_are_reserved() {
        let mut checker = Checker::new();
        assert!(matches!(checker.declare("len", Type::I32, false, Position::default()),
                         Err(CheckError::Name(NameError::BuiltinRedefinition { .. }))));
    }

    #[test]
    fn unknown_type_names_are_rejected() {
        let mut checker = Checker::new();
        assert!(checker.resolve_type(&Type::Param("T".into()), Position::default()).is_err());
        checker.generics.push(vec!["T".into()]);
        assert!(checker.resolve_type(&Type::Vec(Box::new(Type::Param("T".into()))), Position::default())
                       .is_ok());
    }
}
