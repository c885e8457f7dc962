use std::collections::HashMap;

use crate::{
    ast::{Call, Expr, Position},
    error::{CheckError, NameError, TypeError},
    interpreter::{
        builtins::core::{BuiltinDef, Constraint, lookup as lookup_builtin},
        checker::{
            core::{CheckResult, Checker},
            expression::is_flexible_literal,
        },
    },
    types::{FunctionType, Type, UnifyError},
};

impl Checker {
    /// Checks a call and records its generic instantiation.
    ///
    /// A callee name is resolved against bindings first and against the
    /// builtin table second; builtin names cannot be declared, so the two
    /// never overlap.
    pub(crate) fn check_call(&mut self, call: &mut Call, expected: Option<&Type>) -> CheckResult<Type> {
        let callee_name = match call.callee.as_ref() {
            Expr::Identifier { name, pos } => Some((name.clone(), *pos)),
            _ => None,
        };

        let (name, callee_ty) = match callee_name {
            Some((name, pos)) => match self.lookup(&name, pos) {
                Ok(resolved) => (name, resolved.ty),
                Err(err @ CheckError::Name(NameError::Undefined { .. })) => match lookup_builtin(&name) {
                    Some(def) => return self.check_builtin_call(def, call, expected),
                    None => return Err(err),
                },
                Err(err) => return Err(err),
            },
            None => ("function".to_string(), self.check_expr(&mut call.callee, None)?),
        };

        let func = match callee_ty {
            Type::Function(func) => func,
            Type::Never => return Ok(Type::Never),
            found => return Err(TypeError::NotCallable { found,
                                                         pos: call.pos }.into()),
        };
        if call.args.len() != func.params.len() {
            return Err(TypeError::ArityMismatch { name,
                                                  expected: func.params.len().to_string(),
                                                  found: call.args.len(),
                                                  pos: call.pos }.into());
        }
        tracing::debug!(callee = %name, "checking call");
        self.instantiate(&name, &func, call, expected)
    }

    fn check_builtin_call(&mut self,
                          def: &'static BuiltinDef,
                          call: &mut Call,
                          expected: Option<&Type>)
                          -> CheckResult<Type> {
        let name = def.name;
        if !def.arity.check(call.args.len()) {
            return Err(TypeError::ArityMismatch { name:     name.to_string(),
                                                  expected: def.arity.to_string(),
                                                  found:    call.args.len(),
                                                  pos:      call.pos, }.into());
        }

        if def.constraint == Constraint::Place {
            match call.args.first() {
                Some(Expr::Identifier { name: target, pos }) => {
                    self.lookup(target, *pos)?;
                },
                Some(other) => {
                    return Err(TypeError::NotAPlace { name: name.to_string(),
                                                      pos:  other.pos(), }.into());
                },
                None => {},
            }
        }

        let signature = (def.signature)();
        let ret = self.instantiate(name, &signature, call, expected)?;

        let instantiated = call.instantiation.first();
        let supported = match (def.constraint, instantiated) {
            (Constraint::Array, Some(ty)) => matches!(ty, Type::Arr(..)),
            (Constraint::Container, Some(ty)) => matches!(ty, Type::Str | Type::Vec(_) | Type::Arr(..)),
            _ => true,
        };
        if !supported {
            let found = instantiated.cloned().unwrap_or(Type::Unit);
            return Err(TypeError::UnsupportedArgument { name: name.to_string(),
                                                        found,
                                                        pos: call.pos }.into());
        }
        Ok(ret)
    }

    /// Resolves the generic parameters of `func` for this call, checks every
    /// argument against its parameter and returns the instantiated result
    /// type.
    ///
    /// Sources are tried in order: explicit `<<..>>` arguments, then the
    /// argument types, then the type the context expects for the result.
    /// Unsuffixed integer literals are checked last so that they can adopt a
    /// width fixed by another argument.
    fn instantiate(&mut self,
                   name: &str,
                   func: &FunctionType,
                   call: &mut Call,
                   expected: Option<&Type>)
                   -> CheckResult<Type> {
        let mut bindings = HashMap::new();

        if !call.generics.is_empty() {
            if call.generics.len() != func.generics.len() {
                return Err(TypeError::GenericArityMismatch { name:     name.to_string(),
                                                             expected: func.generics.len(),
                                                             found:    call.generics.len(),
                                                             pos:      call.pos, }.into());
            }
            for (param, ty) in func.generics.iter().zip(&call.generics) {
                self.resolve_type(ty, call.pos)?;
                bindings.insert(param.clone(), ty.clone());
            }
        }

        let (literals, others): (Vec<usize>, Vec<usize>) =
            (0..call.args.len()).partition(|i| is_flexible_literal(&call.args[*i]));

        for i in others.into_iter().chain(literals) {
            let param = &func.params[i];
            let pattern = param.ty.substitute(&bindings);
            let hint = (!mentions_any(&pattern, &func.generics)).then_some(&pattern);
            let arg = &mut call.args[i];
            let actual = self.check_expr(arg, hint)?;

            param.ty
                 .unify(&actual, &func.generics, &mut bindings)
                 .map_err(|err| unify_error(name, err, arg.pos()))?;

            if param.mutable {
                self.check_mutable_argument(arg, i)?;
            }
        }

        if let Some(expected) = expected
           && func.generics.iter().any(|g| !bindings.contains_key(g))
        {
            let mut attempt = bindings.clone();
            if func.ret.unify(expected, &func.generics, &mut attempt).is_ok() {
                bindings = attempt;
            }
        }

        let mut instantiation = Vec::with_capacity(func.generics.len());
        for generic in &func.generics {
            let ty = bindings.get(generic)
                             .cloned()
                             .ok_or_else(|| TypeError::AmbiguousGeneric { name:  name.to_string(),
                                                                          param: generic.clone(),
                                                                          pos:   call.pos, })?;
            instantiation.push(ty);
        }
        if !instantiation.is_empty() {
            tracing::debug!(callee = name, ?instantiation, "instantiated generics");
        }
        call.instantiation = instantiation;

        Ok(func.ret.substitute(&bindings))
    }

    /// An `@` parameter shares the caller's binding, so the argument has to
    /// be a mutable variable.
    fn check_mutable_argument(&self, arg: &Expr, index: usize) -> CheckResult<()> {
        let param = format!("argument {}", index + 1);
        match arg {
            Expr::Identifier { name, pos } if self.lookup(name, *pos)?.mutable => Ok(()),
            other => Err(TypeError::MutableArgument { param,
                                                      pos: other.pos() }.into()),
        }
    }
}

fn mentions_any(ty: &Type, names: &[String]) -> bool {
    match ty {
        Type::Param(name) => names.contains(name),
        Type::Vec(inner) | Type::Arr(inner, _) | Type::Ptr(inner) | Type::Ref(inner) => mentions_any(inner, names),
        Type::Function(func) => {
            func.params.iter().any(|p| mentions_any(&p.ty, names)) || mentions_any(&func.ret, names)
        },
        _ => false,
    }
}

fn unify_error(name: &str, err: UnifyError, pos: Position) -> CheckError {
    match err {
        UnifyError::Conflict { first, second, .. } => TypeError::ConflictingGeneric { name: name.to_string(),
                                                                                      first,
                                                                                      second,
                                                                                      pos }.into(),
        UnifyError::Mismatch { expected, found } => TypeError::Mismatch { expected, found, pos }.into(),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        ast::{Expr, Statement},
        error::{CheckError, TypeError},
        interpreter::checker::core::Checker,
        parse_source,
        types::{IntWidth, Type},
    };

    fn check(source: &str) -> Result<crate::ast::Program, CheckError> {
        let mut program = parse_source(source).unwrap();
        Checker::new().check_program(&mut program)?;
        Ok(program)
    }

    fn check_main(body: &str) -> Result<crate::ast::Program, CheckError> {
        check(&format!("fn main(args: vec<<str>>) {{ {body} }}"))
    }

    #[test]
    fn generics_are_inferred_from_arguments() {
        let program = check("fn id<<T>>(x: T) -> T { x }
                             fn main(args: vec<<str>>) { # s: str = id(\"a\"); }").unwrap();
        let Statement::Function { function, .. } = &program.statements[1] else {
            panic!("expected main");
        };
        let Statement::VarDecl(decl) = &function.body.statements[0] else {
            panic!("expected declaration");
        };
        let Some(Expr::Call(call)) = &decl.init else {
            panic!("expected call");
        };
        assert_eq!(call.instantiation, vec![Type::Str]);
    }

    #[test]
    fn generics_fall_back_to_the_expected_type() {
        assert!(check_main("# v: vec<<i64>> = vec::new();").is_ok());
        assert!(matches!(check_main("# v = vec::new();"),
                         Err(CheckError::Type(TypeError::AmbiguousGeneric { .. }))));
    }

    #[test]
    fn explicit_generics_win() {
        assert!(check_main("# v = vec::new<<str>>(); $$ len(v);").is_ok());
        assert!(matches!(check_main("# v = vec::new<<str, i32>>();"),
                         Err(CheckError::Type(TypeError::GenericArityMismatch { .. }))));
    }

    #[test]
    fn contradictory_generics_are_rejected() {
        let source = "fn same<<T>>(a: T, b: T) -> T { a }
                      fn main(args: vec<<str>>) { same(1, true); }";
        assert!(matches!(check(source), Err(CheckError::Type(TypeError::ConflictingGeneric { .. }))));
    }

    #[test]
    fn literal_arguments_follow_other_arguments() {
        let source = "fn same<<T>>(a: T, b: T) -> T { a }
                      fn main(args: vec<<str>>) { # big: i64 = 5; # r: i64 = same(1, big); }";
        assert!(check(source).is_ok());
    }

    #[test]
    fn arity_is_checked() {
        let source = "fn add(a: i32, b: i32) -> i32 { a + b }
                      fn main(args: vec<<str>>) { add(1); }";
        assert!(matches!(check(source), Err(CheckError::Type(TypeError::ArityMismatch { .. }))));
        assert!(matches!(check_main("quit(1, 2);"),
                         Err(CheckError::Type(TypeError::ArityMismatch { .. }))));
    }

    #[test]
    fn mutable_parameters_need_mutable_variables() {
        let source = "fn bump(@n: i32) { n = n + 1; }
                      fn main(args: vec<<str>>) { #@ a = 1; bump(a); # b = 1; bump(b); }";
        assert!(matches!(check(source), Err(CheckError::Type(TypeError::MutableArgument { .. }))));

        let source = "fn bump(@n: i32) { n = n + 1; }
                      fn main(args: vec<<str>>) { bump(3); }";
        assert!(matches!(check(source), Err(CheckError::Type(TypeError::MutableArgument { .. }))));
    }

    #[test]
    fn len_accepts_only_containers() {
        assert!(check_main("$$ len(\"abc\"); $$ len([1, 2]);").is_ok());
        assert!(matches!(check_main("$$ len(5);"),
                         Err(CheckError::Type(TypeError::UnsupportedArgument { .. }))));
    }

    #[test]
    fn arr_new_needs_an_array_type() {
        assert!(check_main("# a: arr<<i32, 3>> = arr::new();").is_ok());
        assert!(check_main("# a = arr::new<<arr<<bool, 2>>>>();").is_ok());
        assert!(matches!(check_main("# a: i32 = arr::new();"),
                         Err(CheckError::Type(TypeError::UnsupportedArgument { .. }))));
    }

    #[test]
    fn ref_new_needs_a_variable() {
        assert!(check_main("# x = 1; # r = ref::new(x); $$ ref::deref(r);").is_ok());
        assert!(matches!(check_main("# r = ref::new(1);"),
                         Err(CheckError::Type(TypeError::NotAPlace { .. }))));
    }

    #[test]
    fn quit_diverges() {
        let source = "fn f() -> i32 { quit(3); }
                      fn main(args: vec<<str>>) { }";
        assert!(check(source).is_ok());
    }

    #[test]
    fn vec_push_binds_through_the_pointer() {
        assert!(check_main("# p = ptr::new(vec::new<<i64>>()); vec::push(p, 7);").is_ok());
        assert!(matches!(check_main("# p = ptr::new(vec::new<<i64>>()); vec::push(p, true);"),
                         Err(CheckError::Type(TypeError::ConflictingGeneric { .. }))));
    }

    #[test]
    fn calling_a_non_function_is_rejected() {
        assert!(matches!(check_main("# x = 1; x();"),
                         Err(CheckError::Type(TypeError::NotCallable { .. }))));
    }

    #[test]
    fn type_of_uses_the_static_type() {
        let program = check_main("# n: i8 = 1; $$ type(n);").unwrap();
        let Statement::Function { function, .. } = &program.statements[0] else {
            panic!("expected main");
        };
        let Statement::Expression(Expr::Print { expr, .. }) = &function.body.statements[1] else {
            panic!("expected print");
        };
        let Expr::Call(call) = expr.as_ref() else {
            panic!("expected call");
        };
        assert_eq!(call.instantiation, vec![Type::Int(IntWidth::I8)]);
    }
}
