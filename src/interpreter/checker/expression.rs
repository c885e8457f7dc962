use std::rc::Rc;

use crate::{
    ast::{Expr, IfChain, Literal, UnaryOperator},
    error::{CheckError, NameError, TypeError},
    interpreter::{
        builtins::core::is_builtin,
        checker::{
            core::{CheckResult, Checker},
            scope::ScopeKind,
        },
    },
    types::Type,
};

/// Reports whether `expr` is an integer literal without a width suffix,
/// possibly negated. Such literals take their width from context.
pub(crate) fn is_flexible_literal(expr: &Expr) -> bool {
    match expr {
        Expr::Literal { value: Literal::Int { suffixed, .. }, .. } => !suffixed,
        Expr::Unary { op: UnaryOperator::Negate,
                      expr, .. } => is_flexible_literal(expr),
        _ => false,
    }
}

impl Checker {
    /// Checks `expr` and requires its type to be accepted by `expected`.
    pub(crate) fn expect_type(&mut self, expr: &mut Expr, expected: &Type) -> CheckResult<()> {
        let found = self.check_expr(expr, Some(expected))?;
        if expected.accepts(&found) {
            Ok(())
        } else {
            Err(TypeError::Mismatch { expected: expected.clone(),
                                      found,
                                      pos: expr.pos() }.into())
        }
    }

    /// Computes the type of an expression.
    ///
    /// `expected` is a hint from the context. Unsuffixed integer literals
    /// adopt an expected integer width, and blocks and branches pass the
    /// hint on to their values. The hint is never enforced here; callers
    /// that need a specific type use [`Checker::expect_type`].
    pub(crate) fn check_expr(&mut self, expr: &mut Expr, expected: Option<&Type>) -> CheckResult<Type> {
        if let Some(folded) = fold_negative_literal(expr) {
            *expr = folded;
        }

        match expr {
            Expr::Literal { value, pos } => match value {
                Literal::Int { value,
                               width,
                               suffixed, } => {
                    if !*suffixed && let Some(Type::Int(wanted)) = expected {
                        *width = *wanted;
                    }
                    if !width.contains(*value) {
                        return Err(TypeError::LiteralOutOfRange { value: *value,
                                                                  ty:    Type::Int(*width),
                                                                  pos:   *pos, }.into());
                    }
                    Ok(Type::Int(*width))
                },
                Literal::Float(_) => Ok(Type::Float),
                Literal::Bool(_) => Ok(Type::Bool),
                Literal::Char(_) => Ok(Type::Char),
                Literal::Str(_) => Ok(Type::Str),
            },
            Expr::Identifier { name, pos } => match self.lookup(name, *pos) {
                Ok(resolved) => Ok(resolved.ty),
                Err(CheckError::Name(NameError::Undefined { .. })) if is_builtin(name) => {
                    Err(TypeError::BuiltinAsValue { name: name.clone(),
                                                    pos:  *pos, }.into())
                },
                Err(err) => Err(err),
            },
            Expr::Binary { op, left, right, pos } => self.check_binary(*op, left, right, *pos, expected),
            Expr::Unary { op, expr, pos } => self.check_unary(*op, expr, *pos, expected),
            Expr::Call(call) => self.check_call(call, expected),
            Expr::Index { target, index, pos } => {
                let target_ty = self.check_expr(target, None)?;
                let index_ty = self.check_expr(index, None)?;
                if !index_ty.is_int() && index_ty != Type::Never {
                    return Err(TypeError::Mismatch { expected: Type::I32,
                                                     found:    index_ty,
                                                     pos:      index.pos(), }.into());
                }
                match target_ty {
                    Type::Str => Ok(Type::Char),
                    Type::Vec(inner) | Type::Arr(inner, _) => Ok(*inner),
                    found => Err(TypeError::NotIndexable { found, pos: *pos }.into()),
                }
            },
            Expr::Array { elements, pos } => {
                // An annotated array fixes the element type, including for `[]`.
                let mut element_ty = match expected {
                    Some(Type::Arr(inner, _)) => Some(inner.as_ref().clone()),
                    _ => None,
                };
                for element in elements.iter_mut() {
                    let found = self.check_expr(element, element_ty.as_ref())?;
                    match &element_ty {
                        Some(ty) if !ty.accepts(&found) => {
                            return Err(TypeError::Mismatch { expected: ty.clone(),
                                                             found,
                                                             pos: element.pos() }.into());
                        },
                        Some(Type::Never) | None => element_ty = Some(found),
                        Some(_) => {},
                    }
                }
                match element_ty {
                    Some(ty) => Ok(Type::Arr(Box::new(ty), elements.len())),
                    None => Err(TypeError::AmbiguousGeneric { name:  "[]".to_string(),
                                                              param: "element type".to_string(),
                                                              pos:   *pos, }.into()),
                }
            },
            Expr::Block(block) => self.check_block(block, expected),
            Expr::IfChain(chain) => self.check_if_chain(chain, expected),
            Expr::While { condition, body, .. } => {
                self.expect_type(condition, &Type::Bool)?;
                self.check_block(body, None)?;
                Ok(Type::Unit)
            },
            Expr::For { var,
                        start,
                        end,
                        body,
                        pos, } => {
                let (first, second) = if is_flexible_literal(start) {
                    (&mut **end, &mut **start)
                } else {
                    (&mut **start, &mut **end)
                };
                let bound = self.check_expr(first, None)?;
                if !bound.is_int() {
                    return Err(TypeError::Mismatch { expected: Type::I32,
                                                     found:    bound,
                                                     pos:      first.pos(), }.into());
                }
                self.expect_type(second, &bound)?;

                self.push_scope(ScopeKind::Block);
                let result = self.declare(var, bound, false, *pos)
                                 .and_then(|()| self.check_block(body, None));
                self.pop_scope();
                result?;
                Ok(Type::Unit)
            },
            Expr::Lambda { function, .. } => {
                let ty = self.check_function(Rc::make_mut(function), ScopeKind::Lambda)?;
                Ok(Type::Function(ty))
            },
            Expr::Print { expr, .. } => self.check_expr(expr, expected),
        }
    }

    /// Checks a conditional chain.
    ///
    /// Without a `~` branch the chain is unit. With one, every branch must
    /// agree on a type, and branches that diverge agree with anything.
    fn check_if_chain(&mut self, chain: &mut IfChain, expected: Option<&Type>) -> CheckResult<Type> {
        let Some(otherwise) = &mut chain.otherwise else {
            for (condition, body) in &mut chain.branches {
                self.expect_type(condition, &Type::Bool)?;
                self.check_block(body, None)?;
            }
            return Ok(Type::Unit);
        };

        let mut result: Option<Type> = expected.cloned();
        let mut joined = Type::Never;
        let mut bodies: Vec<_> = Vec::with_capacity(chain.branches.len() + 1);
        for (condition, body) in &mut chain.branches {
            self.expect_type(condition, &Type::Bool)?;
            bodies.push(body);
        }
        bodies.push(otherwise);

        for body in bodies {
            let found = self.check_block(body, result.as_ref())?;
            if joined == Type::Never {
                joined = found.clone();
            } else if !joined.accepts(&found) {
                let pos = body.tail.as_ref().map_or(body.pos, |tail| tail.pos());
                return Err(TypeError::Mismatch { expected: joined,
                                                 found,
                                                 pos }.into());
            }
            if found != Type::Never {
                result = Some(found);
            }
        }
        Ok(joined)
    }
}

/// Rewrites `-N` for an unsuffixed literal `N` into the literal `-N`, so
/// that the negative value is range-checked against the final width.
fn fold_negative_literal(expr: &Expr) -> Option<Expr> {
    let Expr::Unary { op: UnaryOperator::Negate,
                      expr: inner,
                      pos, } = expr
    else {
        return None;
    };
    match inner.as_ref() {
        Expr::Literal { value: Literal::Int { value,
                                              width,
                                              suffixed: false, },
                        .. } => Some(Expr::Literal { value: Literal::Int { value:    value.checked_neg()?,
                                                                           width:    *width,
                                                                           suffixed: false, },
                                                     pos:   *pos, }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{CheckError, TypeError},
        interpreter::checker::core::Checker,
        parse_source,
    };

    fn check_main(body: &str) -> Result<(), CheckError> {
        let mut program = parse_source(&format!("fn main(args: vec<<str>>) {{ {body} }}")).unwrap();
        Checker::new().check_program(&mut program)
    }

    #[test]
    fn unsuffixed_literals_adopt_the_expected_width() {
        assert!(check_main("# a: i8 = -128; # b: i64 = 3000000000;").is_ok());
        assert!(matches!(check_main("# a: i8 = 128;"),
                         Err(CheckError::Type(TypeError::LiteralOutOfRange { .. }))));
        assert!(matches!(check_main("# a = 3000000000;"),
                         Err(CheckError::Type(TypeError::LiteralOutOfRange { .. }))));
    }

    #[test]
    fn suffixed_literals_keep_their_width() {
        assert!(matches!(check_main("# a: i64 = 1i32;"),
                         Err(CheckError::Type(TypeError::Mismatch { .. }))));
    }

    #[test]
    fn indexing_yields_the_element_type() {
        assert!(check_main("# a = [1, 2, 3]; # x: i32 = a[0]; # c: char = \"hi\"[1];").is_ok());
        assert!(matches!(check_main("# x = 5; $$ x[0];"),
                         Err(CheckError::Type(TypeError::NotIndexable { .. }))));
    }

    #[test]
    fn array_elements_must_agree() {
        assert!(matches!(check_main("# a = [1, true];"),
                         Err(CheckError::Type(TypeError::Mismatch { .. }))));
        assert!(check_main("# a: arr<<i64, 2>> = [1, 2];").is_ok());
    }

    #[test]
    fn if_chain_branches_must_agree_when_complete() {
        assert!(check_main("# x: i32 = ? true { 1 } ~ { 2 };").is_ok());
        assert!(matches!(check_main("# x = ? true { 1 } ~ { false };"),
                         Err(CheckError::Type(TypeError::Mismatch { .. }))));
        assert!(check_main("? true { 1 } ~? false { true }").is_ok());
    }

    #[test]
    fn conditions_must_be_boolean() {
        assert!(matches!(check_main("? 1 { }"),
                         Err(CheckError::Type(TypeError::Mismatch { .. }))));
        assert!(matches!(check_main("$? \"yes\" { }"),
                         Err(CheckError::Type(TypeError::Mismatch { .. }))));
    }

    #[test]
    fn for_bounds_share_a_width() {
        assert!(check_main("# n: i64 = 3; for i in 0..n { # j: i64 = i; }").is_ok());
        assert!(matches!(check_main("for i in 0..true { }"),
                         Err(CheckError::Type(TypeError::Mismatch { .. }))));
    }

    #[test]
    fn builtins_cannot_be_used_as_values() {
        assert!(matches!(check_main("# f = len;"),
                         Err(CheckError::Type(TypeError::BuiltinAsValue { .. }))));
    }

    #[test]
    fn lambdas_capture_enclosing_bindings() {
        assert!(check_main("# k = 2; # f = lam(x: i32) -> i32 { x * k }; $$ f(3);").is_ok());
        assert!(matches!(check_main("# k = 2; # f = lam() { k = 3; };"),
                         Err(CheckError::Type(TypeError::ImmutableAssignment { .. }))));
        assert!(check_main("#@ k = 2; # f = lam() { k = 3; };").is_ok());
    }
}
