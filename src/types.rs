use std::{collections::HashMap, fmt};

/// Width of a signed integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IntWidth {
    /// `i8`
    I8,
    /// `i16`
    I16,
    /// `i32`, the width of unsuffixed literals.
    #[default]
    I32,
    /// `i64`
    I64,
}

impl IntWidth {
    /// Number of bits in this width.
    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::I8 => 8,
            Self::I16 => 16,
            Self::I32 => 32,
            Self::I64 => 64,
        }
    }

    /// Smallest representable value.
    #[must_use]
    pub const fn min(self) -> i64 {
        match self {
            Self::I8 => i8::MIN as i64,
            Self::I16 => i16::MIN as i64,
            Self::I32 => i32::MIN as i64,
            Self::I64 => i64::MIN,
        }
    }

    /// Largest representable value.
    #[must_use]
    pub const fn max(self) -> i64 {
        match self {
            Self::I8 => i8::MAX as i64,
            Self::I16 => i16::MAX as i64,
            Self::I32 => i32::MAX as i64,
            Self::I64 => i64::MAX,
        }
    }

    /// Reports whether `value` fits without wrapping.
    #[must_use]
    pub const fn contains(self, value: i64) -> bool {
        value >= self.min() && value <= self.max()
    }

    /// Parses a type name such as `i16`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "i8" => Some(Self::I8),
            "i16" => Some(Self::I16),
            "i32" => Some(Self::I32),
            "i64" => Some(Self::I64),
            _ => None,
        }
    }

    /// The source spelling of this width.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
        }
    }
}

impl fmt::Display for IntWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One parameter slot of a function type.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamType {
    /// Parameter type.
    pub ty:      Type,
    /// `true` when the parameter is declared with `@`.
    pub mutable: bool,
}

/// Why two types could not be unified.
#[derive(Debug, Clone, PartialEq)]
pub enum UnifyError {
    /// A placeholder already bound to `first` met `second`.
    Conflict {
        /// The placeholder.
        param:  String,
        /// Its earlier binding.
        first:  Type,
        /// The type it met.
        second: Type,
    },
    /// The shapes differ.
    Mismatch {
        /// The pattern at the point of failure.
        expected: Type,
        /// The concrete type at the point of failure.
        found:    Type,
    },
}

/// The type of a callable value.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionType {
    /// Generic parameter names. Non-empty only for polymorphic functions.
    pub generics: Vec<String>,
    /// Parameter slots in order.
    pub params:   Vec<ParamType>,
    /// Result type.
    pub ret:      Box<Type>,
}

/// A static type.
///
/// `Never` is internal to the checker: it is the type of `ret` statements and
/// of `quit()`, and it is compatible with every other type. It has no surface
/// syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// Signed integer.
    Int(IntWidth),
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Unicode scalar value.
    Char,
    /// UTF-8 string.
    Str,
    /// The empty value.
    Unit,
    /// Growable vector.
    Vec(Box<Self>),
    /// Fixed-size array with a compile-time length.
    Arr(Box<Self>, usize),
    /// Heap pointer.
    Ptr(Box<Self>),
    /// Reference to a binding.
    Ref(Box<Self>),
    /// Callable.
    Function(FunctionType),
    /// A generic placeholder such as `T`.
    Param(String),
    /// The type of expressions that never produce a value.
    Never,
}

impl Type {
    /// Shorthand for the default integer type.
    pub const I32: Self = Self::Int(IntWidth::I32);

    /// Resolves a primitive type name.
    #[must_use]
    pub fn primitive(name: &str) -> Option<Self> {
        if let Some(width) = IntWidth::from_name(name) {
            return Some(Self::Int(width));
        }
        match name {
            "f64" => Some(Self::Float),
            "bool" => Some(Self::Bool),
            "char" => Some(Self::Char),
            "str" => Some(Self::Str),
            "unit" => Some(Self::Unit),
            _ => None,
        }
    }

    /// Reports whether this is an integer type of any width.
    #[must_use]
    pub const fn is_int(&self) -> bool {
        matches!(self, Self::Int(_))
    }

    /// Reports whether a value of type `actual` may be used where `self` is
    /// expected. Identical types match, and `Never` matches anything.
    #[must_use]
    pub fn accepts(&self, actual: &Self) -> bool {
        matches!(actual, Self::Never) || matches!(self, Self::Never) || self == actual
    }

    /// Reports whether the type mentions any generic placeholder.
    #[must_use]
    pub fn has_params(&self) -> bool {
        match self {
            Self::Param(_) => true,
            Self::Vec(inner) | Self::Arr(inner, _) | Self::Ptr(inner) | Self::Ref(inner) => {
                inner.has_params()
            },
            Self::Function(func) => {
                func.params.iter().any(|p| p.ty.has_params()) || func.ret.has_params()
            },
            _ => false,
        }
    }

    /// Replaces every placeholder bound in `bindings`.
    ///
    /// Substitution is a single pass: replacement types are not substituted
    /// again, so a binding such as `T -> vec<<T>>` cannot loop.
    #[must_use]
    pub fn substitute(&self, bindings: &HashMap<String, Self>) -> Self {
        match self {
            Self::Param(name) => bindings.get(name).cloned().unwrap_or_else(|| self.clone()),
            Self::Vec(inner) => Self::Vec(Box::new(inner.substitute(bindings))),
            Self::Arr(inner, len) => Self::Arr(Box::new(inner.substitute(bindings)), *len),
            Self::Ptr(inner) => Self::Ptr(Box::new(inner.substitute(bindings))),
            Self::Ref(inner) => Self::Ref(Box::new(inner.substitute(bindings))),
            Self::Function(func) => {
                // Generics declared by the function type itself are not free.
                let mut inner_bindings = bindings.clone();
                for name in &func.generics {
                    inner_bindings.remove(name);
                }
                Self::Function(FunctionType { generics: func.generics.clone(),
                                              params:   func.params
                                                            .iter()
                                                            .map(|p| ParamType { ty:      p.ty.substitute(&inner_bindings),
                                                                                 mutable: p.mutable, })
                                                            .collect(),
                                              ret:      Box::new(func.ret.substitute(&inner_bindings)), })
            },
            _ => self.clone(),
        }
    }

    /// Matches `self`, a pattern that may mention the placeholders listed in
    /// `vars`, against a concrete `actual` type, recording bindings.
    ///
    /// Placeholders not listed in `vars` are rigid and only match themselves.
    ///
    /// # Errors
    /// Returns where the two types diverge.
    pub fn unify(&self,
                 actual: &Self,
                 vars: &[String],
                 bindings: &mut HashMap<String, Self>)
                 -> Result<(), UnifyError> {
        if matches!(actual, Self::Never) {
            return Ok(());
        }
        match (self, actual) {
            (Self::Param(name), _) if vars.contains(name) => match bindings.get(name) {
                Some(bound) if bound == actual => Ok(()),
                Some(bound) => Err(UnifyError::Conflict { param:  name.clone(),
                                                          first:  bound.clone(),
                                                          second: actual.clone(), }),
                None => {
                    bindings.insert(name.clone(), actual.clone());
                    Ok(())
                },
            },
            (Self::Vec(p), Self::Vec(a)) | (Self::Ptr(p), Self::Ptr(a)) | (Self::Ref(p), Self::Ref(a)) => {
                p.unify(a, vars, bindings)
            },
            (Self::Arr(p, n), Self::Arr(a, m)) if n == m => p.unify(a, vars, bindings),
            (Self::Function(p), Self::Function(a))
                if p.params.len() == a.params.len()
                   && p.generics.is_empty()
                   && a.generics.is_empty() =>
            {
                for (pp, ap) in p.params.iter().zip(&a.params) {
                    if pp.mutable != ap.mutable {
                        return Err(self.mismatch(actual));
                    }
                    pp.ty.unify(&ap.ty, vars, bindings)?;
                }
                p.ret.unify(&a.ret, vars, bindings)
            },
            _ if self == actual => Ok(()),
            _ => Err(self.mismatch(actual)),
        }
    }

    fn mismatch(&self, actual: &Self) -> UnifyError {
        UnifyError::Mismatch { expected: self.clone(),
                               found:    actual.clone(), }
    }

    /// Reports whether values of this type have a default produced by a
    /// declaration without an initializer.
    #[must_use]
    pub fn has_default(&self) -> bool {
        match self {
            Self::Int(_) | Self::Float | Self::Bool | Self::Char | Self::Str | Self::Unit | Self::Vec(_) => true,
            Self::Arr(inner, _) => inner.has_default(),
            // Resolved per instantiation at run time.
            Self::Param(_) => true,
            Self::Ptr(_) | Self::Ref(_) | Self::Function(_) | Self::Never => false,
        }
    }

    /// Number of values a default of this type holds, counting every array
    /// element. `None` if the count does not fit in `usize`.
    #[must_use]
    pub fn cells(&self) -> Option<usize> {
        match self {
            Self::Arr(inner, len) => inner.cells()?.checked_mul(*len),
            _ => Some(1),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(width) => write!(f, "{width}"),
            Self::Float => f.write_str("f64"),
            Self::Bool => f.write_str("bool"),
            Self::Char => f.write_str("char"),
            Self::Str => f.write_str("str"),
            Self::Unit => f.write_str("unit"),
            Self::Vec(inner) => write!(f, "vec<<{inner}>>"),
            Self::Arr(inner, len) => write!(f, "arr<<{inner}, {len}>>"),
            Self::Ptr(inner) => write!(f, "ptr<<{inner}>>"),
            Self::Ref(inner) => write!(f, "ref<<{inner}>>"),
            Self::Function(func) => {
                f.write_str("fn")?;
                if !func.generics.is_empty() {
                    write!(f, "<<{}>>", func.generics.join(", "))?;
                }
                f.write_str("(")?;
                for (i, param) in func.params.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    if param.mutable {
                        f.write_str("@")?;
                    }
                    write!(f, "{}", param.ty)?;
                }
                write!(f, ") -> {}", func.ret)
            },
            Self::Param(name) => f.write_str(name),
            Self::Never => f.write_str("never"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn display_uses_source_syntax() {
        let ty = Type::Ptr(Box::new(Type::Vec(Box::new(Type::Int(IntWidth::I64)))));
        assert_eq!(ty.to_string(), "ptr<<vec<<i64>>>>");
        assert_eq!(Type::Arr(Box::new(Type::Char), 3).to_string(), "arr<<char, 3>>");

        let func = Type::Function(FunctionType { generics: vec![],
                                                 params:   vec![ParamType { ty:      Type::I32,
                                                                            mutable: true, }],
                                                 ret:      Box::new(Type::Unit), });
        assert_eq!(func.to_string(), "fn(@i32) -> unit");
    }

    #[test]
    fn unify_binds_nested_placeholders() {
        let pattern = Type::Ptr(Box::new(Type::Vec(Box::new(Type::Param("T".into())))));
        let actual = Type::Ptr(Box::new(Type::Vec(Box::new(Type::Str))));
        let mut bindings = HashMap::new();

        pattern.unify(&actual, &vars(&["T"]), &mut bindings).unwrap();

        assert_eq!(bindings.get("T"), Some(&Type::Str));
        assert_eq!(pattern.substitute(&bindings), actual);
    }

    #[test]
    fn unify_rejects_contradictions() {
        let mut bindings = HashMap::new();
        let t = Type::Param("T".into());
        t.unify(&Type::I32, &vars(&["T"]), &mut bindings).unwrap();

        assert_eq!(t.unify(&Type::Bool, &vars(&["T"]), &mut bindings),
                   Err(UnifyError::Conflict { param:  "T".into(),
                                              first:  Type::I32,
                                              second: Type::Bool, }));
    }

    #[test]
    fn rigid_placeholders_only_match_themselves() {
        let mut bindings = HashMap::new();
        let u = Type::Param("U".into());

        assert!(u.unify(&u, &[], &mut bindings).is_ok());
        assert!(u.unify(&Type::I32, &[], &mut bindings).is_err());
    }

    #[test]
    fn array_lengths_must_agree() {
        let mut bindings = HashMap::new();
        let pattern = Type::Arr(Box::new(Type::Param("T".into())), 2);
        let actual = Type::Arr(Box::new(Type::Bool), 3);

        assert!(pattern.unify(&actual, &vars(&["T"]), &mut bindings).is_err());
    }

    #[test]
    fn nested_arrays_multiply_their_cells() {
        let grid = Type::Arr(Box::new(Type::Arr(Box::new(Type::I32), 3)), 4);
        assert_eq!(grid.cells(), Some(12));
        assert_eq!(Type::Str.cells(), Some(1));

        let huge = Type::Arr(Box::new(Type::Arr(Box::new(Type::Bool), usize::MAX)), 2);
        assert_eq!(huge.cells(), None);
    }

    #[test]
    fn width_bounds() {
        assert!(IntWidth::I8.contains(127));
        assert!(!IntWidth::I8.contains(128));
        assert_eq!(IntWidth::I16.min(), -32768);
    }
}
