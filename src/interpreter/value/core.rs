use std::{collections::HashMap, fmt, rc::Rc};

use crate::{
    ast::{Function, Literal, Position},
    error::RuntimeError,
    interpreter::runtime::{
        environment::{CellId, ScopeId},
        heap::Handle,
    },
    types::{IntWidth, Type},
};

/// A function value: the code plus the scope it was created in.
///
/// The scope is held by arena index, so closures that capture each other's
/// scopes never form an ownership cycle.
#[derive(Debug)]
pub struct Closure {
    /// Name for named functions, `None` for lambdas.
    pub name:     Option<String>,
    /// Signature and body.
    pub function: Rc<Function>,
    /// Parent scope for calls: the global scope for named functions, the
    /// defining scope for lambdas.
    pub env:      ScopeId,
    /// Generic arguments in force where the lambda was created. Empty for
    /// named functions.
    pub generics: Rc<HashMap<String, Type>>,
}

/// A read-only reference to a binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// The referenced cell.
    pub cell: CellId,
    /// Name of the binding, for error messages.
    pub name: String,
}

/// Represents a runtime value in the interpreter.
///
/// The variants mirror [`Type`]: every well-typed expression evaluates to the
/// variant matching its static type. Containers own their elements, so
/// assignment and argument passing copy them.
#[derive(Debug, Clone)]
pub enum Value {
    /// A signed integer of a fixed width. `value` always lies within the
    /// width's range.
    Int {
        /// The number.
        value: i64,
        /// Its width.
        width: IntWidth,
    },
    /// A double-precision float.
    Float(f64),
    /// A boolean.
    Bool(bool),
    /// A Unicode scalar value.
    Char(char),
    /// A string.
    Str(String),
    /// A growable vector.
    Vec(Vec<Self>),
    /// A fixed-size array.
    Arr(Vec<Self>),
    /// A handle into the heap.
    Ptr(Handle),
    /// A reference to a binding.
    Ref(Reference),
    /// A named function or lambda.
    Function(Rc<Closure>),
    /// The unit value.
    Unit,
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int { value: a, width: wa }, Self::Int { value: b, width: wb }) => a == b && wa == wb,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Vec(a), Self::Vec(b)) | (Self::Arr(a), Self::Arr(b)) => a == b,
            (Self::Ptr(a), Self::Ptr(b)) => a == b,
            (Self::Ref(a), Self::Ref(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Unit, Self::Unit) => true,
            _ => false,
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int { value: i64::from(v),
                    width: IntWidth::I32, }
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Char(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<&Literal> for Value {
    fn from(lit: &Literal) -> Self {
        match lit {
            Literal::Int { value, width, .. } => Self::Int { value: *value,
                                                             width: *width, },
            Literal::Float(v) => Self::Float(*v),
            Literal::Bool(b) => Self::Bool(*b),
            Literal::Char(c) => Self::Char(*c),
            Literal::Str(s) => Self::Str(s.clone()),
        }
    }
}

/// Upper bound on the number of values one default array may hold.
pub const MAX_DEFAULT_CELLS: usize = 1 << 24;

impl Value {
    /// Builds the value a declaration without initializer starts with.
    ///
    /// Returns `None` for pointers, references, functions and placeholders,
    /// which have no meaningful default. Array sizes are not bounded here;
    /// compare [`Type::cells`] with [`MAX_DEFAULT_CELLS`] first.
    #[must_use]
    pub fn default_for(ty: &Type) -> Option<Self> {
        Some(match ty {
            Type::Int(width) => Self::Int { value: 0,
                                            width: *width, },
            Type::Float => Self::Float(0.0),
            Type::Bool => Self::Bool(false),
            Type::Char => Self::Char('\0'),
            Type::Str => Self::Str(String::new()),
            Type::Unit => Self::Unit,
            Type::Vec(_) => Self::Vec(Vec::new()),
            Type::Arr(inner, len) => {
                let element = Self::default_for(inner)?;
                Self::Arr(vec![element; *len])
            },
            Type::Ptr(_) | Type::Ref(_) | Type::Function(_) | Type::Param(_) | Type::Never => {
                return None;
            },
        })
    }

    /// Short description of the variant, used in runtime error messages.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int { .. } => "integer",
            Self::Float(_) => "f64",
            Self::Bool(_) => "bool",
            Self::Char(_) => "char",
            Self::Str(_) => "str",
            Self::Vec(_) => "vec",
            Self::Arr(_) => "arr",
            Self::Ptr(_) => "ptr",
            Self::Ref(_) => "ref",
            Self::Function(_) => "function",
            Self::Unit => "unit",
        }
    }

    /// Returns the boolean, or an error naming `context` if the value is not
    /// a boolean.
    pub fn as_bool(&self, context: &str, pos: Position) -> Result<bool, RuntimeError> {
        match self {
            Self::Bool(b) => Ok(*b),
            other => Err(RuntimeError::InvalidArgument { name: context.to_string(),
                                                         details: format!("expected bool, found {}",
                                                                          other.kind()),
                                                         pos }),
        }
    }

    /// Returns the integer, or an error naming `context` if the value is not
    /// an integer.
    pub fn as_int(&self, context: &str, pos: Position) -> Result<i64, RuntimeError> {
        match self {
            Self::Int { value, .. } => Ok(*value),
            other => Err(RuntimeError::InvalidArgument { name: context.to_string(),
                                                         details: format!("expected an integer, found {}",
                                                                          other.kind()),
                                                         pos }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { value, .. } => write!(f, "{value}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Char(c) => write!(f, "{c}"),
            Self::Str(s) => f.write_str(s),
            Self::Vec(items) | Self::Arr(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            },
            Self::Ptr(handle) => write!(f, "{handle}"),
            Self::Ref(reference) => write!(f, "<ref {}>", reference.name),
            Self::Function(closure) => match &closure.name {
                Some(name) => write!(f, "<fn {name}>"),
                None => f.write_str("<lambda>"),
            },
            Self::Unit => f.write_str("()"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_formats() {
        assert_eq!(Value::from(15).to_string(), "15");
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Vec(vec![Value::from(1), Value::from(2)]).to_string(), "[1, 2]");
        assert_eq!(Value::Arr(vec![]).to_string(), "[]");
        assert_eq!(Value::from("hi").to_string(), "hi");
        assert_eq!(Value::Unit.to_string(), "()");
    }

    #[test]
    fn defaults_follow_the_type() {
        assert_eq!(Value::default_for(&Type::Int(IntWidth::I8)),
                   Some(Value::Int { value: 0,
                                     width: IntWidth::I8, }));
        assert_eq!(Value::default_for(&Type::Arr(Box::new(Type::Bool), 2)),
                   Some(Value::Arr(vec![Value::Bool(false), Value::Bool(false)])));
        assert_eq!(Value::default_for(&Type::Ptr(Box::new(Type::I32))), None);
    }

    #[test]
    fn integers_of_different_widths_differ() {
        assert_ne!(Value::from(1),
                   Value::Int { value: 1,
                                width: IntWidth::I64, });
    }
}
