use std::fmt;

use crate::{
    ast::Position,
    error::RuntimeError,
    interpreter::{
        builtins::{collections, constructors, io, pointer, window},
        evaluator::core::{Context, EvalResult},
        value::core::Value,
    },
    types::{FunctionType, ParamType, Type},
};

/// A native function call after its arguments have been evaluated.
#[derive(Debug, Clone)]
pub struct BuiltinCall {
    /// The builtin's name, e.g. `vec::push`.
    pub name:  &'static str,
    /// Evaluated arguments.
    pub args:  Vec<Value>,
    /// Concrete generic arguments, one per generic parameter of the
    /// signature.
    pub types: Vec<Type>,
    /// Position of the call.
    pub pos:   Position,
}

impl BuiltinCall {
    /// Builds the error a builtin reports for arguments of the wrong shape.
    #[must_use]
    pub fn invalid(&self, details: impl Into<String>) -> RuntimeError {
        RuntimeError::InvalidArgument { name:    self.name.to_string(),
                                        details: details.into(),
                                        pos:     self.pos, }
    }

    /// The `n`th argument.
    pub fn arg(&self, n: usize) -> Result<&Value, RuntimeError> {
        self.args
            .get(n)
            .ok_or_else(|| self.invalid(format!("missing argument {}", n + 1)))
    }

    /// The `n`th generic argument.
    pub fn type_arg(&self, n: usize) -> Result<&Type, RuntimeError> {
        self.types
            .get(n)
            .ok_or_else(|| self.invalid("generic argument was not resolved"))
    }

    /// Reads the `n`th argument as an index: an integer of any width that is
    /// non-negative and below `len`.
    pub fn index(&self, n: usize, len: usize) -> Result<usize, RuntimeError> {
        let index = self.arg(n)?.as_int(self.name, self.pos)?;
        usize::try_from(index).ok()
                              .filter(|i| *i < len)
                              .ok_or(RuntimeError::IndexOutOfBounds { index,
                                                                      len,
                                                                      pos: self.pos })
    }
}

/// Type alias for builtin function handlers.
///
/// A builtin receives the interpreter context and the evaluated call. It
/// returns the resulting value, or unwinds with an error or `quit`.
pub type BuiltinFn = fn(&mut Context, BuiltinCall) -> EvalResult<Value>;

/// Specifies the allowed number of arguments for a builtin.
///
/// - `Exact(n)` means the builtin must receive exactly `n` arguments.
/// - `OneOf(slice)` means the builtin accepts any arity listed in `slice`.
#[derive(Debug, Clone, Copy)]
pub enum Arity {
    /// Exactly this many arguments.
    Exact(usize),
    /// Any of these counts.
    OneOf(&'static [usize]),
}

impl Arity {
    /// Tests whether the given argument count satisfies this arity constraint.
    #[must_use]
    pub fn check(&self, n: usize) -> bool {
        match self {
            Self::Exact(m) => n == *m,
            Self::OneOf(arr) => arr.contains(&n),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(n) => write!(f, "{n}"),
            Self::OneOf(counts) => {
                let counts: Vec<_> = counts.iter().map(ToString::to_string).collect();
                f.write_str(&counts.join(" or "))
            },
        }
    }
}

/// Checks a builtin needs beyond its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// The signature says it all.
    None,
    /// The single generic argument must be an `arr<<T, N>>` type.
    Array,
    /// The first argument must be a variable name; the builtin receives a
    /// reference to its cell instead of a copy of its value.
    Place,
    /// The single generic argument must be `str`, a vector or an array.
    Container,
}

/// One row of the dispatch table.
pub struct BuiltinDef {
    /// Name as written in source.
    pub name:       &'static str,
    /// Static signature. Generic parameters are named in `generics`.
    pub signature:  fn() -> FunctionType,
    /// Accepted argument counts.
    pub arity:      Arity,
    /// Extra static check.
    pub constraint: Constraint,
    /// The native implementation.
    pub func:       BuiltinFn,
}

/// Defines builtin functions by generating a lookup table and a name list.
///
/// Each entry provides:
/// - a string name,
/// - a signature constructor,
/// - the accepted argument counts,
/// - a constraint for the checker,
/// - a function pointer implementing the builtin.
///
/// The macro produces:
/// - `BUILTIN_TABLE` (static table for lookup),
/// - `BUILTIN_FUNCTIONS` (public list of builtin names).
macro_rules! builtin_functions {
    (
        $(
            $name:literal => {
                signature: $signature:expr,
                arity: $arity:expr,
                constraint: $constraint:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        static BUILTIN_TABLE: &[BuiltinDef] = &[
            $(
                BuiltinDef { name: $name,
                             signature: $signature,
                             arity: $arity,
                             constraint: $constraint,
                             func: $func },
            )*
        ];
        /// Every builtin name, in table order.
        pub const BUILTIN_FUNCTIONS: &[&str] = &[
            $($name,)*
        ];
    };
}

builtin_functions! {
    "i8::new"        => { signature: || sig(&[], vec![], Type::Int(crate::types::IntWidth::I8)),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "i16::new"       => { signature: || sig(&[], vec![], Type::Int(crate::types::IntWidth::I16)),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "i32::new"       => { signature: || sig(&[], vec![], Type::I32),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "i64::new"       => { signature: || sig(&[], vec![], Type::Int(crate::types::IntWidth::I64)),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "f64::new"       => { signature: || sig(&[], vec![], Type::Float),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "bool::new"      => { signature: || sig(&[], vec![], Type::Bool),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "char::new"      => { signature: || sig(&[], vec![], Type::Char),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "str::new"       => { signature: || sig(&[], vec![], Type::Str),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::primitive },
    "vec::new"       => { signature: || sig(&["T"], vec![], vec_of(param("T"))),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: constructors::vector },
    "arr::new"       => { signature: || sig(&["A"], vec![], param("A")),
                          arity: Arity::Exact(0), constraint: Constraint::Array, func: constructors::array },
    "vec::push"      => { signature: || sig(&["T"],
                                            vec![Type::Ptr(Box::new(vec_of(param("T")))), param("T")],
                                            Type::Unit),
                          arity: Arity::Exact(2), constraint: Constraint::None, func: collections::push },
    "vec::nth"       => { signature: || sig(&["T"], vec![vec_of(param("T")), Type::I32], param("T")),
                          arity: Arity::Exact(2), constraint: Constraint::None, func: collections::vec_nth },
    "str::nth"       => { signature: || sig(&[], vec![Type::Str, Type::I32], Type::Char),
                          arity: Arity::Exact(2), constraint: Constraint::None, func: collections::str_nth },
    "len"            => { signature: || sig(&["C"], vec![param("C")], Type::I32),
                          arity: Arity::Exact(1), constraint: Constraint::Container, func: collections::len },
    "ptr::new"       => { signature: || sig(&["T"], vec![param("T")], Type::Ptr(Box::new(param("T")))),
                          arity: Arity::Exact(1), constraint: Constraint::None, func: pointer::alloc },
    "ptr::deref"     => { signature: || sig(&["T"], vec![Type::Ptr(Box::new(param("T")))], param("T")),
                          arity: Arity::Exact(1), constraint: Constraint::None, func: pointer::deref },
    "ptr::free"      => { signature: || sig(&["T"], vec![Type::Ptr(Box::new(param("T")))], Type::Unit),
                          arity: Arity::Exact(1), constraint: Constraint::None, func: pointer::free },
    "ref::new"       => { signature: || sig(&["T"], vec![param("T")], Type::Ref(Box::new(param("T")))),
                          arity: Arity::Exact(1), constraint: Constraint::Place, func: pointer::reference },
    "ref::deref"     => { signature: || sig(&["T"], vec![Type::Ref(Box::new(param("T")))], param("T")),
                          arity: Arity::Exact(1), constraint: Constraint::None, func: pointer::read_reference },
    "type"           => { signature: || sig(&["T"], vec![param("T")], Type::Str),
                          arity: Arity::Exact(1), constraint: Constraint::None, func: io::type_name },
    "in"             => { signature: || sig(&[], vec![], Type::Str),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: io::read_line },
    "quit"           => { signature: || sig(&[], vec![Type::I32], Type::Never),
                          arity: Arity::OneOf(&[0, 1]), constraint: Constraint::None, func: io::quit },
    "init_window"    => { signature: || sig(&[], vec![Type::Str], Type::Unit),
                          arity: Arity::Exact(1), constraint: Constraint::None, func: window::init_window },
    "draw_window"    => { signature: || sig(&[], vec![], Type::Unit),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: window::draw_window },
    "is_window_open" => { signature: || sig(&[], vec![], Type::Bool),
                          arity: Arity::Exact(0), constraint: Constraint::None, func: window::is_window_open },
}

/// Finds a builtin by name.
#[must_use]
pub fn lookup(name: &str) -> Option<&'static BuiltinDef> {
    BUILTIN_TABLE.iter().find(|def| def.name == name)
}

/// Reports whether `name` is reserved by a builtin.
#[must_use]
pub fn is_builtin(name: &str) -> bool {
    lookup(name).is_some()
}

fn sig(generics: &[&str], params: Vec<Type>, ret: Type) -> FunctionType {
    FunctionType { generics: generics.iter().map(ToString::to_string).collect(),
                   params:   params.into_iter()
                                   .map(|ty| ParamType { ty,
                                                         mutable: false })
                                   .collect(),
                   ret:      Box::new(ret), }
}

fn param(name: &str) -> Type {
    Type::Param(name.to_string())
}

fn vec_of(inner: Type) -> Type {
    Type::Vec(Box::new(inner))
}
