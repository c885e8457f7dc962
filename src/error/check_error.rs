use thiserror::Error;

use crate::{
    ast::{BinaryOperator, Position, UnaryOperator},
    types::Type,
};

/// Name resolution failures.
///
/// These are raised by the checker, and again by the evaluator for deletions
/// it could not see statically (for example a `del` inside a loop body).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NameError {
    /// No binding with this name is visible.
    #[error("Name error at {pos}: `{name}` is not defined")]
    Undefined {
        /// The name.
        name: String,
        /// Where it was used.
        pos:  Position,
    },
    /// The binding was removed with `del`.
    #[error("Name error at {pos}: `{name}` was deleted")]
    Deleted {
        /// The name.
        name: String,
        /// Where it was used.
        pos:  Position,
    },
    /// A second declaration of the same name in one scope.
    #[error("Name error at {pos}: `{name}` is already declared in this scope")]
    AlreadyDeclared {
        /// The name.
        name: String,
        /// Where it was redeclared.
        pos:  Position,
    },
    /// An attempt to declare a variable or function named like a builtin.
    #[error("Name error at {pos}: `{name}` is a builtin and cannot be redefined")]
    BuiltinRedefinition {
        /// The name.
        name: String,
        /// Where the declaration is.
        pos:  Position,
    },
    /// `del` on a binding owned by an enclosing function.
    #[error("Name error at {pos}: cannot delete `{name}` from outside the current function")]
    DeleteCaptured {
        /// The name.
        name: String,
        /// Where the `del` is.
        pos:  Position,
    },
    /// The program has no `main` function.
    #[error("Name error: no `main` function defined")]
    MissingMain,
}

/// Type, arity and mutability failures.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    /// A value of the wrong type.
    #[error("Type error at {pos}: expected `{expected}`, found `{found}`")]
    Mismatch {
        /// The required type.
        expected: Type,
        /// The type of the value.
        found:    Type,
        /// Where the value is.
        pos:      Position,
    },
    /// An operator applied to operand types it does not support.
    #[error("Type error at {pos}: invalid operand types `{left}` {op} `{right}`")]
    InvalidOperands {
        /// The operator.
        op:    BinaryOperator,
        /// Left operand type.
        left:  Type,
        /// Right operand type.
        right: Type,
        /// Where the operator is.
        pos:   Position,
    },
    /// A prefix operator applied to an unsupported type.
    #[error("Type error at {pos}: invalid operand type {op}`{operand}`")]
    InvalidOperand {
        /// The operator.
        op:      UnaryOperator,
        /// Operand type.
        operand: Type,
        /// Where the operator is.
        pos:     Position,
    },
    /// A call with the wrong number of arguments.
    #[error("Type error at {pos}: `{name}` expects {expected} argument(s), found {found}")]
    ArityMismatch {
        /// The callee.
        name:     String,
        /// Accepted argument count, e.g. `2` or `0 to 1`.
        expected: String,
        /// Supplied argument count.
        found:    usize,
        /// Where the call is.
        pos:      Position,
    },
    /// Assignment to an immutable binding.
    #[error("Type error at {pos}: cannot assign to immutable binding `{name}`")]
    ImmutableAssignment {
        /// The binding.
        name: String,
        /// Where the assignment is.
        pos:  Position,
    },
    /// A `@` parameter given something other than a mutable variable.
    #[error("Type error at {pos}: mutable parameter `{param}` needs a mutable variable argument")]
    MutableArgument {
        /// The parameter name.
        param: String,
        /// Where the argument is.
        pos:   Position,
    },
    /// A generic parameter that no argument or context determines.
    #[error("Type error at {pos}: cannot infer generic parameter `{param}` of `{name}`")]
    AmbiguousGeneric {
        /// The callee.
        name:  String,
        /// The generic parameter.
        param: String,
        /// Where the call is.
        pos:   Position,
    },
    /// A generic parameter bound to two different types.
    #[error("Type error at {pos}: conflicting types for `{name}`: `{first}` and `{second}`")]
    ConflictingGeneric {
        /// The callee.
        name:   String,
        /// The first binding.
        first:  Type,
        /// The conflicting binding.
        second: Type,
        /// Where the call is.
        pos:    Position,
    },
    /// Explicit generic arguments of the wrong count.
    #[error("Type error at {pos}: `{name}` takes {expected} generic argument(s), found {found}")]
    GenericArityMismatch {
        /// The callee.
        name:     String,
        /// Declared generic count.
        expected: usize,
        /// Supplied generic count.
        found:    usize,
        /// Where the call is.
        pos:      Position,
    },
    /// Calling something that is not a function.
    #[error("Type error at {pos}: `{found}` is not callable")]
    NotCallable {
        /// The callee type.
        found: Type,
        /// Where the call is.
        pos:   Position,
    },
    /// Indexing something that is not a string, vector or array.
    #[error("Type error at {pos}: `{found}` cannot be indexed")]
    NotIndexable {
        /// The indexed type.
        found: Type,
        /// Where the index is.
        pos:   Position,
    },
    /// A declaration with neither annotation nor initializer.
    #[error("Type error at {pos}: `{name}` needs a type annotation or an initializer")]
    MissingTypeAndValue {
        /// The declared name.
        name: String,
        /// Where the declaration is.
        pos:  Position,
    },
    /// A declaration without initializer whose type has no default value.
    #[error("Type error at {pos}: type `{ty}` has no default value")]
    NoDefault {
        /// The declared type.
        ty:  Type,
        /// Where the declaration is.
        pos: Position,
    },
    /// A type name that is neither primitive nor a generic in scope.
    #[error("Type error at {pos}: unknown type `{name}`")]
    UnknownType {
        /// The name.
        name: String,
        /// Where it was written.
        pos:  Position,
    },
    /// A builtin used as a value instead of being called.
    #[error("Type error at {pos}: builtin `{name}` can only be called")]
    BuiltinAsValue {
        /// The builtin.
        name: String,
        /// Where it was used.
        pos:  Position,
    },
    /// A builtin argument whose type the builtin does not handle.
    #[error("Type error at {pos}: `{name}` does not accept `{found}`")]
    UnsupportedArgument {
        /// The builtin.
        name:  String,
        /// The argument type.
        found: Type,
        /// Where the argument is.
        pos:   Position,
    },
    /// A builtin argument that must name a variable.
    #[error("Type error at {pos}: `{name}` needs a variable name as its argument")]
    NotAPlace {
        /// The builtin.
        name: String,
        /// Where the argument is.
        pos:  Position,
    },
    /// `ret` outside any function body.
    #[error("Type error at {pos}: `ret` outside of a function")]
    ReturnOutsideFunction {
        /// Where the `ret` is.
        pos: Position,
    },
    /// `fn` anywhere but the top level.
    #[error("Type error at {pos}: `fn {name}` must be declared at the top level; use `lam` for local functions")]
    NestedFunction {
        /// The function name.
        name: String,
        /// Where the declaration is.
        pos:  Position,
    },
    /// An unsuffixed literal that does not fit the width it was coerced to.
    #[error("Type error at {pos}: literal `{value}` does not fit in `{ty}`")]
    LiteralOutOfRange {
        /// The literal value.
        value: i64,
        /// The target type.
        ty:    Type,
        /// Where the literal is.
        pos:   Position,
    },
    /// `main` with the wrong signature.
    #[error("Type error at {pos}: `main` must take one `vec<<str>>` parameter and return unit or an integer, found `{found}`")]
    InvalidMain {
        /// The declared type of `main`.
        found: Type,
        /// Where `main` is declared.
        pos:   Position,
    },
}

/// Any error found before execution starts, other than lexing and parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckError {
    /// Name resolution failed.
    #[error(transparent)]
    Name(#[from] NameError),
    /// Type checking failed.
    #[error(transparent)]
    Type(#[from] TypeError),
}
