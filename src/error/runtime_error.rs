use thiserror::Error;

use crate::{ast::Position, error::NameError};

/// Errors raised while a program runs.
///
/// Any of these aborts execution and maps to exit code 1.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    /// A lookup of a missing or deleted binding.
    #[error(transparent)]
    Name(#[from] NameError),
    /// Integer or float division or remainder by zero.
    #[error("Runtime error at {pos}: division by zero")]
    DivisionByZero {
        /// Where the operator is.
        pos: Position,
    },
    /// An integer power with a negative exponent.
    #[error("Runtime error at {pos}: negative exponent {exponent}")]
    NegativeExponent {
        /// The exponent.
        exponent: i64,
        /// Where the operator is.
        pos:      Position,
    },
    /// An index outside a string, vector or array.
    #[error("Runtime error at {pos}: index {index} out of bounds for length {len}")]
    IndexOutOfBounds {
        /// The requested index.
        index: i64,
        /// The container length.
        len:   usize,
        /// Where the access is.
        pos:   Position,
    },
    /// Deref of a freed heap slot.
    #[error("Runtime error at {pos}: pointer dereferenced after free")]
    UseAfterFree {
        /// Where the deref is.
        pos: Position,
    },
    /// Free of a slot that is already free.
    #[error("Runtime error at {pos}: pointer freed twice")]
    DoubleFree {
        /// Where the free is.
        pos: Position,
    },
    /// A reference whose target binding has been dropped.
    #[error("Runtime error at {pos}: reference to `{name}` outlived its binding")]
    DanglingReference {
        /// The referenced binding.
        name: String,
        /// Where the reference was used.
        pos:  Position,
    },
    /// A call to a lambda whose captured scope has ended.
    #[error("Runtime error at {pos}: closure called after its defining scope ended")]
    ExpiredClosure {
        /// Where the call is.
        pos: Position,
    },
    /// Assignment to a binding that was not declared mutable.
    #[error("Runtime error at {pos}: cannot assign to immutable binding `{name}`")]
    ImmutableAssignment {
        /// The binding.
        name: String,
        /// Where the assignment is.
        pos:  Position,
    },
    /// An operator applied to values it does not support.
    #[error("Runtime error at {pos}: invalid operand types for `{op}`: {details}")]
    InvalidOperands {
        /// The operator spelling.
        op:      String,
        /// The operand kinds.
        details: String,
        /// Where the operator is.
        pos:     Position,
    },
    /// A builtin received arguments of the wrong shape.
    #[error("Runtime error at {pos}: invalid argument to `{name}`: {details}")]
    InvalidArgument {
        /// The builtin.
        name:    String,
        /// What was wrong.
        details: String,
        /// Where the call is.
        pos:     Position,
    },
    /// A call with the wrong number of arguments.
    #[error("Runtime error at {pos}: `{name}` expects {expected} argument(s), found {found}")]
    ArgumentCountMismatch {
        /// The callee.
        name:     String,
        /// Accepted argument count.
        expected: String,
        /// Supplied argument count.
        found:    usize,
        /// Where the call is.
        pos:      Position,
    },
    /// Calling a value that is not a function.
    #[error("Runtime error at {pos}: value is not callable")]
    NotCallable {
        /// Where the call is.
        pos: Position,
    },
    /// A declaration whose generic type has no default value.
    #[error("Runtime error at {pos}: type `{ty}` has no default value")]
    NoDefault {
        /// The instantiated type.
        ty:  String,
        /// Where the declaration is.
        pos: Position,
    },
    /// A default array value with more elements than the interpreter allows.
    #[error("Runtime error at {pos}: type `{ty}` is too large to allocate")]
    AllocationFailed {
        /// The instantiated type.
        ty:  String,
        /// Where the value is built.
        pos: Position,
    },
    /// Too many nested user function calls.
    #[error("Runtime error at {pos}: stack overflow after {depth} nested calls")]
    StackOverflow {
        /// The call depth reached.
        depth: usize,
        /// Where the failing call is.
        pos:   Position,
    },
    /// Reading input or writing output failed.
    #[error("Runtime error at {pos}: I/O failure: {details}")]
    Io {
        /// The underlying error message.
        details: String,
        /// Where the operation is.
        pos:     Position,
    },
    /// The window collaborator reported a failure.
    #[error("Runtime error at {pos}: window: {details}")]
    Window {
        /// The collaborator's message.
        details: String,
        /// Where the call is.
        pos:     Position,
    },
}
