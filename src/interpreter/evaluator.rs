/// Binary operator evaluation logic.
///
/// Handles arithmetic with width-wrapping integers, string concatenation,
/// comparisons and the short-circuiting logical operators.
pub mod binary;

/// Unary operator evaluation logic.
///
/// Implements arithmetic negation and logical NOT.
pub mod unary;

/// Core evaluation logic and context management.
///
/// Contains the runtime context, program startup, the expression dispatcher
/// and the control-flow signals that unwind through calls.
pub mod core;

/// Statement execution: declarations, assignment, `del` and `ret`.
pub mod statement;

/// Blocks and `?` / `~?` / `~` chains.
pub mod block;

/// `$?` and `for` loops.
///
/// Every iteration runs its body in a fresh scope.
pub mod loops;

/// Utility functions for evaluation.
///
/// Provides scope entry and exit helpers, variable reads and indexing.
pub mod utils;

/// Function evaluation.
///
/// Handles user-defined and built-in function calls, argument passing by
/// value or by alias, and generic instantiation at runtime.
pub mod function;
