/// Checker state and the program-level driver.
///
/// Hoists named functions, checks top-level statements in order, then checks
/// function bodies and validates `main`.
pub mod core;

/// Typed scopes.
///
/// Tracks declared names, their types and mutability, and which bindings
/// have been deleted. Lookups from inside a named function skip straight to
/// the global scope.
pub mod scope;

/// Statements and blocks, including the divergence of `ret` and `quit()`.
pub mod statement;

/// Expressions other than calls and operators.
pub mod expression;

/// Calls to user functions, lambdas and builtins, with generic inference.
pub mod call;

/// The operator applicability table.
pub mod operators;
