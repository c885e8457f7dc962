/// Binary operator dispatch.
///
/// Evaluates operands, short-circuits `&&` and `||`, and routes every other
/// operator to the scalar or comparison handlers.
pub mod core;

/// Arithmetic on integers and floats, and string concatenation.
///
/// Integer results wrap at the operands' width.
pub mod scalar;

/// Equality and ordering.
pub mod comparison;
