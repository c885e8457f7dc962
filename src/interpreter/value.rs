/// Core value types.
///
/// Defines the `Value` enum, closures and references, conversions from
/// literals and Rust primitives, default values per type, and the display
/// format used by `$` and `$$`.
pub mod core;
