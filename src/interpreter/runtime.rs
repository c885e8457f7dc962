/// Scopes and binding cells.
///
/// Scopes live in an arena addressed by generation-checked ids, so closures
/// can hold on to their defining scope without owning it, and a closure that
/// outlives its scope is detected instead of reading recycled memory.
pub mod environment;
/// The generation-counted heap behind `ptr::new` and `ptr::free`.
pub mod heap;
/// Process-facing services: the output sink, the input source and the window
/// collaborator.
pub mod host;
/// The window collaborator interface and its headless implementation.
pub mod window;
