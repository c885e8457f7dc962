/// The dispatch table and the types shared by every native function.
///
/// Each entry pairs a name with its static signature, accepted argument
/// counts, an extra check for the type checker and the native function
/// itself. The checker and the evaluator both read this one table.
pub mod core;

/// Default-value constructors: `i32::new`, `str::new`, `vec::new`,
/// `arr::new` and friends.
pub mod constructors;

/// Vector and string access: `vec::push`, `vec::nth`, `str::nth`, `len`.
pub mod collections;

/// Heap pointers and binding references.
pub mod pointer;

/// `type`, `in` and `quit`.
pub mod io;

/// Bridges to the window collaborator.
pub mod window;
