/// Fixed-width integer helpers.
///
/// The interpreter stores every integer in an `i64` tagged with its width.
/// These functions wrap results back into the width's range and convert the
/// value returned by `main` into an exit code.
pub mod num;
