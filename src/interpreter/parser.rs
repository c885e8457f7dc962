/// Entry points shared by every parsing routine.
///
/// Defines `ParseResult`, the program-level driver and the expression entry
/// point.
pub mod core;

/// Binary operator parsing.
///
/// Implements precedence climbing from logical OR down to exponentiation, with
/// every level left-associative.
pub mod binary;

/// Prefix, postfix and primary expressions.
///
/// Covers negation, calls with optional generic arguments, indexing, literals,
/// lambdas and the print sigils.
pub mod unary;

/// Blocks and the block-like control flow forms.
///
/// Parses braces with an optional trailing value, the `?`/`~?`/`~` chain, `$?`
/// loops and `for` ranges.
pub mod block;

/// Statement parsing.
///
/// Declarations, assignments, `del`, `ret`, named functions and expression
/// statements.
pub mod statement;

/// Type annotations, generic parameter lists and parameter lists.
pub mod types;

/// Small helpers for consuming expected tokens and comma-separated lists.
pub mod utils;
