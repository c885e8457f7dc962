//! # obstruct
//!
//! obstruct is an interpreter for a small statement language written in Rust.
//! Programs declare bindings with sigils (`#`, `#@`), print with `$` and `$$`,
//! branch with `?` chains and loop with `$?` and `for`. Integers carry a fixed
//! width and wrap on overflow, functions may be generic over `<<T>>`, and heap
//! data lives behind generation-checked `ptr<<T>>` handles.
//!
//! A run goes through four phases: lexing, parsing, static checking and
//! evaluation. Errors from the first three exit with code 2 before any
//! program code runs; runtime errors exit with code 1.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::{
    ast::{Position, Program},
    interpreter::{
        checker::core::Checker,
        evaluator::core::{Context, Unwind},
        lexer::tokenize,
        parser::core::parse_program,
        runtime::host::Host,
    },
};

/// Defines the structure of parsed code.
///
/// This module contains the data structures for the abstract syntax tree:
/// programs, statements, expressions, blocks, `?` chains, functions and
/// calls. Every node carries the position it was parsed at, and the checker
/// fills in the annotations the evaluator needs.
///
/// # Responsibilities
/// - Defines enums and structs for all syntax elements.
/// - Stores source positions for error reporting.
/// - Holds checker annotations such as literal widths and generic
///   instantiations.
pub mod ast;
/// Run settings shared by the CLI and the library entry points.
pub mod config;
/// Provides error types for every phase.
///
/// This module defines all errors that can be raised during lexing, parsing,
/// checking or evaluating code. Each carries the source position of the
/// failure, and the top-level [`Error`](error::Error) maps them to process
/// exit codes.
///
/// # Responsibilities
/// - Defines error enums for all failure modes.
/// - Attaches positions and detailed messages for context.
/// - Separates static errors from runtime errors.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, checking, evaluation, value
/// representations and the runtime services.
///
/// # Responsibilities
/// - Coordinates all core components.
/// - Provides entry points for each phase.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// Static types and generic unification.
///
/// Defines the `Type` enum, integer widths and function signatures, together
/// with substitution and unification of generic parameters.
pub mod types;
/// General utilities.
///
/// Fixed-width integer arithmetic helpers used by the checker and the
/// evaluator.
pub mod util;

pub use config::Config;
pub use error::Error;

/// Lexes and parses a program without checking it.
///
/// # Errors
/// Returns the first lexical or syntax error.
///
/// # Examples
/// ```
/// use obstruct::parse_source;
///
/// let program = parse_source("fn main(args: vec<<str>>) { $$ 1 + 2; }").unwrap();
/// assert_eq!(program.statements.len(), 1);
///
/// assert!(parse_source("fn main(args: vec<<str>>) { $$ 1 + ; }").is_err());
/// ```
pub fn parse_source(source: &str) -> Result<Program, Error> {
    let tokens = tokenize(source)?;
    Ok(parse_program(&tokens)?)
}

/// Parses and checks a program, returning the annotated tree.
///
/// # Errors
/// Returns the first lexical, syntax, name or type error.
///
/// # Examples
/// ```
/// use obstruct::check_source;
///
/// assert!(check_source("fn main(args: vec<<str>>) { # x = 1; }").is_ok());
///
/// // `x` is immutable.
/// let err = check_source("fn main(args: vec<<str>>) { # x = 1; x = 2; }").unwrap_err();
/// assert_eq!(err.exit_code(), 2);
/// ```
pub fn check_source(source: &str) -> Result<Program, Error> {
    let mut program = parse_source(source)?;
    Checker::new().check_program(&mut program)?;
    Ok(program)
}

/// Runs a program against the given host and returns its exit code.
///
/// Output is flushed when the run ends, however it ends. A `quit()` call is
/// a normal exit with the requested code.
///
/// # Errors
/// Returns a static error if the program does not check, or the runtime
/// error that stopped it.
pub fn run_with_host(source: &str, config: &Config, host: Host) -> Result<i32, Error> {
    let program = check_source(source)?;
    if config.check_only {
        return Ok(0);
    }

    let mut context = Context::new(host);
    let result = context.run_program(&program, config.args.clone());
    let flushed = context.host.flush(Position::default());

    let code = match result {
        Ok(code) | Err(Unwind::Quit(code)) => code,
        Err(Unwind::Error(err)) => {
            tracing::debug!(%err, "program failed");
            return Err(err.into());
        },
        Err(Unwind::Return(_)) => 0,
    };
    flushed?;
    Ok(code)
}

/// Runs a program on the process's standard streams.
///
/// # Errors
/// Same as [`run_with_host`].
pub fn run_source(source: &str, config: &Config) -> Result<i32, Error> {
    run_with_host(source, config, Host::stdio(config.frame_limit))
}

/// The outcome of a run with captured output.
#[derive(Debug)]
pub struct Captured {
    /// Exit code, or the error that ended the run.
    pub result: Result<i32, Error>,
    /// Everything the program printed.
    pub stdout: String,
}

impl Captured {
    /// The process exit code this run maps to.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match &self.result {
            Ok(code) => *code,
            Err(err) => err.exit_code(),
        }
    }
}

/// Runs a program with `input` as its standard input and collects what it
/// prints.
///
/// # Examples
/// ```
/// use obstruct::{Config, run_captured};
///
/// let source = "fn main(args: vec<<str>>) { # name = in(); $$ \"hi \" + name; }";
/// let captured = run_captured(source, "ada\n", &Config::default());
/// assert_eq!(captured.stdout, "hi ada\n");
/// assert_eq!(captured.exit_code(), 0);
/// ```
#[must_use]
pub fn run_captured(source: &str, input: &str, config: &Config) -> Captured {
    let (host, output) = Host::captured(input, config.frame_limit);
    let result = run_with_host(source, config, host);
    let stdout = String::from_utf8_lossy(&output.borrow()).into_owned();
    Captured { result, stdout }
}
