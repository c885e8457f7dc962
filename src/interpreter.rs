/// The lexer module tokenizes source code for further parsing.
///
/// The lexer reads the raw source text and produces a stream of tokens, each
/// tagged with its line and column: sigils, keywords, identifiers, literals
/// with optional width suffixes, operators and delimiters. This is the first
/// stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into positioned tokens.
/// - Decodes escapes in string and character literals.
/// - Reports lexical errors for malformed literals and stray characters.
pub mod lexer;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser is a recursive-descent parser over the token stream. It builds
/// statements, expressions with the usual precedence levels, blocks, `?`
/// chains, loops and `<<...>>` type syntax.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes.
/// - Decides whether a block's last expression is its value.
/// - Reports syntax errors with the position of the offending token.
pub mod parser;
/// The checker resolves names and types before anything runs.
///
/// It walks the AST once with a stack of typed scopes, infers and checks
/// every expression, enforces mutability, and annotates the tree with the
/// facts the evaluator relies on: literal widths, declaration types and
/// generic instantiations.
///
/// # Responsibilities
/// - Rejects undefined names, type mismatches and invalid assignments.
/// - Infers generic arguments from call arguments or the expected type.
/// - Tracks `del` so later uses of a deleted name are rejected.
pub mod checker;
/// The evaluator module executes a checked AST.
///
/// The evaluator is a tree walker. It keeps bindings in a scope arena, heap
/// data in generation-counted slots, and reaches the outside world through a
/// host.
///
/// # Responsibilities
/// - Evaluates expressions and executes statements.
/// - Calls functions, lambdas and builtins.
/// - Reports runtime errors such as division by zero or use after free.
pub mod evaluator;
/// Native functions callable from programs.
///
/// Each builtin has a static signature for the checker and a native
/// implementation for the evaluator, both found through one table.
pub mod builtins;
/// Runtime state owned by the evaluator.
///
/// Holds the scope arena, the heap and the host services for output, input
/// and the window.
pub mod runtime;
/// The value module defines the runtime data representation.
///
/// Values mirror static types one to one: fixed-width integers, floats,
/// booleans, characters, strings, containers, pointers, references and
/// functions.
pub mod value;
