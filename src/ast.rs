use std::{fmt, rc::Rc};

use crate::types::{IntWidth, Type};

/// A location in the source text.
///
/// Lines and columns are 1-based. Columns count bytes from the start of the
/// line, which matches what most editors report for ASCII source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    /// 1-based line number.
    pub line:   usize,
    /// 1-based byte column.
    pub column: usize,
}

impl Position {
    /// Creates a position from a line and a column.
    #[must_use]
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// A literal value as written in source code.
///
/// Integer literals remember whether they carried an explicit width suffix.
/// Unsuffixed literals start out as `i32` and may be retyped by the checker
/// when the surrounding context expects another width.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// An integer literal and its width.
    Int {
        /// The literal's magnitude.
        value:    i64,
        /// Width the literal evaluates to.
        width:    IntWidth,
        /// `true` when the width came from a suffix such as `8i16`.
        suffixed: bool,
    },
    /// A 64-bit floating-point literal.
    Float(f64),
    /// `true` or `false`.
    Bool(bool),
    /// A single Unicode scalar value.
    Char(char),
    /// A string literal with escapes already resolved.
    Str(String),
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<char> for Literal {
    fn from(value: char) -> Self {
        Self::Char(value)
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// The root of a parsed source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    /// Top-level statements in source order, function declarations included.
    pub statements: Vec<Statement>,
}

/// A single function parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// Parameter name.
    pub name:    String,
    /// Declared type.
    pub ty:      Type,
    /// Set by the `@` marker: the argument is shared with the caller.
    pub mutable: bool,
    /// Where the parameter was written.
    pub pos:     Position,
}

/// The shared part of named functions and lambdas.
///
/// Bodies are reference counted so that closure values created at run time
/// can point at them without cloning the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Names of the generic parameters, e.g. `T` in `fn id<<T>>(x: T) -> T`.
    pub generics: Vec<String>,
    /// Parameters in declaration order.
    pub params:   Vec<Param>,
    /// Declared return type; `None` means unit.
    pub ret:      Option<Type>,
    /// Function body.
    pub body:     Block,
    /// Position of the `fn` or `lam` keyword.
    pub pos:      Position,
}

/// A braced statement sequence with an optional trailing value.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Statements in order.
    pub statements: Vec<Statement>,
    /// The unterminated last expression, if any. It is the block's value.
    pub tail:       Option<Box<Expr>>,
    /// Position of the opening brace.
    pub pos:        Position,
}

/// A `? cond {..} ~? cond {..} ~ {..}` chain.
///
/// Branches are kept in source order so the first true guard wins without any
/// nesting.
#[derive(Debug, Clone, PartialEq)]
pub struct IfChain {
    /// Guard and body pairs.
    pub branches:  Vec<(Expr, Block)>,
    /// Body of the trailing `~` branch.
    pub otherwise: Option<Block>,
    /// Position of the leading `?`.
    pub pos:       Position,
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// The called expression, usually an identifier or builtin path.
    pub callee:        Box<Expr>,
    /// Arguments in order.
    pub args:          Vec<Expr>,
    /// Explicit `<<..>>` generic arguments.
    pub generics:      Vec<Type>,
    /// Generic arguments resolved by the checker, one per generic parameter
    /// of the callee. Empty until checking has run.
    pub instantiation: Vec<Type>,
    /// Position of the callee.
    pub pos:           Position,
}

/// A variable declaration introduced by `#` or `#@`.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    /// Declared name.
    pub name:    String,
    /// `true` for `#@`.
    pub mutable: bool,
    /// Optional annotation.
    pub ty:      Option<Type>,
    /// Optional initializer.
    pub init:    Option<Expr>,
    /// Type of the binding as resolved by the checker.
    pub resolved: Option<Type>,
    /// Position of the sigil.
    pub pos:     Position,
}

/// Statements that make up blocks and the program body.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `fn name<<T>>(params) -> ret { body }`.
    Function {
        /// Function name.
        name:     String,
        /// Signature and body.
        function: Rc<Function>,
        /// Position of the `fn` keyword.
        pos:      Position,
    },
    /// `# name: ty = init;` or `#@ name ...`.
    VarDecl(VarDecl),
    /// `name = value;`
    Assignment {
        /// Assigned binding.
        name:  String,
        /// New value.
        value: Expr,
        /// Position of the target.
        pos:   Position,
    },
    /// `del name;`
    Delete {
        /// Binding to remove.
        name: String,
        /// Position of the keyword.
        pos:  Position,
    },
    /// `ret value;`
    Return {
        /// Returned value; unit when absent.
        value: Option<Expr>,
        /// Position of the keyword.
        pos:   Position,
    },
    /// An expression evaluated for its effects.
    Expression(Expr),
}

/// An abstract syntax tree node representing an expression.
///
/// Every variant carries its source position for error reporting.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A literal constant.
    Literal {
        /// Constant value.
        value: Literal,
        /// Source position.
        pos:   Position,
    },
    /// A variable or builtin path such as `vec::push`.
    Identifier {
        /// Name, with `::` separators for paths.
        name: String,
        /// Source position.
        pos:  Position,
    },
    /// `left op right`.
    Binary {
        /// Operator.
        op:    BinaryOperator,
        /// Left operand.
        left:  Box<Self>,
        /// Right operand.
        right: Box<Self>,
        /// Position of the operator.
        pos:   Position,
    },
    /// `op expr`.
    Unary {
        /// Operator.
        op:   UnaryOperator,
        /// Operand.
        expr: Box<Self>,
        /// Position of the operator.
        pos:  Position,
    },
    /// A call.
    Call(Call),
    /// `target[index]`.
    Index {
        /// Indexed value.
        target: Box<Self>,
        /// Index expression.
        index:  Box<Self>,
        /// Position of the `[`.
        pos:    Position,
    },
    /// `[a, b, c]`, a fixed-size array.
    Array {
        /// Elements in order.
        elements: Vec<Self>,
        /// Position of the `[`.
        pos:      Position,
    },
    /// `{ ... }` used as a value.
    Block(Block),
    /// A conditional chain.
    IfChain(IfChain),
    /// `$? cond { body }`.
    While {
        /// Loop condition.
        condition: Box<Self>,
        /// Loop body.
        body:      Block,
        /// Position of `$?`.
        pos:       Position,
    },
    /// `for var in start..end { body }`.
    For {
        /// Loop variable.
        var:   String,
        /// Inclusive start.
        start: Box<Self>,
        /// Exclusive end.
        end:   Box<Self>,
        /// Loop body.
        body:  Block,
        /// Position of `for`.
        pos:   Position,
    },
    /// `lam(params) -> ret { body }`.
    Lambda {
        /// Signature and body.
        function: Rc<Function>,
        /// Position of `lam`.
        pos:      Position,
    },
    /// `$ expr` or `$$ expr`.
    Print {
        /// `true` for `$$`.
        newline: bool,
        /// Printed expression.
        expr:    Box<Self>,
        /// Position of the sigil.
        pos:     Position,
    },
}

impl Expr {
    /// Returns the source position of this expression.
    #[must_use]
    pub const fn pos(&self) -> Position {
        match self {
            Self::Literal { pos, .. }
            | Self::Identifier { pos, .. }
            | Self::Binary { pos, .. }
            | Self::Unary { pos, .. }
            | Self::Index { pos, .. }
            | Self::Array { pos, .. }
            | Self::While { pos, .. }
            | Self::For { pos, .. }
            | Self::Lambda { pos, .. }
            | Self::Print { pos, .. } => *pos,
            Self::Call(call) => call.pos,
            Self::Block(block) => block.pos,
            Self::IfChain(chain) => chain.pos,
        }
    }

    /// Reports whether this expression ends in a block and may therefore stand
    /// as a statement without a `;`.
    #[must_use]
    pub const fn is_block_like(&self) -> bool {
        matches!(self, Self::Block(_) | Self::IfChain(_) | Self::While { .. } | Self::For { .. })
    }
}

/// Binary operators, grouped by precedence level in the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Rem,
    /// `^`
    Pow,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,
    /// `&&`
    And,
    /// `||`
    Or,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op_str = match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Pow => "^",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::And => "&&",
            Self::Or => "||",
        };
        write!(f, "{op_str}")
    }
}

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    /// Arithmetic negation `-`.
    Negate,
    /// Logical negation `!`.
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Negate => write!(f, "-"),
            Self::Not => write!(f, "!"),
        }
    }
}
