use std::fmt;

use logos::Logos;

use crate::{
    ast::Position,
    error::{LexError, LexErrorKind},
    types::IntWidth,
};

/// An integer literal with its optional width suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLiteral {
    /// Literal magnitude; always non-negative.
    pub value: i64,
    /// Width from a suffix such as `i64`, if one was written.
    pub width: Option<IntWidth>,
}

/// Represents a lexical token in the source input.
///
/// Multi-character symbols win over their prefixes (`$$` over `$`, `~?` over
/// `~`, `#@` over `#`) because `logos` always takes the longest match.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(error = LexErrorKind)]
pub enum Token {
    /// Float literal tokens, such as `3.14`, `2.0f64` or `2f64`.
    #[regex(r"[0-9]+\.[0-9]+(f64)?", parse_float)]
    #[regex(r"[0-9]+f64", parse_float)]
    Float(f64),
    /// Integer literal tokens, such as `42` or `42i8`.
    #[regex(r"[0-9]+(i8|i16|i32|i64)?", parse_integer)]
    Integer(IntLiteral),
    /// `true` or `false`.
    #[token("true", parse_bool)]
    #[token("false", parse_bool)]
    Bool(bool),
    /// A string literal with escapes resolved.
    #[regex(r#""([^"\\]|\\(.|\n))*""#, parse_string, allow_greedy = true)]
    Str(String),
    /// A char literal with escapes resolved.
    #[regex(r"'([^'\\\n]|\\[^\n])'", parse_char)]
    Char(char),
    /// A string that reaches the end of input without a closing quote.
    #[regex(r#""([^"\\]|\\(.|\n))*\\?"#, unterminated_string, allow_greedy = true)]
    UnterminatedStr,
    /// A char literal without a closing quote right after its character.
    #[regex(r"'([^'\\\n]|\\[^\n])?", unterminated_char)]
    UnterminatedChar,
    /// Identifier tokens, such as `x`, `vec` or `i32`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `fn`
    #[token("fn")]
    Fn,
    /// `lam`
    #[token("lam")]
    Lam,
    /// `for`
    #[token("for")]
    For,
    /// `in`, both the loop keyword and the input builtin.
    #[token("in")]
    In,
    /// `ret`
    #[token("ret")]
    Ret,
    /// `del`
    #[token("del")]
    Del,
    /// `quit`
    #[token("quit")]
    Quit,
    /// `#`, immutable declaration.
    #[token("#")]
    Hash,
    /// `#@`, mutable declaration.
    #[token("#@")]
    HashAt,
    /// `@`, mutable parameter marker.
    #[token("@")]
    At,
    /// `$`, print.
    #[token("$")]
    Dollar,
    /// `$$`, print with newline.
    #[token("$$")]
    DollarDollar,
    /// `$?`, while loop.
    #[token("$?")]
    DollarQuestion,
    /// `?`, first branch of a conditional chain.
    #[token("?")]
    Question,
    /// `~?`, further guarded branch.
    #[token("~?")]
    TildeQuestion,
    /// `~`, final branch.
    #[token("~")]
    Tilde,
    /// `::`
    #[token("::")]
    ColonColon,
    /// `:`
    #[token(":")]
    Colon,
    /// `..`
    #[token("..")]
    DotDot,
    /// `<<`, opens a generic list.
    #[token("<<")]
    Shl,
    /// `>>`, closes a generic list.
    #[token(">>")]
    Shr,
    /// `->`
    #[token("->")]
    Arrow,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `,`
    #[token(",")]
    Comma,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `^`
    #[token("^")]
    Caret,
    /// `==`
    #[token("==")]
    EqEq,
    /// `!=`
    #[token("!=")]
    BangEq,
    /// `<`
    #[token("<")]
    Less,
    /// `<=`
    #[token("<=")]
    LessEq,
    /// `>`
    #[token(">")]
    Greater,
    /// `>=`
    #[token(">=")]
    GreaterEq,
    /// `&&`
    #[token("&&")]
    AndAnd,
    /// `||`
    #[token("||")]
    OrOr,
    /// `!`
    #[token("!")]
    Bang,
    /// `=`
    #[token("=")]
    Equals,
    /// `// Comments.`
    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    Comment,
    /// ```text
    /// /* Multi line comments. */
    /// ```
    #[regex(r"/\*([^*]|\*[^/])*\*/", |lex| {
        let (comment, start) = (lex.slice(), lex.span().start);
        lex.extras.advance_lines(comment, start);
        logos::Skip
    })]
    MultiLineComment,
    /// `\n`
    #[token("\n", |lex| {
        lex.extras.line += 1;
        lex.extras.line_start = lex.span().end;
        logos::Skip
    })]
    NewLine,
    /// Ignored whitespace.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

/// Tracks where the current line starts so tokens can report columns.
#[derive(Debug, Clone, Copy)]
pub struct LexerExtras {
    /// Current 1-based line.
    pub line:       usize,
    /// Byte offset where the current line starts.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line: 1, line_start: 0 }
    }
}

impl LexerExtras {
    /// Position of the byte at `offset` on the current line. Columns count
    /// characters, not bytes.
    #[must_use]
    pub fn position(&self, source: &str, offset: usize) -> Position {
        let column = source.get(self.line_start..offset)
                           .map_or(offset - self.line_start, |text| text.chars().count());
        Position::new(self.line, column + 1)
    }

    /// Moves past newlines embedded in `text`, which starts at `offset`.
    fn advance_lines(&mut self, text: &str, offset: usize) {
        for (i, _) in text.match_indices('\n') {
            self.line += 1;
            self.line_start = offset + i + 1;
        }
    }
}

/// Converts source text into tokens paired with their start positions.
///
/// # Errors
/// Returns a [`LexError`] at the first malformed token.
///
/// # Examples
/// ```
/// use obstruct::interpreter::lexer::{tokenize, Token};
///
/// let tokens = tokenize("#@ x = 1;").unwrap();
/// assert_eq!(tokens[0].0, Token::HashAt);
/// assert_eq!(tokens[1].1.column, 4);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<(Token, Position)>, LexError> {
    let mut tokens = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras::default());

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let pos = lexer.extras.position(source, span.start);
        match token {
            Ok(tok) => {
                // String literals may span lines; keep columns right after them.
                if matches!(tok, Token::Str(_)) {
                    let slice = lexer.slice();
                    lexer.extras.advance_lines(slice, span.start);
                }
                tokens.push((tok, pos));
            },
            Err(kind) => {
                return Err(LexError { kind,
                                      lexeme: lexer.slice().to_string(),
                                      pos });
            },
        }
    }

    Ok(tokens)
}

fn parse_float(lex: &logos::Lexer<Token>) -> Result<f64, LexErrorKind> {
    let slice = lex.slice();
    let digits = slice.strip_suffix("f64").unwrap_or(slice);
    digits.parse()
          .map_err(|_| LexErrorKind::MalformedFloat(slice.to_string()))
}

fn parse_integer(lex: &logos::Lexer<Token>) -> Result<IntLiteral, LexErrorKind> {
    let slice = lex.slice();
    let split = slice.find('i').unwrap_or(slice.len());
    let (digits, suffix) = slice.split_at(split);
    let width = IntWidth::from_name(suffix);
    // Unsuffixed literals take their width from context, which the checker
    // knows; here they only have to fit the widest type.
    let effective = width.unwrap_or(IntWidth::I64);

    let out_of_range = || LexErrorKind::IntegerOutOfRange { literal: slice.to_string(),
                                                            width:   effective.name(), };
    let value: i64 = digits.parse().map_err(|_| out_of_range())?;
    if !effective.contains(value) {
        return Err(out_of_range());
    }
    Ok(IntLiteral { value, width })
}

fn parse_bool(lex: &logos::Lexer<Token>) -> Option<bool> {
    lex.slice().parse().ok()
}

fn unterminated_string(_lex: &logos::Lexer<Token>) -> Result<(), LexErrorKind> {
    Err(LexErrorKind::UnterminatedString)
}

fn unterminated_char(_lex: &logos::Lexer<Token>) -> Result<(), LexErrorKind> {
    Err(LexErrorKind::UnterminatedChar)
}

fn parse_string(lex: &logos::Lexer<Token>) -> Result<String, LexErrorKind> {
    let slice = lex.slice();
    unescape(&slice[1..slice.len() - 1], '"')
}

fn parse_char(lex: &logos::Lexer<Token>) -> Result<char, LexErrorKind> {
    let slice = lex.slice();
    let text = unescape(&slice[1..slice.len() - 1], '\'')?;
    text.chars().next().ok_or(LexErrorKind::UnterminatedChar)
}

/// Resolves backslash escapes. `quote` is the delimiter that may be escaped.
fn unescape(body: &str, quote: char) -> Result<String, LexErrorKind> {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some('\\') => out.push('\\'),
            Some(q) if q == quote => out.push(q),
            Some(other) => return Err(LexErrorKind::InvalidEscape(other)),
            None => return Err(LexErrorKind::InvalidEscape('\\')),
        }
    }
    Ok(out)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Float(v) => return write!(f, "`{v}`"),
            Self::Integer(lit) => return write!(f, "`{}`", lit.value),
            Self::Bool(b) => return write!(f, "`{b}`"),
            Self::Str(s) => return write!(f, "string {s:?}"),
            Self::Char(c) => return write!(f, "char {c:?}"),
            Self::Identifier(name) => return write!(f, "identifier `{name}`"),
            Self::UnterminatedStr => "unterminated string",
            Self::UnterminatedChar => "unterminated char",
            Self::Fn => "fn",
            Self::Lam => "lam",
            Self::For => "for",
            Self::In => "in",
            Self::Ret => "ret",
            Self::Del => "del",
            Self::Quit => "quit",
            Self::Hash => "#",
            Self::HashAt => "#@",
            Self::At => "@",
            Self::Dollar => "$",
            Self::DollarDollar => "$$",
            Self::DollarQuestion => "$?",
            Self::Question => "?",
            Self::TildeQuestion => "~?",
            Self::Tilde => "~",
            Self::ColonColon => "::",
            Self::Colon => ":",
            Self::DotDot => "..",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Arrow => "->",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::Semicolon => ";",
            Self::Comma => ",",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::Slash => "/",
            Self::Percent => "%",
            Self::Caret => "^",
            Self::EqEq => "==",
            Self::BangEq => "!=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::AndAnd => "&&",
            Self::OrOr => "||",
            Self::Bang => "!",
            Self::Equals => "=",
            Self::Comment | Self::MultiLineComment => "comment",
            Self::NewLine => "newline",
            Self::Ignored => "whitespace",
        };
        write!(f, "`{text}`")
    }
}
