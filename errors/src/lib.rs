//! The error taxonomy for the coffee language toolchain.
//!
//! Every phase of the pipeline (lexer, parser, evaluator) has its own error
//! type; [`Error`] unifies them so callers can propagate with `?` all the way
//! up to the CLI driver, which is the only place errors are ever displayed.

use std::fmt;

use thiserror::Error;

/// A 1-indexed (line, column) position in the source text.
///
/// Carried on tokens (per the lexer) and on lexical/syntactic errors; the AST
/// itself does not carry spans (see DESIGN.md).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("{0}: unterminated string literal")]
    UnterminatedString(Span),
    #[error("{0}: unterminated character literal")]
    UnterminatedChar(Span),
    #[error("{0}: unterminated block comment")]
    UnterminatedBlockComment(Span),
    #[error("{0}: unexpected character '{1}'")]
    UnexpectedCharacter(Span, char),
}

impl LexError {
    pub fn span(&self) -> Span {
        match self {
            Self::UnterminatedString(s)
            | Self::UnterminatedChar(s)
            | Self::UnterminatedBlockComment(s)
            | Self::UnexpectedCharacter(s, _) => *s,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("{span}: unexpected token: expected {expected}, found {found}")]
    Unexpected { span: Span, expected: String, found: String },
    #[error("{0}: expected an identifier")]
    ExpectedIdentifier(Span),
    #[error("{0}: expected a type name")]
    ExpectedType(Span),
    #[error("{0}: unexpected end of input")]
    UnexpectedEof(Span),
}

impl ParseError {
    pub fn span(&self) -> Span {
        match self {
            Self::Unexpected { span, .. } => *span,
            Self::ExpectedIdentifier(s) | Self::ExpectedType(s) | Self::UnexpectedEof(s) => *s,
        }
    }
}

/// Runtime (evaluation-time) errors. These are the only errors a source
/// program's `try`/`catch` can observe, and only via their stringified
/// [`std::fmt::Display`] form (spec.md §7, §9).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Variable '{0}' is not defined")]
    UndefinedVariable(String),
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Array index out of range: {index} (length {length})")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("Class '{0}' is not defined")]
    UndefinedClass(String),
    #[error("No constructor for class '{class}' accepts {arity} argument(s)")]
    NoMatchingConstructor { class: String, arity: usize },
    #[error("No method '{method}' on '{class}' accepts {arity} argument(s)")]
    NoMatchingMethod { class: String, method: String, arity: usize },
    #[error("Undefined method '{0}'")]
    UndefinedFunction(String),
    #[error("Operator '{op}' cannot be applied to the given operand(s)")]
    InvalidOperand { op: String },
    #[error("{0}")]
    Custom(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type Result<T> = std::result::Result<T, Error>;
