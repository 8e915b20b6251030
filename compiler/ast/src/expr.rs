//! Expression AST nodes (spec.md §3 "Expression variants").

use std::fmt;

/// An expression. Built bottom-up by the parser and never mutated afterward
/// (spec.md's "construction is bottom-up; the tree is immutable after
/// parsing" invariant).
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    IntLit(i64),
    FloatLit(f64),
    StringLit(String),
    CharLit(char),
    BoolLit(bool),
    NullLit,
    This,
    Variable(String),
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
    Unary { op: UnaryOp, expr: Box<Expr> },
    Ternary { cond: Box<Expr>, then_branch: Box<Expr>, else_branch: Box<Expr> },
    ArrayAccess { array: Box<Expr>, index: Box<Expr> },
    FieldAccess { object: Box<Expr>, name: String },
    MethodCall { receiver: Option<Box<Expr>>, name: String, args: Vec<Expr> },
    New { class: String, args: Vec<Expr> },
    NewArray { elem_type: String, dims: Vec<Expr> },
    ArrayLit(Vec<Expr>),
    Cast { target_type: String, expr: Box<Expr> },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use BinaryOp::*;
        let s = match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Eq => "==",
            NotEq => "!=",
            Lt => "<",
            LtEq => "<=",
            Gt => ">",
            GtEq => ">=",
            And => "&&",
            Or => "||",
        };
        write!(f, "{s}")
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use UnaryOp::*;
        let s = match self {
            Not => "!",
            Neg => "-",
            Plus => "+",
            PreInc | PostInc => "++",
            PreDec | PostDec => "--",
        };
        write!(f, "{s}")
    }
}

impl UnaryOp {
    /// Postfix operators mutate-then-yield-prior-value; prefix operators
    /// mutate-then-yield-new-value (spec.md §4.4 "Unary").
    pub fn is_postfix(self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }
}
