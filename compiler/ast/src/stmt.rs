//! Statement AST nodes (spec.md §3 "Statement variants").

use crate::expr::Expr;

#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    VarDecl { var_type: String, name: String, init: Option<Expr> },
    Assign { name: String, value: Expr },
    ArrayAssign { array: String, index: Expr, value: Expr },
    FieldAssign { object: Expr, field: String, value: Expr },
    If { cond: Expr, then_branch: Vec<Stmt>, else_branch: Option<Vec<Stmt>> },
    While { cond: Expr, body: Vec<Stmt> },
    DoWhile { body: Vec<Stmt>, cond: Expr },
    For { init: Option<Box<Stmt>>, cond: Option<Expr>, update: Option<Box<Stmt>>, body: Vec<Stmt> },
    ForEach { elem_type: String, binder: String, iterable: Expr, body: Vec<Stmt> },
    Switch { scrutinee: Expr, cases: Vec<SwitchCase>, default: Option<Vec<Stmt>> },
    Break,
    Continue,
    Return(Option<Expr>),
    ExprStmt(Expr),
    Try { try_block: Vec<Stmt>, catches: Vec<CatchClause>, finally_block: Option<Vec<Stmt>> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatchClause {
    pub exception_type: String,
    pub binder: String,
    pub body: Vec<Stmt>,
}
