//! The AST crate: token and node types shared by the parser, interpreter,
//! and `--ast` tree serializer.

pub mod decl;
pub mod expr;
pub mod pretty;
pub mod program;
pub mod stmt;
pub mod token;
pub mod tree;

pub use decl::{ClassDecl, ConstructorDecl, FieldDecl, MethodDecl, Modifier, Param};
pub use expr::{BinaryOp, Expr, UnaryOp};
pub use pretty::Indent;
pub use program::Program;
pub use stmt::{CatchClause, Stmt, SwitchCase};
pub use token::{Token, TokenKind};
pub use tree::TreeNode;
