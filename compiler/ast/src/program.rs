//! The two top-level products the parser yields (spec.md §4.2 "Top-level
//! parsing"): an ordered sequence of class declarations and an ordered
//! sequence of free-standing statements, in source order.

use crate::decl::ClassDecl;
use crate::stmt::Stmt;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Program {
    pub classes: Vec<ClassDecl>,
    pub statements: Vec<Stmt>,
}
