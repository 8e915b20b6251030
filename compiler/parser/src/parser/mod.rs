//! Recursive-descent parser: token stream → [`Program`] (spec.md §4.2).

mod context;
mod expression;
mod file;
mod statement;
mod types;

pub use context::ParserContext;

use coffee_ast::program::Program;
use coffee_ast::token::Token;
use coffee_errors::Result;

pub fn parse_tokens(tokens: Vec<Token>) -> Result<Program> {
    let mut ctx = ParserContext::new(tokens);
    file::parse_program(&mut ctx)
}
