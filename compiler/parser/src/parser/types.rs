//! Type-name parsing shared by variable declarations, parameters, fields,
//! casts, and array constructions (spec.md §4.2).

use coffee_ast::token::TokenKind;
use coffee_errors::{ParseError, Result};

use super::context::ParserContext;

/// Parses a type name: a primitive keyword, `String`, `void`, or a class
/// identifier, optionally followed by one or more `[]` suffixes.
pub fn parse_type(p: &mut ParserContext) -> Result<String> {
    if !p.token().starts_type() {
        return Err(ParseError::ExpectedType(p.span()).into());
    }
    let mut name = match p.token().clone() {
        TokenKind::Ident(name) => {
            p.bump();
            name
        }
        other => {
            p.bump();
            other.to_string()
        }
    };
    while p.check(&TokenKind::LBracket) {
        let mark = p.mark();
        p.bump();
        if p.eat(&TokenKind::RBracket) {
            name.push_str("[]");
        } else {
            p.rewind(mark);
            break;
        }
    }
    Ok(name)
}
