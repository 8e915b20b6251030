//! Class and top-level parsing (spec.md §4.2 "Class parsing", "Top-level
//! parsing").

use coffee_ast::decl::{ClassDecl, ConstructorDecl, FieldDecl, MethodDecl, Modifier, Param};
use coffee_ast::program::Program;
use coffee_ast::token::TokenKind;
use coffee_errors::Result;

use super::context::ParserContext;
use super::expression::parse_expr;
use super::statement::{self, parse_block};
use super::types;

pub fn parse_program(p: &mut ParserContext) -> Result<Program> {
    let mut classes = Vec::new();
    let mut statements = Vec::new();
    while p.has_next() {
        let modifiers = parse_modifiers(p);
        if p.check(&TokenKind::Class) {
            classes.push(parse_class(p, modifiers)?);
        } else if !modifiers.is_empty() {
            // Modifiers can only precede a class at file scope; this forces
            // the natural "expected 'class'" error.
            p.expect(&TokenKind::Class)?;
        } else {
            statements.push(statement::parse_stmt(p)?);
        }
    }
    Ok(Program { classes, statements })
}

fn parse_modifiers(p: &mut ParserContext) -> Vec<Modifier> {
    let mut mods = Vec::new();
    loop {
        let m = match p.token() {
            TokenKind::Public => Modifier::Public,
            TokenKind::Private => Modifier::Private,
            TokenKind::Protected => Modifier::Protected,
            TokenKind::Static => Modifier::Static,
            TokenKind::Final => Modifier::Final,
            _ => break,
        };
        p.bump();
        mods.push(m);
    }
    mods
}

fn parse_class(p: &mut ParserContext, modifiers: Vec<Modifier>) -> Result<ClassDecl> {
    p.expect(&TokenKind::Class)?;
    let name = p.expect_identifier()?;
    let extends = if p.eat(&TokenKind::Extends) { Some(p.expect_identifier()?) } else { None };
    // `implements` is accepted syntactically and discarded: interface
    // semantics are an explicit non-goal.
    if p.eat(&TokenKind::Implements) {
        loop {
            p.expect_identifier()?;
            if !p.eat(&TokenKind::Comma) {
                break;
            }
        }
    }
    p.expect(&TokenKind::LBrace)?;

    let mut fields = Vec::new();
    let mut constructors = Vec::new();
    let mut methods = Vec::new();
    while !p.check(&TokenKind::RBrace) {
        match parse_member(p, &name)? {
            Member::Field(f) => fields.push(f),
            Member::Constructor(c) => constructors.push(c),
            Member::Method(m) => methods.push(m),
        }
    }
    p.expect(&TokenKind::RBrace)?;

    Ok(ClassDecl { modifiers, name, extends, fields, constructors, methods })
}

enum Member {
    Field(FieldDecl),
    Constructor(ConstructorDecl),
    Method(MethodDecl),
}

/// A member is a constructor when its leading identifier equals the
/// enclosing class name and is followed by `(`; otherwise it begins with a
/// type, and a `(` after the member's type-and-name pair distinguishes a
/// method from a field (spec.md §4.2).
fn parse_member(p: &mut ParserContext, class_name: &str) -> Result<Member> {
    let modifiers = parse_modifiers(p);

    if let TokenKind::Ident(name) = p.token().clone() {
        if name == class_name && matches!(p.look_ahead(1), TokenKind::LParen) {
            p.bump();
            let params = parse_params(p)?;
            let body = parse_block(p)?;
            return Ok(Member::Constructor(ConstructorDecl { modifiers, class_name: class_name.to_string(), params, body }));
        }
    }

    let field_type = types::parse_type(p)?;
    let name = p.expect_identifier()?;
    if p.check(&TokenKind::LParen) {
        let params = parse_params(p)?;
        let body = parse_block(p)?;
        Ok(Member::Method(MethodDecl { modifiers, return_type: field_type, name, params, body }))
    } else {
        let init = if p.eat(&TokenKind::Assign) { Some(parse_expr(p)?) } else { None };
        p.expect(&TokenKind::Semicolon)?;
        Ok(Member::Field(FieldDecl { modifiers, field_type, name, init }))
    }
}

fn parse_params(p: &mut ParserContext) -> Result<Vec<Param>> {
    p.parse_list(&TokenKind::LParen, &TokenKind::RParen, &TokenKind::Comma, |p| {
        let ty = types::parse_type(p)?;
        let name = p.expect_identifier()?;
        Ok(Param { ty, name })
    })
}
