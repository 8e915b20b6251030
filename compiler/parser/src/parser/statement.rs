//! Statement parsing, including the two speculative disambiguations between
//! declarations, assignments, and expression statements (spec.md §4.2).

use coffee_ast::expr::{BinaryOp, Expr, UnaryOp};
use coffee_ast::stmt::{CatchClause, Stmt, SwitchCase};
use coffee_ast::token::TokenKind;
use coffee_errors::{ParseError, Result};

use super::context::ParserContext;
use super::expression::{self, parse_expr, postfix_chain};
use super::types;

/// A block is `{ stmt* }` or a single statement (spec.md §4.2).
pub fn parse_block(p: &mut ParserContext) -> Result<Vec<Stmt>> {
    if p.eat(&TokenKind::LBrace) {
        let mut stmts = Vec::new();
        while !p.check(&TokenKind::RBrace) {
            stmts.push(parse_stmt(p)?);
        }
        p.expect(&TokenKind::RBrace)?;
        Ok(stmts)
    } else {
        Ok(vec![parse_stmt(p)?])
    }
}

pub fn parse_stmt(p: &mut ParserContext) -> Result<Stmt> {
    match p.token() {
        TokenKind::If => parse_if(p),
        TokenKind::While => parse_while(p),
        TokenKind::Do => parse_do_while(p),
        TokenKind::For => parse_for(p),
        TokenKind::Switch => parse_switch(p),
        TokenKind::Break => {
            p.bump();
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::Break)
        }
        TokenKind::Continue => {
            p.bump();
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::Continue)
        }
        TokenKind::Return => parse_return(p),
        TokenKind::Try => parse_try(p),
        TokenKind::This => parse_this_statement(p),
        _ => parse_decl_or_expr_stmt(p),
    }
}

fn parse_if(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    p.expect(&TokenKind::LParen)?;
    let cond = parse_expr(p)?;
    p.expect(&TokenKind::RParen)?;
    let then_branch = parse_block(p)?;
    let else_branch = if p.eat(&TokenKind::Else) { Some(parse_block(p)?) } else { None };
    Ok(Stmt::If { cond, then_branch, else_branch })
}

fn parse_while(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    p.expect(&TokenKind::LParen)?;
    let cond = parse_expr(p)?;
    p.expect(&TokenKind::RParen)?;
    let body = parse_block(p)?;
    Ok(Stmt::While { cond, body })
}

fn parse_do_while(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    let body = parse_block(p)?;
    p.expect(&TokenKind::While)?;
    p.expect(&TokenKind::LParen)?;
    let cond = parse_expr(p)?;
    p.expect(&TokenKind::RParen)?;
    p.expect(&TokenKind::Semicolon)?;
    Ok(Stmt::DoWhile { body, cond })
}

fn parse_for(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    p.expect(&TokenKind::LParen)?;

    let mark = p.mark();
    if let Some((elem_type, binder, iterable)) = try_parse_foreach_header(p) {
        p.expect(&TokenKind::RParen)?;
        let body = parse_block(p)?;
        return Ok(Stmt::ForEach { elem_type, binder, iterable, body });
    }
    p.rewind(mark);

    let init = if p.check(&TokenKind::Semicolon) { None } else { Some(Box::new(parse_for_clause(p)?)) };
    p.expect(&TokenKind::Semicolon)?;
    let cond = if p.check(&TokenKind::Semicolon) { None } else { Some(parse_expr(p)?) };
    p.expect(&TokenKind::Semicolon)?;
    let update = if p.check(&TokenKind::RParen) { None } else { Some(Box::new(parse_for_clause(p)?)) };
    p.expect(&TokenKind::RParen)?;
    let body = parse_block(p)?;
    Ok(Stmt::For { init, cond, update, body })
}

fn try_parse_foreach_header(p: &mut ParserContext) -> Option<(String, String, Expr)> {
    if !p.token().starts_type() {
        return None;
    }
    let elem_type = types::parse_type(p).ok()?;
    let binder = p.eat_identifier()?;
    if !p.eat(&TokenKind::Colon) {
        return None;
    }
    let iterable = parse_expr(p).ok()?;
    Some((elem_type, binder, iterable))
}

/// A for-loop init/update clause: a declaration, an assignment, or a bare
/// expression, without consuming a trailing separator.
fn parse_for_clause(p: &mut ParserContext) -> Result<Stmt> {
    if p.token().starts_type() {
        let mark = p.mark();
        if let Ok(ty) = types::parse_type(p) {
            if let Some(name) = p.eat_identifier() {
                let init = if p.eat(&TokenKind::Assign) { Some(parse_expr(p)?) } else { None };
                return Ok(Stmt::VarDecl { var_type: ty, name, init });
            }
        }
        p.rewind(mark);
    }

    if let TokenKind::Ident(name) = p.token().clone() {
        p.bump();
        return match p.token() {
            TokenKind::Assign => {
                p.bump();
                let value = parse_expr(p)?;
                Ok(Stmt::Assign { name, value })
            }
            TokenKind::PlusEq => {
                p.bump();
                let rhs = parse_expr(p)?;
                Ok(Stmt::Assign { name: name.clone(), value: compound(BinaryOp::Add, name, rhs) })
            }
            TokenKind::MinusEq => {
                p.bump();
                let rhs = parse_expr(p)?;
                Ok(Stmt::Assign { name: name.clone(), value: compound(BinaryOp::Sub, name, rhs) })
            }
            TokenKind::PlusPlus => {
                p.bump();
                Ok(Stmt::ExprStmt(Expr::Unary { op: UnaryOp::PostInc, expr: Box::new(Expr::Variable(name)) }))
            }
            TokenKind::MinusMinus => {
                p.bump();
                Ok(Stmt::ExprStmt(Expr::Unary { op: UnaryOp::PostDec, expr: Box::new(Expr::Variable(name)) }))
            }
            _ => {
                let expr = postfix_chain(p, Expr::Variable(name))?;
                Ok(Stmt::ExprStmt(expr))
            }
        };
    }

    Ok(Stmt::ExprStmt(parse_expr(p)?))
}

fn parse_switch(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    p.expect(&TokenKind::LParen)?;
    let scrutinee = parse_expr(p)?;
    p.expect(&TokenKind::RParen)?;
    p.expect(&TokenKind::LBrace)?;

    let mut cases = Vec::new();
    let mut default = None;
    while !p.check(&TokenKind::RBrace) {
        if p.eat(&TokenKind::Case) {
            let value = parse_expr(p)?;
            p.expect(&TokenKind::Colon)?;
            cases.push(SwitchCase { value, body: parse_case_body(p)? });
        } else if p.eat(&TokenKind::Default) {
            p.expect(&TokenKind::Colon)?;
            default = Some(parse_case_body(p)?);
        } else {
            return Err(ParseError::Unexpected { span: p.span(), expected: "'case' or 'default'".to_string(), found: p.token().to_string() }.into());
        }
    }
    p.expect(&TokenKind::RBrace)?;
    Ok(Stmt::Switch { scrutinee, cases, default })
}

fn parse_case_body(p: &mut ParserContext) -> Result<Vec<Stmt>> {
    let mut body = Vec::new();
    while !matches!(p.token(), TokenKind::Case | TokenKind::Default | TokenKind::RBrace) {
        body.push(parse_stmt(p)?);
    }
    Ok(body)
}

fn parse_return(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    if p.eat(&TokenKind::Semicolon) {
        Ok(Stmt::Return(None))
    } else {
        let value = parse_expr(p)?;
        p.expect(&TokenKind::Semicolon)?;
        Ok(Stmt::Return(Some(value)))
    }
}

fn parse_try(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    let try_block = parse_block(p)?;
    let mut catches = Vec::new();
    while p.eat(&TokenKind::Catch) {
        p.expect(&TokenKind::LParen)?;
        let exception_type = types::parse_type(p)?;
        let binder = p.expect_identifier()?;
        p.expect(&TokenKind::RParen)?;
        let body = parse_block(p)?;
        catches.push(CatchClause { exception_type, binder, body });
    }
    let finally_block = if p.eat(&TokenKind::Finally) { Some(parse_block(p)?) } else { None };
    Ok(Stmt::Try { try_block, catches, finally_block })
}

/// `this.field = expr;`, or more generally any postfix chain rooted at
/// `this` used as an expression statement (spec.md §4.2).
fn parse_this_statement(p: &mut ParserContext) -> Result<Stmt> {
    p.bump();
    if p.eat(&TokenKind::Dot) {
        let field = p.expect_identifier()?;
        if p.check(&TokenKind::LParen) {
            let args = expression::parse_args(p)?;
            let expr = postfix_chain(p, Expr::MethodCall { receiver: Some(Box::new(Expr::This)), name: field, args })?;
            p.expect(&TokenKind::Semicolon)?;
            return Ok(Stmt::ExprStmt(expr));
        }
        if p.eat(&TokenKind::Assign) {
            let value = parse_expr(p)?;
            p.expect(&TokenKind::Semicolon)?;
            return Ok(Stmt::FieldAssign { object: Expr::This, field, value });
        }
        let expr = postfix_chain(p, Expr::FieldAccess { object: Box::new(Expr::This), name: field })?;
        p.expect(&TokenKind::Semicolon)?;
        return Ok(Stmt::ExprStmt(expr));
    }
    let expr = postfix_chain(p, Expr::This)?;
    p.expect(&TokenKind::Semicolon)?;
    Ok(Stmt::ExprStmt(expr))
}

fn compound(op: BinaryOp, name: String, rhs: Expr) -> Expr {
    Expr::Binary { op, left: Box::new(Expr::Variable(name)), right: Box::new(rhs) }
}

/// The two-phase declaration/assignment/expression-statement disambiguation
/// (spec.md §4.2, §9 "Speculative parsing").
fn parse_decl_or_expr_stmt(p: &mut ParserContext) -> Result<Stmt> {
    if p.token().is_primitive_type() || matches!(p.token(), TokenKind::StringType | TokenKind::Void) {
        let var_type = types::parse_type(p)?;
        let name = p.expect_identifier()?;
        return finish_var_decl(p, var_type, name);
    }

    if let TokenKind::Ident(first) = p.token().clone() {
        let mark = p.mark();
        p.bump();

        let mut candidate_type = first.clone();
        loop {
            if p.check(&TokenKind::LBracket) {
                let bmark = p.mark();
                p.bump();
                if p.eat(&TokenKind::RBracket) {
                    candidate_type.push_str("[]");
                    continue;
                }
                p.rewind(bmark);
            }
            break;
        }

        if let TokenKind::Ident(_) = p.token() {
            let name = p.expect_identifier()?;
            return finish_var_decl(p, candidate_type, name);
        }

        // Not a `Type name` pair: rewind to just past the single leading
        // identifier and hand off to the plain-identifier disambiguation.
        p.rewind(mark);
        let name = p.expect_identifier()?;
        return parse_ident_led_statement(p, name);
    }

    let expr = parse_expr(p)?;
    p.expect(&TokenKind::Semicolon)?;
    Ok(Stmt::ExprStmt(expr))
}

fn finish_var_decl(p: &mut ParserContext, var_type: String, name: String) -> Result<Stmt> {
    if p.eat(&TokenKind::Assign) {
        let init = Some(parse_expr(p)?);
        p.expect(&TokenKind::Semicolon)?;
        return Ok(Stmt::VarDecl { var_type, name, init });
    }
    // Every other following token still commits to a declaration (spec.md
    // §4.2 rule 4); a malformed tail surfaces as the natural "expected ;"
    // parse error.
    p.expect(&TokenKind::Semicolon)?;
    Ok(Stmt::VarDecl { var_type, name, init: None })
}

/// The leading-plain-identifier disambiguation: assignment, array-element
/// assignment, compound assignment, field assignment, or an expression
/// statement (spec.md §4.2).
fn parse_ident_led_statement(p: &mut ParserContext, name: String) -> Result<Stmt> {
    match p.token() {
        TokenKind::Assign => {
            p.bump();
            let value = parse_expr(p)?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::Assign { name, value })
        }
        TokenKind::PlusEq => {
            p.bump();
            let rhs = parse_expr(p)?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::Assign { name: name.clone(), value: compound(BinaryOp::Add, name, rhs) })
        }
        TokenKind::MinusEq => {
            p.bump();
            let rhs = parse_expr(p)?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::Assign { name: name.clone(), value: compound(BinaryOp::Sub, name, rhs) })
        }
        TokenKind::LBracket => {
            p.bump();
            let index = parse_expr(p)?;
            p.expect(&TokenKind::RBracket)?;
            if p.eat(&TokenKind::Assign) {
                let value = parse_expr(p)?;
                p.expect(&TokenKind::Semicolon)?;
                return Ok(Stmt::ArrayAssign { array: name, index, value });
            }
            let expr = postfix_chain(p, Expr::ArrayAccess { array: Box::new(Expr::Variable(name)), index: Box::new(index) })?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::ExprStmt(expr))
        }
        TokenKind::Dot => {
            p.bump();
            let field = p.expect_identifier()?;
            if p.check(&TokenKind::LParen) {
                let args = expression::parse_args(p)?;
                let expr = postfix_chain(p, Expr::MethodCall { receiver: Some(Box::new(Expr::Variable(name))), name: field, args })?;
                p.expect(&TokenKind::Semicolon)?;
                return Ok(Stmt::ExprStmt(expr));
            }
            if p.eat(&TokenKind::Assign) {
                let value = parse_expr(p)?;
                p.expect(&TokenKind::Semicolon)?;
                return Ok(Stmt::FieldAssign { object: Expr::Variable(name), field, value });
            }
            let expr = postfix_chain(p, Expr::FieldAccess { object: Box::new(Expr::Variable(name)), name: field })?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::ExprStmt(expr))
        }
        TokenKind::LParen => {
            let args = expression::parse_args(p)?;
            let expr = postfix_chain(p, Expr::MethodCall { receiver: None, name, args })?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::ExprStmt(expr))
        }
        TokenKind::PlusPlus => {
            p.bump();
            let expr = postfix_chain(p, Expr::Unary { op: UnaryOp::PostInc, expr: Box::new(Expr::Variable(name)) })?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::ExprStmt(expr))
        }
        TokenKind::MinusMinus => {
            p.bump();
            let expr = postfix_chain(p, Expr::Unary { op: UnaryOp::PostDec, expr: Box::new(Expr::Variable(name)) })?;
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::ExprStmt(expr))
        }
        _ => {
            p.expect(&TokenKind::Semicolon)?;
            Ok(Stmt::ExprStmt(Expr::Variable(name)))
        }
    }
}
