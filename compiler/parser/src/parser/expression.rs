//! Operator-precedence expression parsing (spec.md §4.2 grammar table).

use coffee_ast::expr::{BinaryOp, Expr, UnaryOp};
use coffee_ast::token::TokenKind;
use coffee_errors::{ParseError, Result};

use super::context::ParserContext;

pub fn parse_expr(p: &mut ParserContext) -> Result<Expr> {
    parse_ternary(p)
}

/// Level 1: `? :`, right-associative.
fn parse_ternary(p: &mut ParserContext) -> Result<Expr> {
    let cond = parse_or(p)?;
    if p.eat(&TokenKind::Question) {
        let then_branch = parse_expr(p)?;
        p.expect(&TokenKind::Colon)?;
        let else_branch = parse_ternary(p)?;
        Ok(Expr::Ternary { cond: Box::new(cond), then_branch: Box::new(then_branch), else_branch: Box::new(else_branch) })
    } else {
        Ok(cond)
    }
}

/// Level 2: `||`, left-associative.
fn parse_or(p: &mut ParserContext) -> Result<Expr> {
    let mut left = parse_and(p)?;
    while p.eat(&TokenKind::OrOr) {
        let right = parse_and(p)?;
        left = Expr::Binary { op: BinaryOp::Or, left: Box::new(left), right: Box::new(right) };
    }
    Ok(left)
}

/// Level 3: `&&`, left-associative.
fn parse_and(p: &mut ParserContext) -> Result<Expr> {
    let mut left = parse_equality(p)?;
    while p.eat(&TokenKind::AndAnd) {
        let right = parse_equality(p)?;
        left = Expr::Binary { op: BinaryOp::And, left: Box::new(left), right: Box::new(right) };
    }
    Ok(left)
}

/// Level 4: `==`, `!=`, left-associative.
fn parse_equality(p: &mut ParserContext) -> Result<Expr> {
    let mut left = parse_comparison(p)?;
    loop {
        let op = match p.token() {
            TokenKind::EqEq => BinaryOp::Eq,
            TokenKind::NotEq => BinaryOp::NotEq,
            _ => break,
        };
        p.bump();
        let right = parse_comparison(p)?;
        left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
    }
    Ok(left)
}

/// Level 5: `<`, `<=`, `>`, `>=` — non-associative, at most one per chain
/// (spec.md §4.2), so this is an `if`, not a `while`.
fn parse_comparison(p: &mut ParserContext) -> Result<Expr> {
    let left = parse_additive(p)?;
    let op = match p.token() {
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::LtEq,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::GtEq,
        _ => return Ok(left),
    };
    p.bump();
    let right = parse_additive(p)?;
    Ok(Expr::Binary { op, left: Box::new(left), right: Box::new(right) })
}

/// Level 6: `+`, `-`, left-associative.
fn parse_additive(p: &mut ParserContext) -> Result<Expr> {
    let mut left = parse_multiplicative(p)?;
    loop {
        let op = match p.token() {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            _ => break,
        };
        p.bump();
        let right = parse_multiplicative(p)?;
        left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
    }
    Ok(left)
}

/// Level 7: `*`, `/`, `%`, left-associative.
fn parse_multiplicative(p: &mut ParserContext) -> Result<Expr> {
    let mut left = parse_unary(p)?;
    loop {
        let op = match p.token() {
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            TokenKind::Percent => BinaryOp::Mod,
            _ => break,
        };
        p.bump();
        let right = parse_unary(p)?;
        left = Expr::Binary { op, left: Box::new(left), right: Box::new(right) };
    }
    Ok(left)
}

/// Level 8: unary prefix `!`, `-`, `+`, `++`, `--`, and the primitive cast
/// `(T) x`, right-associative.
fn parse_unary(p: &mut ParserContext) -> Result<Expr> {
    let op = match p.token() {
        TokenKind::Not => Some(UnaryOp::Not),
        TokenKind::Minus => Some(UnaryOp::Neg),
        TokenKind::Plus => Some(UnaryOp::Plus),
        TokenKind::PlusPlus => Some(UnaryOp::PreInc),
        TokenKind::MinusMinus => Some(UnaryOp::PreDec),
        _ => None,
    };
    if let Some(op) = op {
        p.bump();
        let expr = parse_unary(p)?;
        return Ok(Expr::Unary { op, expr: Box::new(expr) });
    }

    if p.check(&TokenKind::LParen) {
        let mark = p.mark();
        p.bump();
        if p.token().is_primitive_type() {
            let target_type = p.token().to_string();
            p.bump();
            if p.eat(&TokenKind::RParen) {
                let expr = parse_unary(p)?;
                return Ok(Expr::Cast { target_type, expr: Box::new(expr) });
            }
        }
        p.rewind(mark);
    }

    parse_postfix(p)
}

/// Level 9: postfix `[i]`, `.name`, `.name(args)`, `x++`, `x--`, left-associative.
fn parse_postfix(p: &mut ParserContext) -> Result<Expr> {
    let expr = parse_primary(p)?;
    postfix_chain(p, expr)
}

/// Continues a postfix chain from an already-built expression. Shared with
/// the statement parser, which speculatively builds the receiver of a
/// postfix chain itself before it knows whether the statement is an
/// assignment or an expression statement (spec.md §4.2).
pub(crate) fn postfix_chain(p: &mut ParserContext, mut expr: Expr) -> Result<Expr> {
    loop {
        if p.eat(&TokenKind::LBracket) {
            let index = parse_expr(p)?;
            p.expect(&TokenKind::RBracket)?;
            expr = Expr::ArrayAccess { array: Box::new(expr), index: Box::new(index) };
        } else if p.eat(&TokenKind::Dot) {
            let name = p.expect_identifier()?;
            if p.check(&TokenKind::LParen) {
                let args = parse_args(p)?;
                expr = Expr::MethodCall { receiver: Some(Box::new(expr)), name, args };
            } else {
                expr = Expr::FieldAccess { object: Box::new(expr), name };
            }
        } else if p.eat(&TokenKind::PlusPlus) {
            expr = Expr::Unary { op: UnaryOp::PostInc, expr: Box::new(expr) };
        } else if p.eat(&TokenKind::MinusMinus) {
            expr = Expr::Unary { op: UnaryOp::PostDec, expr: Box::new(expr) };
        } else {
            break;
        }
    }
    Ok(expr)
}

/// Level 10: primaries.
fn parse_primary(p: &mut ParserContext) -> Result<Expr> {
    match p.token().clone() {
        TokenKind::Int(n) => {
            p.bump();
            Ok(Expr::IntLit(n))
        }
        TokenKind::Float(n) => {
            p.bump();
            Ok(Expr::FloatLit(n))
        }
        TokenKind::Str(s) => {
            p.bump();
            Ok(Expr::StringLit(s))
        }
        TokenKind::Char(c) => {
            p.bump();
            Ok(Expr::CharLit(c))
        }
        TokenKind::True => {
            p.bump();
            Ok(Expr::BoolLit(true))
        }
        TokenKind::False => {
            p.bump();
            Ok(Expr::BoolLit(false))
        }
        TokenKind::Null => {
            p.bump();
            Ok(Expr::NullLit)
        }
        TokenKind::This => {
            p.bump();
            Ok(Expr::This)
        }
        TokenKind::New => {
            p.bump();
            parse_new(p)
        }
        TokenKind::LBrace => {
            p.bump();
            let mut elements = Vec::new();
            if !p.check(&TokenKind::RBrace) {
                loop {
                    elements.push(parse_expr(p)?);
                    if !p.eat(&TokenKind::Comma) {
                        break;
                    }
                }
            }
            p.expect(&TokenKind::RBrace)?;
            Ok(Expr::ArrayLit(elements))
        }
        TokenKind::LParen => {
            p.bump();
            let inner = parse_expr(p)?;
            p.expect(&TokenKind::RParen)?;
            Ok(inner)
        }
        TokenKind::Ident(name) => {
            p.bump();
            if p.check(&TokenKind::LParen) {
                let args = parse_args(p)?;
                Ok(Expr::MethodCall { receiver: None, name, args })
            } else {
                Ok(Expr::Variable(name))
            }
        }
        _ => Err(ParseError::Unexpected { span: p.span(), expected: "an expression".to_string(), found: p.token().to_string() }.into()),
    }
}

pub(crate) fn parse_args(p: &mut ParserContext) -> Result<Vec<Expr>> {
    p.parse_list(&TokenKind::LParen, &TokenKind::RParen, &TokenKind::Comma, parse_expr)
}

/// `new T(args)` object construction, or `new T[e1][e2]…` array construction.
fn parse_new(p: &mut ParserContext) -> Result<Expr> {
    let name = if p.token().is_primitive_type() {
        let s = p.token().to_string();
        p.bump();
        s
    } else {
        p.expect_identifier()?
    };

    if p.check(&TokenKind::LParen) {
        let args = parse_args(p)?;
        Ok(Expr::New { class: name, args })
    } else if p.check(&TokenKind::LBracket) {
        let mut dims = Vec::new();
        while p.eat(&TokenKind::LBracket) {
            dims.push(parse_expr(p)?);
            p.expect(&TokenKind::RBracket)?;
        }
        Ok(Expr::NewArray { elem_type: name, dims })
    } else {
        Err(ParseError::Unexpected { span: p.span(), expected: "'(' or '['".to_string(), found: p.token().to_string() }.into())
    }
}
