//! Lexer and recursive-descent parser for the coffee language (spec.md §4.1, §4.2).

mod parser;
mod tokenizer;

pub use parser::{parse_tokens, ParserContext};
pub use tokenizer::Lexer;

use coffee_ast::program::Program;
use coffee_errors::Result;

/// Parses a full source text into a [`Program`]: tokenize, then parse.
pub fn parse(source: &str) -> Result<Program> {
    let tokens = Lexer::new(source).tokenize()?;
    tracing::debug!(token_count = tokens.len(), "tokenized source");
    let program = parse_tokens(tokens)?;
    tracing::debug!(classes = program.classes.len(), statements = program.statements.len(), "parsed program");
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coffee_ast::decl::Modifier;
    use coffee_ast::expr::{BinaryOp, Expr};
    use coffee_ast::stmt::Stmt;

    #[test]
    fn parses_operator_precedence() {
        // `1 + 2 * 3` groups as `1 + (2 * 3)`.
        let program = parse("int x = 1 + 2 * 3;").unwrap();
        let Stmt::VarDecl { init: Some(expr), .. } = &program.statements[0] else { panic!() };
        match expr {
            Expr::Binary { op: BinaryOp::Add, left, right } => {
                assert!(matches!(**left, Expr::IntLit(1)));
                assert!(matches!(**right, Expr::Binary { op: BinaryOp::Mul, .. }));
            }
            other => panic!("expected Add at top, got {other:?}"),
        }
    }

    #[test]
    fn non_associative_comparison_accepts_only_one() {
        // `a < b` is fine; parsing stops before a second comparison op.
        let program = parse("boolean b = 1 < 2;").unwrap();
        let Stmt::VarDecl { init: Some(Expr::Binary { op: BinaryOp::Lt, .. }), .. } = &program.statements[0] else { panic!() };
    }

    #[test]
    fn disambiguates_decl_vs_call_expr_stmt() {
        let program = parse("class M { static void main() { foo(1); } }").unwrap();
        let method = &program.classes[0].methods[0];
        assert!(matches!(method.body[0], Stmt::ExprStmt(Expr::MethodCall { receiver: None, .. })));
    }

    #[test]
    fn disambiguates_decl_with_initializer() {
        let program = parse("int x = 5;").unwrap();
        assert!(matches!(&program.statements[0], Stmt::VarDecl { var_type, name, init: Some(_) } if var_type == "int" && name == "x"));
    }

    #[test]
    fn parses_compound_assignment_as_lowered_binary() {
        let program = parse("x += 1;").unwrap();
        let Stmt::Assign { name, value: Expr::Binary { op: BinaryOp::Add, .. } } = &program.statements[0] else { panic!() };
        assert_eq!(name, "x");
    }

    #[test]
    fn parses_class_with_constructor_and_method() {
        let program = parse(
            r#"
            class Counter {
                int n;
                public Counter(int x) { this.n = x; }
                public int inc() { this.n = this.n + 1; return this.n; }
            }
            "#,
        )
        .unwrap();
        let class = &program.classes[0];
        assert_eq!(class.name, "Counter");
        assert_eq!(class.fields.len(), 1);
        assert_eq!(class.constructors.len(), 1);
        assert_eq!(class.methods.len(), 1);
        assert!(class.methods[0].modifiers.contains(&Modifier::Public));
    }

    #[test]
    fn parses_for_loop_header() {
        let program = parse("for (int i = 0; i < 5; i++) { println(i); }").unwrap();
        assert!(matches!(&program.statements[0], Stmt::For { init: Some(_), cond: Some(_), update: Some(_), .. }));
    }

    #[test]
    fn parses_array_assignment() {
        let program = parse("a[0] = 7;").unwrap();
        assert!(matches!(&program.statements[0], Stmt::ArrayAssign { array, .. } if array == "a"));
    }

    #[test]
    fn parses_cast_only_for_primitive_types() {
        let program = parse("int x = (int) 3.5;").unwrap();
        let Stmt::VarDecl { init: Some(Expr::Cast { target_type, .. }), .. } = &program.statements[0] else { panic!() };
        assert_eq!(target_type, "int");
    }
}
