//! The read-only AST→record traversal used by `--ast` mode (spec.md §4.5,
//! §6). The exact attribute/children shape per variant is a contract other
//! tooling depends on, so it is reproduced here verbatim rather than
//! inferred from the AST's own field names.

use std::fmt;

use crate::decl::ClassDecl;
use crate::expr::Expr;
use crate::program::Program;
use crate::pretty::Indent;
use crate::stmt::Stmt;

/// Recursion is capped to guard against pathological nesting (spec.md §4.5:
/// "Depth is bounded (limit ≈ 20) ... at the limit, emit a placeholder
/// node").
const MAX_DEPTH: usize = 20;

#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    pub ty: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(ty: &str) -> Self {
        Self { ty: ty.to_string(), attrs: Vec::new(), children: Vec::new() }
    }

    fn with_attrs(ty: &str, attrs: Vec<(&str, String)>) -> Self {
        Self { ty: ty.to_string(), attrs: attrs.into_iter().map(|(k, v)| (k.to_string(), v)).collect(), children: Vec::new() }
    }

    fn children(mut self, children: Vec<TreeNode>) -> Self {
        self.children = children;
        self
    }

    fn tagged(tag: &str, children: Vec<TreeNode>) -> Self {
        Self { ty: tag.to_string(), attrs: Vec::new(), children }
    }

    fn truncated() -> Self {
        Self::leaf("Truncated")
    }

    /// The single-record shape emitted for a failure in either CLI mode
    /// (spec.md §6, §7).
    pub fn error(message: impl Into<String>) -> Self {
        Self::with_attrs("Error", vec![("message", message.into())])
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {{", self.ty)?;
        {
            let mut body = String::new();
            for (k, v) in &self.attrs {
                use std::fmt::Write as _;
                writeln!(body, "{k}: {v}").unwrap();
            }
            if !self.children.is_empty() {
                use std::fmt::Write as _;
                writeln!(body, "children:").unwrap();
                let mut kids = String::new();
                for child in &self.children {
                    use std::fmt::Write as _;
                    write!(kids, "{child}").unwrap();
                }
                write!(body, "{}", Indent(kids)).unwrap();
            }
            write!(f, "{}", Indent(body))?;
        }
        writeln!(f, "}}")
    }
}

fn literal(value: impl fmt::Display) -> String {
    value.to_string()
}

fn opt_type_name(extends: &Option<String>) -> String {
    extends.clone().unwrap_or_else(|| "null".to_string())
}

pub fn expr_tree(expr: &Expr, depth: usize) -> TreeNode {
    if depth > MAX_DEPTH {
        return TreeNode::truncated();
    }
    let next = depth + 1;
    match expr {
        Expr::IntLit(v) => TreeNode::with_attrs("IntLit", vec![("value", literal(v))]),
        Expr::StringLit(s) => TreeNode::with_attrs("StringLit", vec![("value", s.clone())]),
        Expr::Variable(name) => TreeNode::with_attrs("Variable", vec![("name", name.clone())]),
        Expr::Binary { op, left, right } => TreeNode::with_attrs("BinOp", vec![("operator", op.to_string())])
            .children(vec![expr_tree(left, next), expr_tree(right, next)]),
        Expr::MethodCall { receiver, name, args } => {
            let mut children = Vec::new();
            if let Some(receiver) = receiver {
                children.push(expr_tree(receiver, next));
            }
            children.extend(args.iter().map(|a| expr_tree(a, next)));
            TreeNode::with_attrs("MethodCall", vec![("method", name.clone())]).children(children)
        }
        // Every other expression variant carries a type tag only, per the
        // shape contract's catch-all rule.
        Expr::FloatLit(_) => TreeNode::leaf("FloatLit"),
        Expr::CharLit(_) => TreeNode::leaf("CharLit"),
        Expr::BoolLit(_) => TreeNode::leaf("BoolLit"),
        Expr::NullLit => TreeNode::leaf("NullLit"),
        Expr::This => TreeNode::leaf("This"),
        Expr::Unary { .. } => TreeNode::leaf("Unary"),
        Expr::Ternary { .. } => TreeNode::leaf("Ternary"),
        Expr::ArrayAccess { .. } => TreeNode::leaf("ArrayAccess"),
        Expr::FieldAccess { .. } => TreeNode::leaf("FieldAccess"),
        Expr::New { .. } => TreeNode::leaf("New"),
        Expr::NewArray { .. } => TreeNode::leaf("NewArray"),
        Expr::ArrayLit(_) => TreeNode::leaf("ArrayLit"),
        Expr::Cast { .. } => TreeNode::leaf("Cast"),
    }
}

fn stmt_list_tree(tag: &str, stmts: &[Stmt], depth: usize) -> TreeNode {
    TreeNode::tagged(tag, stmts.iter().map(|s| stmt_tree(s, depth)).collect())
}

pub fn stmt_tree(stmt: &Stmt, depth: usize) -> TreeNode {
    if depth > MAX_DEPTH {
        return TreeNode::truncated();
    }
    let next = depth + 1;
    match stmt {
        Stmt::VarDecl { var_type, name, init } => {
            let children = init.as_ref().map(|e| vec![expr_tree(e, next)]).unwrap_or_default();
            TreeNode::with_attrs("VarDecl", vec![("varType", var_type.clone()), ("name", name.clone())]).children(children)
        }
        Stmt::Assign { name, value } => {
            TreeNode::with_attrs("Assign", vec![("target", name.clone())]).children(vec![expr_tree(value, next)])
        }
        Stmt::If { cond, then_branch, else_branch } => {
            let mut children = vec![
                TreeNode::tagged("condition", vec![expr_tree(cond, next)]),
                stmt_list_tree("then", then_branch, next),
            ];
            if let Some(else_branch) = else_branch {
                children.push(stmt_list_tree("else", else_branch, next));
            }
            TreeNode::tagged("If", children)
        }
        Stmt::While { cond, body } => TreeNode::tagged(
            "While",
            vec![TreeNode::tagged("condition", vec![expr_tree(cond, next)]), stmt_list_tree("body", body, next)],
        ),
        Stmt::For { init, cond, update, body } => {
            let mut children = Vec::new();
            if let Some(init) = init {
                children.push(TreeNode::tagged("init", vec![stmt_tree(init, next)]));
            }
            if let Some(cond) = cond {
                children.push(TreeNode::tagged("condition", vec![expr_tree(cond, next)]));
            }
            if let Some(update) = update {
                children.push(TreeNode::tagged("update", vec![stmt_tree(update, next)]));
            }
            children.push(stmt_list_tree("body", body, next));
            TreeNode::tagged("For", children)
        }
        Stmt::Return(value) => {
            let children = value.as_ref().map(|e| vec![expr_tree(e, next)]).unwrap_or_default();
            TreeNode::tagged("Return", children)
        }
        Stmt::ExprStmt(expr) => TreeNode::tagged("ExprStmt", vec![expr_tree(expr, next)]),
        // Catch-all: type tag only, no children (shape contract).
        Stmt::ArrayAssign { .. } => TreeNode::leaf("ArrayAssign"),
        Stmt::FieldAssign { .. } => TreeNode::leaf("FieldAssign"),
        Stmt::DoWhile { .. } => TreeNode::leaf("DoWhile"),
        Stmt::ForEach { .. } => TreeNode::leaf("ForEach"),
        Stmt::Switch { .. } => TreeNode::leaf("Switch"),
        Stmt::Break => TreeNode::leaf("Break"),
        Stmt::Continue => TreeNode::leaf("Continue"),
        Stmt::Try { .. } => TreeNode::leaf("Try"),
    }
}

pub fn field_tree(field: &crate::decl::FieldDecl, depth: usize) -> TreeNode {
    if depth > MAX_DEPTH {
        return TreeNode::truncated();
    }
    let children = field.init.as_ref().map(|e| vec![expr_tree(e, depth + 1)]).unwrap_or_default();
    TreeNode::with_attrs("FieldDecl", vec![("fieldType", field.field_type.clone()), ("name", field.name.clone())]).children(children)
}

pub fn method_tree(method: &crate::decl::MethodDecl, depth: usize) -> TreeNode {
    if depth > MAX_DEPTH {
        return TreeNode::truncated();
    }
    let next = depth + 1;
    let children = method.body.iter().map(|s| stmt_tree(s, next)).collect();
    TreeNode::with_attrs("MethodDecl", vec![("name", method.name.clone()), ("returnType", method.return_type.clone())]).children(children)
}

pub fn class_tree(class: &ClassDecl, depth: usize) -> TreeNode {
    if depth > MAX_DEPTH {
        return TreeNode::truncated();
    }
    let next = depth + 1;
    let mut children: Vec<TreeNode> = class.fields.iter().map(|f| field_tree(f, next)).collect();
    children.extend(class.methods.iter().map(|m| method_tree(m, next)));
    TreeNode::with_attrs("ClassDecl", vec![("name", class.name.clone()), ("extends", opt_type_name(&class.extends))]).children(children)
}

/// Builds the root record for a whole program: every class declaration
/// followed by every free-standing top-level statement, in source order.
pub fn program_tree(program: &Program) -> TreeNode {
    let mut children: Vec<TreeNode> = program.classes.iter().map(|c| class_tree(c, 1)).collect();
    children.extend(program.statements.iter().map(|s| stmt_tree(s, 1)));
    TreeNode::tagged("Program", children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::FieldDecl;

    #[test]
    fn expr_tree_binop_carries_operator_and_both_operands() {
        let tree = expr_tree(
            &Expr::Binary { op: crate::expr::BinaryOp::Add, left: Box::new(Expr::IntLit(1)), right: Box::new(Expr::IntLit(2)) },
            1,
        );
        assert_eq!(tree.ty, "BinOp");
        assert_eq!(tree.attrs, vec![("operator".to_string(), "+".to_string())]);
        assert_eq!(tree.children.len(), 2);
    }

    #[test]
    fn catch_all_variant_has_type_tag_and_no_children() {
        let tree = expr_tree(&Expr::This, 1);
        assert_eq!(tree.ty, "This");
        assert!(tree.attrs.is_empty());
        assert!(tree.children.is_empty());
    }

    #[test]
    fn depth_limit_truncates_instead_of_recursing_forever() {
        let mut expr = Expr::IntLit(0);
        for _ in 0..(MAX_DEPTH + 5) {
            expr = Expr::Binary { op: crate::expr::BinaryOp::Add, left: Box::new(expr), right: Box::new(Expr::IntLit(1)) };
        }
        let tree = expr_tree(&expr, 1);
        fn contains_truncated(node: &TreeNode) -> bool {
            node.ty == "Truncated" || node.children.iter().any(contains_truncated)
        }
        assert!(contains_truncated(&tree));
    }

    #[test]
    fn program_tree_orders_classes_before_top_level_statements() {
        let class = ClassDecl {
            modifiers: Vec::new(),
            name: "Foo".to_string(),
            extends: None,
            fields: vec![FieldDecl { modifiers: Vec::new(), field_type: "int".to_string(), name: "x".to_string(), init: None }],
            constructors: Vec::new(),
            methods: Vec::new(),
        };
        let program = Program { classes: vec![class], statements: vec![Stmt::ExprStmt(Expr::IntLit(1))] };
        let tree = program_tree(&program);
        assert_eq!(tree.ty, "Program");
        assert_eq!(tree.children.len(), 2);
        assert_eq!(tree.children[0].ty, "ClassDecl");
        assert_eq!(tree.children[1].ty, "ExprStmt");
    }

    #[test]
    fn error_record_carries_message_and_no_children() {
        let node = TreeNode::error("boom");
        assert_eq!(node.ty, "Error");
        assert_eq!(node.attrs, vec![("message".to_string(), "boom".to_string())]);
        assert!(node.children.is_empty());
    }
}
