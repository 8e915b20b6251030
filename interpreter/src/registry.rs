//! The class registry and static method table (spec.md §3 "Class registry").

use std::collections::HashMap;

use coffee_ast::decl::{ClassDecl, MethodDecl};
use coffee_ast::program::Program;

/// Process-lifetime (well, evaluator-lifetime) mapping from class name to
/// declaration, plus the parallel static-method table used to resolve
/// unqualified calls. Populated once before execution and read-only
/// thereafter (spec.md §5 "Shared resources").
pub struct ClassRegistry {
    classes: HashMap<String, ClassDecl>,
    static_methods: HashMap<String, MethodDecl>,
}

impl ClassRegistry {
    pub fn build(program: &Program) -> Self {
        let mut classes = HashMap::new();
        let mut static_methods = HashMap::new();
        for class in &program.classes {
            for method in &class.methods {
                if method.is_static() {
                    // Last one wins on a name collision across classes; the
                    // source language has no namespacing for unqualified
                    // static calls (spec.md §3 "Static method table").
                    static_methods.insert(method.name.clone(), method.clone());
                }
            }
            classes.insert(class.name.clone(), class.clone());
        }
        Self { classes, static_methods }
    }

    pub fn get_class(&self, name: &str) -> Option<&ClassDecl> {
        self.classes.get(name)
    }

    pub fn get_static_method(&self, name: &str) -> Option<&MethodDecl> {
        self.static_methods.get(name)
    }

    /// Finds a `static` method named `main` in any class, in source order.
    /// Used to decide the execution entry point (spec.md §4.4 "Execution
    /// entry").
    pub fn find_main(program: &Program) -> Option<&MethodDecl> {
        for class in &program.classes {
            if let Some(method) = class.methods.iter().find(|m| m.is_static() && m.name == "main") {
                return Some(method);
            }
        }
        None
    }
}
