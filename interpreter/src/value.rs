//! Runtime values (spec.md §3 "Runtime values").

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;

/// A heap-allocated object instance: a class name plus a field map.
///
/// Shared by reference; equality between two [`Value::Object`]s is pointer
/// identity on this cell, never structural (spec.md §3 "Object instance").
#[derive(Debug)]
pub struct ObjectInstance {
    pub class_name: String,
    pub fields: IndexMap<String, Value>,
}

/// A heap-allocated, fixed-length, mutable array. Shares the same
/// by-reference semantics as [`ObjectInstance`].
#[derive(Debug)]
pub struct ArrayInstance {
    pub elem_type: String,
    pub elements: Vec<Value>,
}

/// A dynamically-typed runtime value (spec.md §3, §9 "Dynamically-typed
/// runtime values").
///
/// Arrays and objects are `Rc<RefCell<_>>`: a reference-counted shared owner
/// with interior mutability, which is what spec.md §9's "Cyclic references"
/// note asks for (an object can hold an array that holds the same object).
#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    Null,
    Array(Rc<RefCell<ArrayInstance>>),
    Object(Rc<RefCell<ObjectInstance>>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Char(_) => "char",
            Value::Str(_) => "String",
            Value::Null => "null",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

/// Reference identity for arrays/objects; structural equality for everything
/// else (spec.md §3: "equality is reference identity" for instances, but
/// `==`/`!=` in the evaluator needs a generic notion for all runtime values).
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => (*a as f64) == *b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Canonical string form (spec.md GLOSSARY): integers without a decimal
/// point, floats always with one, `true`/`false`, `null`, and an
/// implementation-defined reference notation for arrays/objects.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(n) if n.fract() == 0.0 && n.is_finite() => write!(f, "{n:.1}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Null => write!(f, "null"),
            Value::Array(a) => write!(f, "{}[]@{:x}", a.borrow().elem_type, Rc::as_ptr(a) as usize),
            Value::Object(o) => write!(f, "{}@{:x}", o.borrow().class_name, Rc::as_ptr(o) as usize),
        }
    }
}

/// The zero-value for a declared type, used for uninitialized fields and
/// freshly-constructed array elements (spec.md §4.4 "Array construction":
/// "elements are zero for numeric element types, null otherwise").
pub fn default_for_type(ty: &str) -> Value {
    match ty {
        "int" => Value::Int(0),
        "float" | "double" => Value::Float(0.0),
        "boolean" => Value::Bool(false),
        "char" => Value::Char('\0'),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_canonical_form_always_has_a_decimal_point() {
        assert_eq!(Value::Float(5.0).to_string(), "5.0");
        assert_eq!(Value::Float(5.5).to_string(), "5.5");
    }

    #[test]
    fn array_identity_equality_ignores_contents() {
        let a = Rc::new(RefCell::new(ArrayInstance { elem_type: "int".into(), elements: vec![Value::Int(1)] }));
        let b = Rc::new(RefCell::new(ArrayInstance { elem_type: "int".into(), elements: vec![Value::Int(1)] }));
        assert_eq!(Value::Array(a.clone()), Value::Array(a));
        assert_ne!(Value::Array(b.clone()), Value::Array(Rc::new(RefCell::new(ArrayInstance { elem_type: "int".into(), elements: vec![Value::Int(1)] }))));
        let _ = b;
    }
}
