//! Built-in dispatch tables for `Math.*` and string methods (spec.md §4.4
//! "Method dispatch", §9 "prefer a compile-time-constant table keyed by
//! method name over chained conditionals").

use coffee_errors::{Result, RuntimeError};

use crate::value::Value;

fn as_f64(v: &Value) -> Result<f64> {
    match v {
        Value::Int(n) => Ok(*n as f64),
        Value::Float(n) => Ok(*n),
        _ => Err(RuntimeError::InvalidOperand { op: "Math".into() }.into()),
    }
}

/// Dispatches a call whose receiver is the identifier `Math` (spec.md §4.4:
/// "A call with receiver named `Math`...").
pub fn math_builtin(name: &str, args: &[Value]) -> Result<Value> {
    let arity_error = || RuntimeError::NoMatchingMethod { class: "Math".into(), method: name.to_string(), arity: args.len() };
    match (name, args) {
        ("abs", [Value::Int(n)]) => Ok(Value::Int(n.abs())),
        ("abs", [Value::Float(n)]) => Ok(Value::Float(n.abs())),
        ("sqrt", [a]) => Ok(Value::Float(as_f64(a)?.sqrt())),
        ("pow", [a, b]) => Ok(Value::Float(as_f64(a)?.powf(as_f64(b)?))),
        ("sin", [a]) => Ok(Value::Float(as_f64(a)?.sin())),
        ("cos", [a]) => Ok(Value::Float(as_f64(a)?.cos())),
        ("tan", [a]) => Ok(Value::Float(as_f64(a)?.tan())),
        ("floor", [a]) => Ok(Value::Float(as_f64(a)?.floor())),
        ("ceil", [a]) => Ok(Value::Float(as_f64(a)?.ceil())),
        ("max", [Value::Int(a), Value::Int(b)]) => Ok(Value::Int(*a.max(b))),
        ("max", [a, b]) => Ok(Value::Float(as_f64(a)?.max(as_f64(b)?))),
        ("min", [Value::Int(a), Value::Int(b)]) => Ok(Value::Int(*a.min(b))),
        ("min", [a, b]) => Ok(Value::Float(as_f64(a)?.min(as_f64(b)?))),
        ("abs" | "sqrt" | "pow" | "sin" | "cos" | "tan" | "floor" | "ceil" | "max" | "min", _) => Err(arity_error().into()),
        _ => Err(RuntimeError::UndefinedFunction(format!("Math.{name}")).into()),
    }
}

/// Dispatches a call whose receiver evaluates to a string (spec.md §4.4: "A
/// call whose receiver evaluates to a string dispatches to string
/// built-ins...").
pub fn string_builtin(s: &str, name: &str, args: &[Value]) -> Result<Value> {
    let chars: Vec<char> = s.chars().collect();
    let arity_error = || RuntimeError::NoMatchingMethod { class: "String".into(), method: name.to_string(), arity: args.len() };
    match (name, args) {
        ("length", []) => Ok(Value::Int(chars.len() as i64)),
        ("substring", [Value::Int(start)]) => {
            let start = (*start).max(0) as usize;
            Ok(Value::Str(chars.get(start..).unwrap_or(&[]).iter().collect()))
        }
        ("substring", [Value::Int(start), Value::Int(end)]) => {
            let start = (*start).max(0) as usize;
            let end = (*end).max(0) as usize;
            if start > end || end > chars.len() {
                return Err(RuntimeError::IndexOutOfRange { index: end as i64, length: chars.len() }.into());
            }
            Ok(Value::Str(chars[start..end].iter().collect()))
        }
        ("toUpperCase", []) => Ok(Value::Str(s.to_uppercase())),
        ("toLowerCase", []) => Ok(Value::Str(s.to_lowercase())),
        ("charAt", [Value::Int(i)]) => chars
            .get(*i as usize)
            .map(|c| Value::Char(*c))
            .ok_or_else(|| RuntimeError::IndexOutOfRange { index: *i, length: chars.len() }.into()),
        ("indexOf", [other]) => {
            let needle = other.to_string();
            let needle_chars: Vec<char> = needle.chars().collect();
            if needle_chars.is_empty() {
                return Ok(Value::Int(0));
            }
            let found = chars.windows(needle_chars.len()).position(|w| w == needle_chars.as_slice());
            Ok(Value::Int(found.map(|i| i as i64).unwrap_or(-1)))
        }
        ("replace", [old, new]) => Ok(Value::Str(s.replace(&old.to_string(), &new.to_string()))),
        ("length" | "substring" | "toUpperCase" | "toLowerCase" | "charAt" | "indexOf" | "replace", _) => Err(arity_error().into()),
        _ => Err(RuntimeError::UndefinedFunction(format!("String.{name}")).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_abs_preserves_int_type() {
        assert!(matches!(math_builtin("abs", &[Value::Int(-5)]), Ok(Value::Int(5))));
    }

    #[test]
    fn string_index_of_returns_negative_one_when_absent() {
        assert!(matches!(string_builtin("hello", "indexOf", &[Value::Str("z".into())]), Ok(Value::Int(-1))));
    }

    #[test]
    fn string_index_of_empty_needle_returns_zero() {
        assert!(matches!(string_builtin("hello", "indexOf", &[Value::Str("".into())]), Ok(Value::Int(0))));
    }

    #[test]
    fn string_char_at_out_of_range_is_a_runtime_error() {
        assert!(string_builtin("ab", "charAt", &[Value::Int(5)]).is_err());
    }
}
