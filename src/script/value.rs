use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::script::ast::FunctionDef;
use crate::script::environment::ScopeId;
use crate::script::error::ScriptError;
use crate::script::interpreter::Interpreter;

/// Nesting depth after which arrays and objects render as `[...]`.
/// Bounds recursion on self-referencing containers.
const MAX_RENDER_DEPTH: usize = 16;

pub type NativeFn = fn(&mut Interpreter, &Value, Vec<Value>) -> Result<Value, ScriptError>;

/// A host-provided function, optionally bound to the receiver it was read from
/// (`[1, 2].push` keeps the array as its receiver).
pub struct Native {
    pub name: &'static str,
    pub receiver: Value,
    pub func: NativeFn,
}

impl fmt::Debug for Native {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Native({})", self.name)
    }
}

/// A script function together with the scope it closed over.
#[derive(Debug)]
pub struct Closure {
    pub def: Rc<FunctionDef>,
    pub scope: ScopeId,
}

pub type ArrayRef = Rc<RefCell<Vec<Value>>>;
pub type ObjectRef = Rc<RefCell<Vec<(String, Value)>>>;

/// A runtime value produced by evaluating an expression.
#[derive(Debug, Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(ArrayRef),
    /// Insertion-ordered properties.
    Object(ObjectRef),
    Function(Rc<Closure>),
    Native(Rc<Native>),
}

impl Value {
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn object(properties: Vec<(String, Value)>) -> Self {
        Value::Object(Rc::new(RefCell::new(properties)))
    }

    pub fn native(name: &'static str, func: NativeFn) -> Self {
        Self::bound_native(name, Value::Undefined, func)
    }

    pub fn bound_native(name: &'static str, receiver: Value, func: NativeFn) -> Self {
        Value::Native(Rc::new(Native {
            name,
            receiver,
            func,
        }))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Function(_) | Value::Native(_))
    }

    pub fn type_of(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Array(_) | Value::Object(_) => "object",
            Value::Function(_) | Value::Native(_) => "function",
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            Value::Number(n) => *n,
            Value::Str(s) => string_to_number(s),
            Value::Array(_) => string_to_number(&self.to_display()),
            Value::Object(_) | Value::Function(_) | Value::Native(_) => f64::NAN,
        }
    }

    /// The host's `String(value)` conversion.
    pub fn to_display(&self) -> String {
        self.display_at(0)
    }

    fn display_at(&self, depth: usize) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => {
                if depth >= MAX_RENDER_DEPTH {
                    return String::new();
                }
                items
                    .borrow()
                    .iter()
                    .map(|item| {
                        if item.is_nullish() {
                            String::new()
                        } else {
                            item.display_at(depth + 1)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(",")
            }
            Value::Object(_) => "[object Object]".to_string(),
            Value::Function(closure) => format!(
                "function {}() {{ [code] }}",
                closure.def.name.as_deref().unwrap_or("")
            ),
            Value::Native(native) => format!("function {}() {{ [native code] }}", native.name),
        }
    }

    /// Text recorded for one argument of a captured print call: strings
    /// verbatim, containers in their JSON shape with the quotes stripped.
    pub fn to_captured(&self) -> String {
        match self {
            Value::Array(_) | Value::Object(_) => self.json_at(0, true).replace('"', ""),
            other => other.to_display(),
        }
    }

    /// `JSON.stringify` rendering; `None` for values JSON cannot represent.
    pub fn to_json(&self) -> Result<Option<String>, ScriptError> {
        if matches!(
            self,
            Value::Undefined | Value::Function(_) | Value::Native(_)
        ) {
            return Ok(None);
        }
        if self.nesting_exceeds(MAX_RENDER_DEPTH) {
            return Err(ScriptError::type_error(
                "Converting circular structure to JSON",
            ));
        }
        Ok(Some(self.json_at(0, false)))
    }

    fn nesting_exceeds(&self, remaining: usize) -> bool {
        if remaining == 0 {
            return matches!(self, Value::Array(_) | Value::Object(_));
        }
        match self {
            Value::Array(items) => items.borrow().iter().any(|v| v.nesting_exceeds(remaining - 1)),
            Value::Object(props) => props
                .borrow()
                .iter()
                .any(|(_, v)| v.nesting_exceeds(remaining - 1)),
            _ => false,
        }
    }

    fn json_at(&self, depth: usize, lenient: bool) -> String {
        match self {
            Value::Null | Value::Undefined | Value::Function(_) | Value::Native(_) => {
                "null".to_string()
            }
            Value::Bool(b) => b.to_string(),
            Value::Number(n) if n.is_finite() => format_number(*n),
            Value::Number(_) => "null".to_string(),
            Value::Str(s) => serde_json::to_string(s).unwrap_or_else(|_| format!("\"{}\"", s)),
            Value::Array(_) | Value::Object(_) if depth >= MAX_RENDER_DEPTH && lenient => {
                "[...]".to_string()
            }
            Value::Array(items) => {
                let inner: Vec<String> = items
                    .borrow()
                    .iter()
                    .map(|v| v.json_at(depth + 1, lenient))
                    .collect();
                format!("[{}]", inner.join(","))
            }
            Value::Object(props) => {
                let inner: Vec<String> = props
                    .borrow()
                    .iter()
                    .filter(|(_, v)| !matches!(v, Value::Undefined | Value::Function(_) | Value::Native(_)))
                    .map(|(k, v)| {
                        let key = serde_json::to_string(k).unwrap_or_else(|_| format!("\"{}\"", k));
                        format!("{}:{}", key, v.json_at(depth + 1, lenient))
                    })
                    .collect();
                format!("{{{}}}", inner.join(","))
            }
        }
    }

    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() && b.is_nullish() => true,
            (a, b) if a.is_nullish() || b.is_nullish() => false,
            (Value::Number(_), Value::Str(_))
            | (Value::Str(_), Value::Number(_))
            | (Value::Bool(_), _)
            | (_, Value::Bool(_)) => self.to_number() == other.to_number(),
            (Value::Array(_) | Value::Object(_), Value::Str(_) | Value::Number(_)) => {
                Value::Str(self.to_display()).loose_equals(other)
            }
            (Value::Str(_) | Value::Number(_), Value::Array(_) | Value::Object(_)) => {
                self.loose_equals(&Value::Str(other.to_display()))
            }
            _ => self.strict_equals(other),
        }
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => f64::INFINITY,
        "-Infinity" => f64::NEG_INFINITY,
        _ if trimmed.starts_with("0x") || trimmed.starts_with("0X") => {
            i64::from_str_radix(&trimmed[2..], 16)
                .map(|n| n as f64)
                .unwrap_or(f64::NAN)
        }
        _ if trimmed.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') => f64::NAN,
        _ => trimmed.parse::<f64>().unwrap_or(f64::NAN),
    }
}

/// Formats a number the way the host's `Number.prototype.toString` does.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    if n.fract() == 0.0 && abs < 1e15 {
        return format!("{}", n as i64);
    }
    format!("{}", n)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(2.0), "2");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(2.5), "2.5");
    }

    #[test]
    fn test_display_of_array() {
        let v = Value::array(vec![
            Value::Number(1.0),
            Value::Null,
            Value::str("a"),
        ]);
        assert_eq!(v.to_display(), "1,,a");
    }

    #[test]
    fn test_captured_containers_strip_quotes() {
        let v = Value::array(vec![Value::Number(1.0), Value::str("a")]);
        assert_eq!(v.to_captured(), "[1,a]");
        let o = Value::object(vec![("name".to_string(), Value::str("Ann"))]);
        assert_eq!(o.to_captured(), "{name:Ann}");
    }

    #[test]
    fn test_json_keeps_quotes() {
        let o = Value::object(vec![("k".to_string(), Value::str("v"))]);
        assert_eq!(o.to_json().unwrap().as_deref(), Some(r#"{"k":"v"}"#));
        assert_eq!(Value::Undefined.to_json().unwrap(), None);
    }

    #[test]
    fn test_circular_json_is_an_error() {
        let inner = Rc::new(RefCell::new(Vec::new()));
        let v = Value::Array(inner.clone());
        inner.borrow_mut().push(v.clone());
        assert!(v.to_json().is_err());
        // Lenient rendering stops instead of recursing forever.
        assert!(v.to_captured().contains("[...]"));
        inner.borrow_mut().clear();
    }

    #[test]
    fn test_loose_equality() {
        assert!(Value::Null.loose_equals(&Value::Undefined));
        assert!(Value::Number(1.0).loose_equals(&Value::str("1")));
        assert!(Value::Bool(true).loose_equals(&Value::Number(1.0)));
        assert!(!Value::Number(1.0).strict_equals(&Value::str("1")));
    }
}
