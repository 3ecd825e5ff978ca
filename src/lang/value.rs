//! Dynamic values passed through koan functions

use serde::Serialize;
use std::fmt;

use super::KoanError;

/// A value a koan function can receive or return.
///
/// There is no variant for "nothing": absence is always `Option::None`, so a
/// missing argument can never be confused with a real value.
#[derive(Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
    Bool(bool),
    List(Vec<Value>),
}

/// Kind tag, including the absent case
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Absent,
    Number,
    Text,
    Bool,
    List,
}

impl ValueKind {
    /// Kind of an optional value; `None` is `Absent`
    pub fn of(value: Option<&Value>) -> Self {
        value.map(Value::kind).unwrap_or(ValueKind::Absent)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ValueKind::Absent => "absent",
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Bool => "bool",
            ValueKind::List => "list",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Number(_) => ValueKind::Number,
            Value::Text(_) => ValueKind::Text,
            Value::Bool(_) => ValueKind::Bool,
            Value::List(_) => ValueKind::List,
        }
    }

    /// The `+` operator: numbers add, and text on either side concatenates.
    pub fn add(&self, other: &Value) -> Result<Value, KoanError> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (Value::Text(_), _) | (_, Value::Text(_)) => Ok(Value::Text(format!("{self}{other}"))),
            _ => Err(KoanError::TypeMismatch {
                left: self.kind(),
                right: other.kind(),
            }),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => {
                let joined: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&joined.join(","))
            }
        }
    }
}

// Debug output ends up in failure messages, so keep it close to a literal.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::List(items) => f.debug_list().entries(items).finish(),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_add() {
        let sum = Value::from(1).add(&Value::from(2)).unwrap();
        assert_eq!(sum, Value::Number(3.0));
    }

    #[test]
    fn test_text_concatenates_with_any_side() {
        let left = Value::from("I am this!").add(&Value::from("msg")).unwrap();
        assert_eq!(left, Value::from("I am this!msg"));

        let right = Value::from(7).add(&Value::from(" rules")).unwrap();
        assert_eq!(right, Value::from("7 rules"));
    }

    #[test]
    fn test_incompatible_add_is_a_fault() {
        let err = Value::from(true).add(&Value::from(1)).unwrap_err();
        assert_eq!(
            err,
            KoanError::TypeMismatch {
                left: ValueKind::Bool,
                right: ValueKind::Number
            }
        );
    }

    #[test]
    fn test_kind_of_absent() {
        assert_eq!(ValueKind::of(None), ValueKind::Absent);
        assert_eq!(ValueKind::of(Some(&Value::from("x"))), ValueKind::Text);
    }

    #[test]
    fn test_lists_compare_by_value() {
        let a = Value::List(vec![Value::from(1), Value::from("two")]);
        let b = Value::List(vec![Value::from(1), Value::from("two")]);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "1,two");
        assert_eq!(format!("{a:?}"), "[1, \"two\"]");
    }
}
