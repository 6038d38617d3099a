use std::collections::BTreeMap;
use std::fmt::{self, Display};

/// The fields of a view, by name.
pub type Fields = BTreeMap<String, Value>;

/// A value set on a [`View`](crate::View) and visible to its templates.
///
/// Values are written with their `Display` form, without any escaping.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl Value {
    /// The text of a `Text` value, `None` for anything else.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Text(s) => out.write_str(s),
            Value::Int(i) => write!(out, "{i}"),
            Value::Float(f) => write!(out, "{f}"),
            Value::Bool(b) => write!(out, "{b}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

macro_rules! int_value {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(i: $t) -> Self {
                Value::Int(i.into())
            }
        })*
    };
}

int_value!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
