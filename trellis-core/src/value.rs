//! Trait Values
//!
//! A [`Value`] is the result of evaluating one trait. The set of kinds is
//! closed: integer, float, string and boolean. Every evaluation produces a
//! fresh value; values are never mutated in place.
//!
//! [`TraitValue`] maps the four Rust types onto their [`ValueKind`] so that
//! typed accessors (`get_trait::<f32>`) and typed sinks can check tags
//! without any dynamic casting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TraitError};

/// The tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Int,
    Float,
    String,
    Bool,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::String => "string",
            ValueKind::Bool => "bool",
        };
        f.write_str(name)
    }
}

/// A computed trait value.
///
/// Literals deserialize untagged: `true`, `3`, `0.5` and `"text"` map to
/// `Bool`, `Int`, `Float` and `String` respectively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
}

impl Value {
    /// The zero value of a kind. Registers start out holding this.
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Int => Value::Int(0),
            ValueKind::Float => Value::Float(0.0),
            ValueKind::String => Value::String(String::new()),
            ValueKind::Bool => Value::Bool(false),
        }
    }

    /// Get the tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
            Value::Bool(_) => ValueKind::Bool,
        }
    }

    /// Truthiness used by logic operators and gates.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::String(v) => !v.is_empty(),
            Value::Bool(v) => *v,
        }
    }

    /// Convert into the given kind.
    ///
    /// Floats truncate toward zero when narrowed to integers. Strings are
    /// parsed; a string that does not parse is a [`TraitError::Conversion`].
    pub fn coerce(self, kind: ValueKind) -> Result<Value> {
        if self.kind() == kind {
            return Ok(self);
        }
        let converted = match (&self, kind) {
            (Value::Int(v), ValueKind::Float) => Some(Value::Float(*v as f32)),
            (Value::Int(v), ValueKind::Bool) => Some(Value::Bool(*v != 0)),
            (Value::Float(v), ValueKind::Int) => Some(Value::Int(*v as i32)),
            (Value::Float(v), ValueKind::Bool) => Some(Value::Bool(*v != 0.0)),
            (Value::Bool(v), ValueKind::Int) => Some(Value::Int(i32::from(*v))),
            (Value::Bool(v), ValueKind::Float) => Some(Value::Float(f32::from(u8::from(*v)))),
            (Value::String(s), ValueKind::Int) => parse_int(s).map(Value::Int),
            (Value::String(s), ValueKind::Float) => s.trim().parse().ok().map(Value::Float),
            (Value::String(s), ValueKind::Bool) => s.trim().parse().ok().map(Value::Bool),
            (_, ValueKind::String) => Some(Value::String(self.to_string())),
            _ => None,
        };
        converted.ok_or(TraitError::Conversion { value: self, to: kind })
    }
}

/// Integer strings may carry a fractional part, which is truncated.
fn parse_int(text: &str) -> Option<i32> {
    let text = text.trim();
    text.parse::<i32>()
        .ok()
        .or_else(|| text.parse::<f32>().ok().map(|v| v as i32))
}

/// Stringification used for string coercion and switch keys.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// A Rust type that corresponds to exactly one [`ValueKind`].
pub trait TraitValue: Sized + 'static {
    /// The tag values of this type carry.
    const KIND: ValueKind;

    /// Extract from a value with a matching tag. No coercion is applied.
    fn from_value(value: &Value) -> Option<Self>;

    /// Wrap into a value.
    fn into_value(self) -> Value;
}

impl TraitValue for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Int(self)
    }
}

impl TraitValue for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl TraitValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl TraitValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}
