//! Typed property values and kind validation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Errors from property lookup and validation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PropertyError {
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    #[error("invalid value for {property}: {message}")]
    InvalidValue { property: String, message: String },
}

/// One entry of a structure-list property.
pub type Structure = BTreeMap<String, Value>;

/// Length units accepted by dimension properties.
pub const DIMENSION_UNITS: &[&str] = &["in", "cm", "mm", "pt", "pc", "px", "em", "ex", "%"];

/// A measure with its unit, e.g. `10pt` or `50%`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub measure: f64,
    pub units: String,
}

impl Dimension {
    pub fn new(measure: f64, units: impl Into<String>) -> Self {
        Self {
            measure,
            units: units.into(),
        }
    }

    /// Parse `"10pt"`, `"1.5in"`, `"-2mm"` or `"50%"`.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let unit_start = text
            .char_indices()
            .find(|(i, c)| !c.is_ascii_digit() && *c != '.' && !(*c == '-' && *i == 0))
            .map(|(i, _)| i)?;
        if unit_start == 0 {
            return None;
        }
        let (number, units) = text.split_at(unit_start);
        let units = units.to_ascii_lowercase();
        if !DIMENSION_UNITS.contains(&units.as_str()) {
            return None;
        }
        Some(Self::new(number.parse().ok()?, units))
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.measure, self.units)
    }
}

/// A property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    /// One of the names declared by a choice property.
    Choice(String),
    /// Script expression text, never evaluated by the model.
    Expression(String),
    Dimension(Dimension),
    /// Lowercased color name or `#rrggbb` / `#rgb`.
    Color(String),
    StructList(Vec<Structure>),
    Bytes(Vec<u8>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Choice(s) | Value::Expression(s) | Value::Color(s) => {
                Some(s)
            }
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s:?}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Choice(s) | Value::Color(s) => f.write_str(s),
            Value::Expression(s) => write!(f, "expr({s})"),
            Value::Dimension(d) => write!(f, "{d}"),
            Value::StructList(items) => write!(f, "[{} structures]", items.len()),
            Value::Bytes(bytes) => write!(f, "<{} bytes>", bytes.len()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Dimension> for Value {
    fn from(d: Dimension) -> Self {
        Value::Dimension(d)
    }
}

/// The declared kind of a property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyKind {
    String,
    Integer,
    Float,
    Boolean,
    Choice(Vec<String>),
    Expression,
    Dimension,
    Color,
    StructList,
    Bytes,
}

impl PropertyKind {
    /// Choice kind from a list of names.
    pub fn choice(names: &[&str]) -> Self {
        PropertyKind::Choice(names.iter().map(|s| (*s).to_owned()).collect())
    }

    /// Validate `value` for a property of this kind, converting string input
    /// into the kind's canonical variant.
    pub fn normalize(&self, property: &str, value: Value) -> Result<Value, PropertyError> {
        let invalid = |message: String| PropertyError::InvalidValue {
            property: property.to_owned(),
            message,
        };

        match (self, value) {
            (PropertyKind::String, Value::String(s)) => Ok(Value::String(s)),

            (PropertyKind::Integer, Value::Integer(n)) => Ok(Value::Integer(n)),
            (PropertyKind::Integer, Value::String(s)) => s
                .trim()
                .parse()
                .map(Value::Integer)
                .map_err(|_| invalid(format!("expected integer, got {s:?}"))),

            (PropertyKind::Float, Value::Float(n)) => Ok(Value::Float(n)),
            (PropertyKind::Float, Value::Integer(n)) => Ok(Value::Float(n as f64)),
            (PropertyKind::Float, Value::String(s)) => s
                .trim()
                .parse()
                .map(Value::Float)
                .map_err(|_| invalid(format!("expected number, got {s:?}"))),

            (PropertyKind::Boolean, Value::Boolean(b)) => Ok(Value::Boolean(b)),
            (PropertyKind::Boolean, Value::String(s)) => match s.trim() {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                other => Err(invalid(format!("expected boolean, got {other:?}"))),
            },

            (PropertyKind::Choice(names), Value::String(s) | Value::Choice(s)) => {
                if names.iter().any(|n| *n == s) {
                    Ok(Value::Choice(s))
                } else {
                    Err(invalid(format!(
                        "{s:?} is not one of [{}]",
                        names.join(", ")
                    )))
                }
            }

            (PropertyKind::Expression, Value::String(s) | Value::Expression(s)) => {
                Ok(Value::Expression(s))
            }

            (PropertyKind::Dimension, Value::Dimension(d)) => {
                if DIMENSION_UNITS.contains(&d.units.as_str()) {
                    Ok(Value::Dimension(d))
                } else {
                    Err(invalid(format!("unknown unit {:?}", d.units)))
                }
            }
            (PropertyKind::Dimension, Value::String(s)) => Dimension::parse(&s)
                .map(Value::Dimension)
                .ok_or_else(|| invalid(format!("expected dimension, got {s:?}"))),

            (PropertyKind::Color, Value::String(s) | Value::Color(s)) => {
                normalize_color(&s)
                    .map(Value::Color)
                    .ok_or_else(|| invalid(format!("expected color, got {s:?}")))
            }

            (PropertyKind::StructList, Value::StructList(items)) => Ok(Value::StructList(items)),
            (PropertyKind::Bytes, Value::Bytes(bytes)) => Ok(Value::Bytes(bytes)),

            (kind, other) => Err(invalid(format!("{other:?} does not fit kind {kind:?}"))),
        }
    }
}

/// Lowercase a color name or validate a `#rgb` / `#rrggbb` hex color.
fn normalize_color(text: &str) -> Option<String> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix('#') {
        let valid = matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit());
        return valid.then(|| format!("#{}", hex.to_ascii_lowercase()));
    }
    let valid = !text.is_empty() && text.chars().all(|c| c.is_ascii_alphabetic());
    valid.then(|| text.to_ascii_lowercase())
}
