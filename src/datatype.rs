// used for persistence
use rusqlite::types::{Null, ToSql, ToSqlOutput, ValueRef};

// used for the schema and command line surfaces
use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::{Serialize, Serializer};

// used when parsing a type token from a schema
use std::str::FromStr;
// used to print out readable forms of a value
use std::fmt;

use crate::error::{OrmError, Result};

// ------------- Type Tags -------------
/// The closed set of column types a schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Text,
    Integer,
    Boolean,
    Real,
}

impl TypeTag {
    pub const ALL: [TypeTag; 4] = [
        TypeTag::Text,
        TypeTag::Integer,
        TypeTag::Boolean,
        TypeTag::Real,
    ];

    /// Canonical token, as accepted by `from_str`.
    pub fn token(&self) -> &'static str {
        match self {
            TypeTag::Text => "text",
            TypeTag::Integer => "integer",
            TypeTag::Boolean => "boolean",
            TypeTag::Real => "real",
        }
    }

    /// Declared column type used when creating the backing table.
    /// BOOLEAN gets numeric affinity, so 0/1 are stored as integers.
    pub fn sql_type(&self) -> &'static str {
        match self {
            TypeTag::Text => "TEXT",
            TypeTag::Integer => "INTEGER",
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::Real => "REAL",
        }
    }

    /// Validates a value supplied by the caller for `column`.
    /// Null is the absent marker and passes for every tag.
    pub fn coerce(&self, column: &str, value: Value) -> Result<Value> {
        match (self, value) {
            (_, Value::Null) => Ok(Value::Null),
            (TypeTag::Text, value @ Value::Text(_)) => Ok(value),
            (TypeTag::Integer, value @ Value::Integer(_)) => Ok(value),
            (TypeTag::Boolean, value @ Value::Boolean(_)) => Ok(value),
            // SQLite stores NaN as NULL, so it could never be read back
            (TypeTag::Real, Value::Real(r)) if r.is_nan() => Err(self.mismatch(column, "nan")),
            (TypeTag::Real, value @ Value::Real(_)) => Ok(value),
            // integers are widened, never the other way around
            (TypeTag::Real, Value::Integer(i)) => Ok(Value::Real(i as f64)),
            (_, value) => Err(self.mismatch(column, value.kind())),
        }
    }

    /// Converts what SQLite handed back for `column` into a value of this type.
    pub fn hydrate(&self, column: &str, value: ValueRef<'_>) -> Result<Value> {
        match (self, value) {
            (_, ValueRef::Null) => Ok(Value::Null),
            (TypeTag::Text, ValueRef::Text(bytes)) => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(Value::Text(text.to_string())),
                Err(_) => Err(self.mismatch(column, "invalid utf-8 text")),
            },
            (TypeTag::Integer, ValueRef::Integer(i)) => Ok(Value::Integer(i)),
            (TypeTag::Boolean, ValueRef::Integer(0)) => Ok(Value::Boolean(false)),
            (TypeTag::Boolean, ValueRef::Integer(1)) => Ok(Value::Boolean(true)),
            (TypeTag::Real, ValueRef::Integer(i)) => Ok(Value::Real(i as f64)),
            (TypeTag::Real, ValueRef::Real(r)) => Ok(Value::Real(r)),
            (_, other) => Err(self.mismatch(column, sql_kind(&other))),
        }
    }

    fn mismatch(&self, column: &str, found: &'static str) -> OrmError {
        OrmError::Type {
            column: column.to_string(),
            expected: *self,
            found,
        }
    }
}

fn sql_kind(value: &ValueRef<'_>) -> &'static str {
    match value {
        ValueRef::Null => "null",
        ValueRef::Integer(_) => "integer",
        ValueRef::Real(_) => "real",
        ValueRef::Text(_) => "text",
        ValueRef::Blob(_) => "blob",
    }
}

impl FromStr for TypeTag {
    type Err = OrmError;
    fn from_str(token: &str) -> Result<Self> {
        match token.to_ascii_lowercase().as_str() {
            "text" | "str" => Ok(TypeTag::Text),
            "int" | "integer" => Ok(TypeTag::Integer),
            "bool" | "boolean" => Ok(TypeTag::Boolean),
            "real" | "float" => Ok(TypeTag::Real),
            _ => Err(OrmError::Schema(format!(
                "unknown column type '{}', expected one of text, integer, boolean, real",
                token
            ))),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

// ------------- Values -------------
/// A column value. `Null` doubles as the marker for "not set".
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Text(String),
    Integer(i64),
    Boolean(bool),
    Real(f64),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Text(_) => "text",
            Value::Integer(_) => "integer",
            Value::Boolean(_) => "boolean",
            Value::Real(_) => "real",
        }
    }
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}
impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}
impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}
impl From<f64> for Value {
    fn from(r: f64) -> Self {
        Value::Real(r)
    }
}
impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::from(Null),
            Value::Text(text) => ToSqlOutput::from(text.as_str()),
            Value::Integer(i) => ToSqlOutput::from(*i),
            Value::Boolean(b) => ToSqlOutput::from(i64::from(*b)),
            Value::Real(r) => ToSqlOutput::from(*r),
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(text) => write!(f, "{:?}", text),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Real(r) => write!(f, "{}", r),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Text(text) => serializer.serialize_str(text),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Real(r) => serializer.serialize_f64(*r),
        }
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "a string, integer, boolean, real number or null")
    }
    fn visit_bool<E: de::Error>(self, b: bool) -> std::result::Result<Value, E> {
        Ok(Value::Boolean(b))
    }
    fn visit_i64<E: de::Error>(self, i: i64) -> std::result::Result<Value, E> {
        Ok(Value::Integer(i))
    }
    fn visit_u64<E: de::Error>(self, u: u64) -> std::result::Result<Value, E> {
        i64::try_from(u)
            .map(Value::Integer)
            .map_err(|_| E::custom(format!("integer {} does not fit in 64 signed bits", u)))
    }
    fn visit_f64<E: de::Error>(self, r: f64) -> std::result::Result<Value, E> {
        Ok(Value::Real(r))
    }
    fn visit_str<E: de::Error>(self, text: &str) -> std::result::Result<Value, E> {
        Ok(Value::Text(text.to_string()))
    }
    fn visit_string<E: de::Error>(self, text: String) -> std::result::Result<Value, E> {
        Ok(Value::Text(text))
    }
    fn visit_unit<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }
    fn visit_none<E: de::Error>(self) -> std::result::Result<Value, E> {
        Ok(Value::Null)
    }
    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}
