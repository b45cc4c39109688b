//! Parsed values and the constructed record.
//!
//! `Value` is the dynamic value a flag parses to; `Record` is the ordered
//! field → value mapping a successful parse constructs. Both serialize to
//! JSON (the absence marker becomes `null`, enum members their name), so a
//! record can be dumped with `serde_json` directly.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use serde::Deserialize;

use crate::error::ConstructError;

// ————————————————————————————————————————————————————————————————————————————
// VALUES
// ————————————————————————————————————————————————————————————————————————————

/// A value held by one record field after parsing and conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absence marker: the field intentionally has no value.
    Absent,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Path(PathBuf),
    /// An enumeration member, identified by name.
    Member { enum_name: String, member: String },
    /// Variable-length sequence (zero-or-more arity).
    Seq(Vec<Value>),
    /// Fixed-arity sequence (exactly-N or one-or-more arity).
    Tuple(Vec<Value>),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    /// Human name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Path(_) => "path",
            Value::Member { .. } => "enum member",
            Value::Seq(_) => "sequence",
            Value::Tuple(_) => "tuple",
        }
    }

    /// Render as a single command-line token, when the value is scalar.
    /// Enum members render as their name.
    pub(crate) fn token(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::Path(p) => Some(p.display().to_string()),
            Value::Member { member, .. } => Some(member.clone()),
            Value::Absent | Value::Seq(_) | Value::Tuple(_) => None,
        }
    }

    pub(crate) fn items(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<PathBuf> for Value {
    fn from(v: PathBuf) -> Self {
        Value::Path(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Seq(v)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Absent => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Path(p) => p.serialize(serializer),
            Value::Member { member, .. } => serializer.serialize_str(member),
            Value::Seq(items) | Value::Tuple(items) => serializer.collect_seq(items),
        }
    }
}

/// Deserializes from the JSON-ish scalar model: `null` is the absence
/// marker, strings stay strings (a schema knows whether a string default
/// names an enum member or a path). Tuples and members cannot be told apart
/// from their serialized form and come back as `Seq`/`Str`.
impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ValueVisitor;

        impl<'de> Visitor<'de> for ValueVisitor {
            type Value = Value;

            fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str("null, bool, number, string, or array")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Absent)
            }

            fn visit_none<E: de::Error>(self) -> Result<Value, E> {
                Ok(Value::Absent)
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
                Ok(Value::Bool(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
                Ok(Value::Int(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
                i64::try_from(v)
                    .map(Value::Int)
                    .or(Ok(Value::Float(v as f64)))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
                Ok(Value::Float(v))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
                Ok(Value::Str(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
                Ok(Value::Str(v))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
                let mut items = Vec::new();
                while let Some(item) = seq.next_element()? {
                    items.push(item);
                }
                Ok(Value::Seq(items))
            }
        }

        deserializer.deserialize_any(ValueVisitor)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RECORD
// ————————————————————————————————————————————————————————————————————————————

/// The constructed output of one parse invocation: every schema field mapped
/// to its final value, in declaration order.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, Value>,
}

impl Record {
    pub(crate) fn new() -> Self {
        Record { fields: IndexMap::new() }
    }

    pub(crate) fn insert(&mut self, name: String, value: Value) {
        self.fields.insert(name, value);
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Present value for `name`, distinguishing "field unknown" from
    /// "field intentionally absent".
    fn fetch(&self, name: &str) -> Result<Option<&Value>, ConstructError> {
        match self.fields.get(name) {
            None => Err(ConstructError::MissingField { field: name.into() }),
            Some(Value::Absent) => Ok(None),
            Some(v) => Ok(Some(v)),
        }
    }

    /// Like [`Record::fetch`], but the absence marker counts as missing.
    fn present(&self, name: &str) -> Result<&Value, ConstructError> {
        self.fetch(name)?
            .ok_or_else(|| ConstructError::MissingField { field: name.into() })
    }

    // Typed accessors. The `opt_` forms map the absence marker to `None`;
    // the plain forms treat absence as a missing field.

    pub fn opt_int(&self, name: &str) -> Result<Option<i64>, ConstructError> {
        match self.fetch(name)? {
            None => Ok(None),
            Some(Value::Int(i)) => Ok(Some(*i)),
            Some(v) => Err(mismatch(name, "int", v)),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, ConstructError> {
        let v = self.present(name)?;
        match v {
            Value::Int(i) => Ok(*i),
            other => Err(mismatch(name, "int", other)),
        }
    }

    pub fn opt_float(&self, name: &str) -> Result<Option<f64>, ConstructError> {
        match self.fetch(name)? {
            None => Ok(None),
            Some(Value::Float(f)) => Ok(Some(*f)),
            Some(v) => Err(mismatch(name, "float", v)),
        }
    }

    pub fn float(&self, name: &str) -> Result<f64, ConstructError> {
        let v = self.present(name)?;
        match v {
            Value::Float(f) => Ok(*f),
            other => Err(mismatch(name, "float", other)),
        }
    }

    pub fn opt_boolean(&self, name: &str) -> Result<Option<bool>, ConstructError> {
        match self.fetch(name)? {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(v) => Err(mismatch(name, "bool", v)),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ConstructError> {
        let v = self.present(name)?;
        match v {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch(name, "bool", other)),
        }
    }

    pub fn opt_str(&self, name: &str) -> Result<Option<&str>, ConstructError> {
        match self.fetch(name)? {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.as_str())),
            Some(v) => Err(mismatch(name, "str", v)),
        }
    }

    pub fn str_(&self, name: &str) -> Result<&str, ConstructError> {
        let v = self.present(name)?;
        match v {
            Value::Str(s) => Ok(s.as_str()),
            other => Err(mismatch(name, "str", other)),
        }
    }

    pub fn opt_path(&self, name: &str) -> Result<Option<&Path>, ConstructError> {
        match self.fetch(name)? {
            None => Ok(None),
            Some(Value::Path(p)) => Ok(Some(p.as_path())),
            Some(v) => Err(mismatch(name, "path", v)),
        }
    }

    pub fn path(&self, name: &str) -> Result<&Path, ConstructError> {
        let v = self.present(name)?;
        match v {
            Value::Path(p) => Ok(p.as_path()),
            other => Err(mismatch(name, "path", other)),
        }
    }

    /// Member name of an enum-typed field.
    pub fn opt_member(&self, name: &str) -> Result<Option<&str>, ConstructError> {
        match self.fetch(name)? {
            None => Ok(None),
            Some(Value::Member { member, .. }) => Ok(Some(member.as_str())),
            Some(v) => Err(mismatch(name, "enum member", v)),
        }
    }

    pub fn member(&self, name: &str) -> Result<&str, ConstructError> {
        let v = self.present(name)?;
        match v {
            Value::Member { member, .. } => Ok(member.as_str()),
            other => Err(mismatch(name, "enum member", other)),
        }
    }

    /// Elements of a sequence- or tuple-valued field.
    pub fn opt_seq(&self, name: &str) -> Result<Option<&[Value]>, ConstructError> {
        match self.fetch(name)? {
            None => Ok(None),
            Some(v) => v
                .items()
                .map(Some)
                .ok_or_else(|| mismatch(name, "sequence", v)),
        }
    }

    pub fn seq(&self, name: &str) -> Result<&[Value], ConstructError> {
        let v = self.present(name)?;
        v.items().ok_or_else(|| mismatch(name, "sequence", v))
    }
}

fn mismatch(field: &str, expected: &str, found: &Value) -> ConstructError {
    ConstructError::TypeMismatch {
        field: field.into(),
        expected: expected.into(),
        found: found.kind_name().into(),
    }
}

/// Builds a caller-owned value from a freshly constructed [`Record`].
/// Construction failures propagate out of the parse unmodified.
pub trait FromRecord: Sized {
    fn from_record(record: &Record) -> Result<Self, ConstructError>;
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        let mut r = Record::new();
        r.insert("a".into(), Value::Int(2));
        r.insert("b".into(), Value::Float(3.2));
        r.insert("c".into(), Value::Bool(true));
        r.insert("d".into(), Value::Absent);
        r.insert(
            "e".into(),
            Value::Member { enum_name: "bird".into(), member: "lark".into() },
        );
        r.insert("xs".into(), Value::Tuple(vec![Value::Int(1), Value::Int(2)]));
        r
    }

    #[test]
    fn typed_accessors() {
        let r = sample();
        assert_eq!(r.int("a").unwrap(), 2);
        assert_eq!(r.float("b").unwrap(), 3.2);
        assert!(r.boolean("c").unwrap());
        assert_eq!(r.opt_int("d").unwrap(), None);
        assert_eq!(r.member("e").unwrap(), "lark");
        assert_eq!(r.seq("xs").unwrap().len(), 2);
    }

    #[test]
    fn absent_required_accessor_is_missing_field() {
        let r = sample();
        let err = r.int("d").unwrap_err();
        assert!(matches!(err, ConstructError::MissingField { .. }));
    }

    #[test]
    fn unknown_field_is_missing_field() {
        let r = sample();
        assert!(matches!(
            r.int("nope").unwrap_err(),
            ConstructError::MissingField { .. }
        ));
    }

    #[test]
    fn mismatched_accessor_reports_kinds() {
        let r = sample();
        let err = r.str_("a").unwrap_err().to_string();
        assert!(err.contains("expected str, found int"));
    }

    #[test]
    fn record_serializes_in_declaration_order() {
        let r = sample();
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.starts_with(r#"{"a":2"#));
        assert!(json.contains(r#""d":null"#));
        assert!(json.contains(r#""e":"lark""#));
        assert!(json.contains(r#""xs":[1,2]"#));
    }

    #[test]
    fn value_deserializes_from_json_scalars() {
        let v: Value = serde_json::from_str("null").unwrap();
        assert_eq!(v, Value::Absent);
        let v: Value = serde_json::from_str("1.5").unwrap();
        assert_eq!(v, Value::Float(1.5));
        let v: Value = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(v, Value::Seq(vec![Value::Int(1), Value::Int(2)]));
    }
}
