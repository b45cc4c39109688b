//! Assembler: schema → command → matches → record.
//!
//! The pipeline for one parse invocation:
//!
//! 1. resolve every field (text grammar, classification, help lookup),
//! 2. bind the resolved fields onto a fresh command,
//! 3. run the tokens through the primitive,
//! 4. extract each field's raw value, run its converter, and insert the
//!    result into the record in declaration order.
//!
//! Schema and construction errors always come back as `Err`. Token errors
//! depend on the entry point: the `try_` variants return them, the plain
//! variants let the primitive print its diagnostic and exit the process.

use std::collections::HashSet;
use std::ffi::OsString;

use clap::{ArgMatches, Command};

use crate::bind::{bind_field, Binding, RawKind, ResolvedField};
use crate::classify::classify;
use crate::docs::DocSource;
use crate::error::{Error, Result, SchemaError};
use crate::record::{FromRecord, Record, Value};
use crate::schema::{Schema, TypeSpec};
use crate::ty::ScalarKind;
use crate::ty::parse::parse_type;

impl Schema {
    /// Parse the process arguments, exiting with the primitive's diagnostic
    /// on bad tokens.
    pub fn parse(&self) -> Result<Record> {
        self.parse_from(std::env::args_os().skip(1))
    }

    /// Parse the process arguments, returning bad tokens as [`Error::Parse`].
    pub fn try_parse(&self) -> Result<Record> {
        self.try_parse_from(std::env::args_os().skip(1))
    }

    /// Parse the given tokens (no leading program name), exiting on bad
    /// tokens.
    pub fn parse_from<I, T>(&self, tokens: I) -> Result<Record>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let (cmd, bindings) = self.command()?;
        let matches = cmd.get_matches_from(tokens);
        finish(&matches, &bindings)
    }

    /// Parse the given tokens (no leading program name), returning bad
    /// tokens as [`Error::Parse`].
    pub fn try_parse_from<I, T>(&self, tokens: I) -> Result<Record>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let (cmd, bindings) = self.command()?;
        let matches = cmd.try_get_matches_from(tokens)?;
        finish(&matches, &bindings)
    }

    /// [`Schema::parse`], then construct `T` from the record.
    pub fn parse_into<T: FromRecord>(&self) -> Result<T> {
        let record = self.parse()?;
        Ok(T::from_record(&record)?)
    }

    /// [`Schema::try_parse_from`], then construct `T` from the record.
    pub fn try_parse_into<T, I, S>(&self, tokens: I) -> Result<T>
    where
        T: FromRecord,
        I: IntoIterator<Item = S>,
        S: Into<OsString> + Clone,
    {
        let record = self.try_parse_from(tokens)?;
        Ok(T::from_record(&record)?)
    }

    /// Build the bound command, for composing into a larger interface or
    /// rendering help.
    pub fn to_command(&self) -> Result<Command> {
        Ok(self.command()?.0)
    }

    fn command(&self) -> Result<(Command, Vec<Binding>)> {
        let mut cmd = Command::new(self.name.clone()).no_binary_name(true);
        if let Some(about) = &self.about {
            cmd = cmd.about(about.clone());
        }
        let mut bindings = Vec::with_capacity(self.fields.len());
        for field in self.resolve()? {
            let (next, binding) = bind_field(cmd, &field)?;
            cmd = next;
            bindings.push(binding);
        }
        Ok((cmd, bindings))
    }

    fn resolve(&self) -> Result<Vec<ResolvedField>> {
        let mut seen = HashSet::new();
        let mut resolved = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateFieldName { name: field.name.clone() }.into());
            }
            let ty = match &field.spec {
                TypeSpec::Text(src) => parse_type(&field.name, src, &self.enums)?,
                TypeSpec::Expr(expr) => expr.clone(),
            };
            let (shape, optional) = classify(&field.name, &ty)?;
            let help = field
                .help
                .clone()
                .or_else(|| self.docs.doc(&field.name).map(str::to_owned));
            resolved.push(ResolvedField {
                name: field.name.clone(),
                shape,
                optional,
                default: field.default.clone(),
                help,
            });
        }
        Ok(resolved)
    }
}

fn finish(matches: &ArgMatches, bindings: &[Binding]) -> Result<Record> {
    let mut record = Record::new();
    for binding in bindings {
        let raw = extract(matches, binding);
        let value = match &binding.converter {
            Some(c) => c.apply(&binding.field, raw).map_err(Error::Construct)?,
            None => raw,
        };
        record.insert(binding.field.clone(), value);
    }
    Ok(record)
}

/// Pull one field's raw value out of the matches. An untouched flag (no
/// token, no default) yields the absence marker; a many-valued flag given
/// with zero tokens yields an empty sequence.
fn extract(matches: &ArgMatches, binding: &Binding) -> Value {
    let id = binding.field.as_str();
    match &binding.raw {
        RawKind::BoolPair { no_id } => {
            if matches.get_flag(id) {
                Value::Bool(true)
            } else if matches.get_flag(no_id) {
                Value::Bool(false)
            } else {
                binding.fallback.clone().unwrap_or(Value::Absent)
            }
        }
        RawKind::Scalar(kind) => scalar_value(matches, id, *kind).unwrap_or(Value::Absent),
        RawKind::ScalarMany(kind) => {
            if !matches.contains_id(id) {
                return binding.fallback.clone().unwrap_or(Value::Absent);
            }
            Value::Seq(scalar_values(matches, id, *kind))
        }
        RawKind::Token => matches
            .get_one::<String>(id)
            .map(|s| Value::Str(s.clone()))
            .unwrap_or(Value::Absent),
        RawKind::TokenMany => {
            if !matches.contains_id(id) {
                return binding.fallback.clone().unwrap_or(Value::Absent);
            }
            let items = matches
                .get_many::<String>(id)
                .map(|vals| vals.map(|s| Value::Str(s.clone())).collect())
                .unwrap_or_default();
            Value::Seq(items)
        }
    }
}

fn scalar_value(matches: &ArgMatches, id: &str, kind: ScalarKind) -> Option<Value> {
    match kind {
        ScalarKind::Bool => matches.get_one::<bool>(id).map(|v| Value::Bool(*v)),
        ScalarKind::Int => matches.get_one::<i64>(id).map(|v| Value::Int(*v)),
        ScalarKind::Float => matches.get_one::<f64>(id).map(|v| Value::Float(*v)),
        ScalarKind::Str => matches.get_one::<String>(id).map(|v| Value::Str(v.clone())),
        ScalarKind::Path => matches
            .get_one::<std::path::PathBuf>(id)
            .map(|v| Value::Path(v.clone())),
    }
}

fn scalar_values(matches: &ArgMatches, id: &str, kind: ScalarKind) -> Vec<Value> {
    macro_rules! collect {
        ($ty:ty, $variant:expr) => {
            matches
                .get_many::<$ty>(id)
                .map(|vals| vals.cloned().map($variant).collect())
                .unwrap_or_default()
        };
    }
    match kind {
        ScalarKind::Bool => collect!(bool, Value::Bool),
        ScalarKind::Int => collect!(i64, Value::Int),
        ScalarKind::Float => collect!(f64, Value::Float),
        ScalarKind::Str => collect!(String, Value::Str),
        ScalarKind::Path => collect!(std::path::PathBuf, Value::Path),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use crate::record::Value;
    use crate::schema::{Field, Schema};

    #[test]
    fn declaration_order_is_record_order() {
        let schema = Schema::new("s")
            .field(Field::new("b", "int"))
            .field(Field::new("a", "int"));
        let record = schema.try_parse_from(["--b", "1", "--a", "2"]).unwrap();
        let names: Vec<&str> = record.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let schema = Schema::new("s")
            .field(Field::new("a", "int"))
            .field(Field::new("a", "str"));
        let err = schema.try_parse_from(["--a", "1"]).unwrap_err();
        assert_eq!(err.to_string(), "duplicate field name: a");
    }

    #[test]
    fn absent_optional_yields_the_absence_marker() {
        let schema = Schema::new("s").field(Field::new("a", "int | none"));
        let record = schema.try_parse_from(Vec::<&str>::new()).unwrap();
        assert_eq!(record.get("a"), Some(&Value::Absent));
    }

    #[test]
    fn empty_and_absent_sequences_differ() {
        let schema = Schema::new("s").field(Field::new("xs", "list[int] | none"));
        let record = schema.try_parse_from(["--xs"]).unwrap();
        assert_eq!(record.get("xs"), Some(&Value::Seq(vec![])));
        let record = schema.try_parse_from(Vec::<&str>::new()).unwrap();
        assert_eq!(record.get("xs"), Some(&Value::Absent));
    }
}
