//! Schema declaration: the record description a caller hands us.
//!
//! A schema is plain data. It can be built with the fluent methods here or
//! deserialized from JSON, and either way it is inert until one of the parse
//! entry points (in the assembler) turns it into a command and runs tokens
//! through it.

use serde::{Deserialize, Serialize};

use crate::docs::{DocMap, DocSource};
use crate::error::SchemaError;
use crate::record::Value;
use crate::ty::{EnumSpec, TypeExpr};

/// A field's type, spelled either as text (`"list[int] | none"`) or as a
/// structured [`TypeExpr`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TypeSpec {
    Text(String),
    Expr(TypeExpr),
}

impl From<&str> for TypeSpec {
    fn from(src: &str) -> Self {
        TypeSpec::Text(src.to_owned())
    }
}

impl From<TypeExpr> for TypeSpec {
    fn from(expr: TypeExpr) -> Self {
        TypeSpec::Expr(expr)
    }
}

/// One declared field of the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub spec: TypeSpec,
    /// Default applied when the flag is absent. Also makes the flag
    /// optional on the command line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

impl Field {
    pub fn new(name: impl Into<String>, spec: impl Into<TypeSpec>) -> Self {
        Field {
            name: name.into(),
            spec: spec.into(),
            default: None,
            help: None,
        }
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }
}

/// The record description: a name, the fields in declaration order, the
/// enumerations the text grammar may refer to, and optional external docs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "DocMap::is_empty")]
    pub docs: DocMap,
}

impl Schema {
    pub fn new(name: impl Into<String>) -> Self {
        Schema {
            name: name.into(),
            about: None,
            enums: Vec::new(),
            fields: Vec::new(),
            docs: DocMap::new(),
        }
    }

    pub fn about(mut self, text: impl Into<String>) -> Self {
        self.about = Some(text.into());
        self
    }

    /// Register an enumeration; text types may then name it.
    pub fn enum_def(mut self, spec: EnumSpec) -> Self {
        self.enums.push(spec);
        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Attach a doc table. Field-level `help` wins over these entries.
    pub fn docs(mut self, docs: DocMap) -> Self {
        self.docs = docs;
        self
    }

    /// Copy help text out of any [`DocSource`] for the fields declared so
    /// far.
    pub fn docs_from(mut self, source: &dyn DocSource) -> Self {
        for field in &self.fields {
            if let Some(text) = source.doc(&field.name) {
                self.docs.insert(field.name.clone(), text);
            }
        }
        self
    }

    /// Read a schema declared as JSON.
    pub fn from_json(src: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(src).map_err(|e| SchemaError::TypeSyntax {
            field: String::new(),
            detail: e.to_string(),
        })
    }
}
