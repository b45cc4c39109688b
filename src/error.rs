//! Error taxonomy.
//!
//! Three families, matching where in the pipeline a failure can occur:
//!
//! - [`SchemaError`]: the schema itself is wrong (unsupported type shape,
//!   reserved field name, bad default). Raised at bind time, before any
//!   token is parsed, and always propagated.
//! - [`Error::Parse`]: the token list is wrong (missing required flag,
//!   invalid value, invalid choice). In raise mode these carry the
//!   primitive's own diagnostic; in exit mode the primitive prints usage
//!   and terminates the process instead.
//! - [`ConstructError`]: the converted values do not satisfy the target
//!   record's constraints. Never swallowed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Programmer errors in the schema. Detected while binding flags, before
/// any command-line token is looked at.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unsupported type for field '{field}': {detail}")]
    UnsupportedType { field: String, detail: String },

    /// A choice set mixes runtime kinds (e.g. `choice[42, "42"]`), so no
    /// single unambiguous scalar coercion exists.
    #[error("need exactly one kind of choice for field '{field}'; found {found}")]
    AmbiguousChoiceType { field: String, found: String },

    #[error("need at least one choice for field '{field}'")]
    EmptyChoices { field: String },

    #[error("only homogeneous tuples are supported for field '{field}'; found {found}")]
    HeterogeneousTuple { field: String, found: String },

    #[error("`{container}` must be subscripted for field '{field}'; use e.g. `{container}[int]`")]
    Unsubscripted { field: String, container: String },

    /// Leading underscores are reserved for internal bookkeeping ids (the
    /// negated half of a boolean pair, the pair group) and can never be
    /// exposed as a public flag.
    #[error("field names must not start with an underscore; got '{name}'")]
    ReservedFieldName { name: String },

    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    #[error("unknown enum `{name}` for field '{field}'")]
    UnknownEnum { field: String, name: String },

    #[error("invalid default for field '{field}': {detail}")]
    InvalidDefault { field: String, detail: String },

    #[error("cannot parse type of field '{field}': {detail}")]
    TypeSyntax { field: String, detail: String },
}

/// The converted values failed the record's own constraints.
#[derive(Debug, Error)]
pub enum ConstructError {
    #[error("missing value for field '{field}'")]
    MissingField { field: String },

    #[error("type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: String,
        found: String,
    },

    #[error("invalid value for field '{field}': {message}")]
    Invalid { field: String, message: String },
}

impl ConstructError {
    /// Shorthand for user validation failures inside `FromRecord` impls.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ConstructError::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Any failure a parse invocation can produce.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Raise-mode input error from the flag-parsing primitive; its display
    /// form is the usage/error message the primitive would have printed.
    #[error(transparent)]
    Parse(Box<clap::Error>),

    #[error(transparent)]
    Construct(#[from] ConstructError),
}

impl From<clap::Error> for Error {
    fn from(e: clap::Error) -> Self {
        Error::Parse(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_display() {
        let err = SchemaError::ReservedFieldName { name: "_a".into() };
        assert_eq!(
            err.to_string(),
            "field names must not start with an underscore; got '_a'"
        );
    }

    #[test]
    fn unsubscripted_error_names_the_container() {
        let err = SchemaError::Unsubscripted {
            field: "xs".into(),
            container: "list".into(),
        };
        assert!(err.to_string().contains("`list` must be subscripted"));
        assert!(err.to_string().contains("list[int]"));
    }

    #[test]
    fn construct_error_display() {
        let err = ConstructError::TypeMismatch {
            field: "a".into(),
            expected: "int".into(),
            found: "str".into(),
        };
        assert!(err.to_string().contains("expected int, found str"));
    }
}
