//! Type-driven command-line argument binding.
//!
//! Declare a record schema (field names, types, defaults, help) and get a
//! command-line interface for free: each field becomes a `--flag`, the
//! declared type picks the flag's arity, value parser, and accepted tokens,
//! and a successful parse hands back a [`Record`] of fully typed values.
//!
//! ```no_run
//! use argrecord::{Field, Schema};
//!
//! let record = Schema::new("example")
//!     .field(Field::new("a", "int").help("an integer"))
//!     .field(Field::new("b", "float").default_value(1.0))
//!     .field(Field::new("c", "bool").default_value(true))
//!     .parse()
//!     .unwrap();
//! println!("{}", serde_json::to_string(&record).unwrap());
//! ```
//!
//! The mapping, in brief:
//!
//! - `bool` fields become a `--name` / `--no-name` flag pair;
//! - `int`, `float`, `str`, `path` take one typed token;
//! - `T | none` fields may be omitted and then hold the absence marker;
//! - `choice[1, 2, 3]` and registered enum names accept only the listed
//!   tokens;
//! - `list[T]` takes zero or more tokens, `tuple[T, T]` exactly two,
//!   `tuple[T, T, ...]` one or more.
//!
//! A field is required exactly when it has no default and its type does not
//! admit absence. Schema mistakes (unknown enums, heterogeneous tuples,
//! reserved names) fail before any token is read; bad tokens are reported by
//! the underlying parser, either as an error ([`Schema::try_parse`]) or as a
//! process exit with usage ([`Schema::parse`]).

mod assemble;
mod bind;

pub mod classify;
pub mod convert;
pub mod docs;
pub mod error;
pub mod record;
pub mod schema;
pub mod ty;

pub use docs::{DocMap, DocSource};
pub use error::{ConstructError, Error, Result, SchemaError};
pub use record::{FromRecord, Record, Value};
pub use schema::{Field, Schema, TypeSpec};
pub use ty::{Arity, EnumSpec, Literal, ScalarKind, TypeExpr};
