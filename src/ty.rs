//! Closed type-expression model for record fields.
//!
//! Every field declares exactly one `TypeExpr`. The variants form a small,
//! closed grammar: scalars, an optional wrapper, closed literal choice sets,
//! named enumerations, and homogeneous sequences with an arity. Anything the
//! grammar cannot spell is rejected by the classifier, never guessed at.
//!
//! Types can also be spelled in text form (`"int | none"`, `"list[path]"`);
//! see [`parse`] for the grammar. Text forms are resolved against the
//! schema's registered enums when a parse run starts.

pub mod parse;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

// ————————————————————————————————————————————————————————————————————————————
// SCALARS & LITERALS
// ————————————————————————————————————————————————————————————————————————————

/// Primitive value kinds a single token can coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScalarKind {
    Bool,
    Int,
    Float,
    Str,
    Path,
}

impl ScalarKind {
    /// Placeholder shown in usage text for a value of this kind.
    pub fn token_name(self) -> &'static str {
        match self {
            ScalarKind::Bool => "BOOL",
            ScalarKind::Int => "INT",
            ScalarKind::Float => "FLOAT",
            ScalarKind::Str => "STR",
            ScalarKind::Path => "PATH",
        }
    }

    pub(crate) fn from_name(name: &str) -> Option<Self> {
        match name {
            "bool" => Some(ScalarKind::Bool),
            "int" => Some(ScalarKind::Int),
            "float" => Some(ScalarKind::Float),
            "str" => Some(ScalarKind::Str),
            "path" => Some(ScalarKind::Path),
            _ => None,
        }
    }
}

/// One value in a closed choice set. Floats go through `OrderedFloat` so
/// literal sets are `Eq` and deduplicatable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    Int(i64),
    Float(OrderedFloat<f64>),
    Str(String),
}

impl Literal {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Literal::Int(_) => ScalarKind::Int,
            Literal::Float(_) => ScalarKind::Float,
            Literal::Str(_) => ScalarKind::Str,
        }
    }

    /// The command-line spelling of this literal; choices are matched and
    /// defaults rendered through this exact string.
    pub fn token(&self) -> String {
        match self {
            Literal::Int(i) => i.to_string(),
            Literal::Float(f) => f.0.to_string(),
            Literal::Str(s) => s.clone(),
        }
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(OrderedFloat(v))
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Str(v.to_owned())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Str(v)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ENUMERATIONS
// ————————————————————————————————————————————————————————————————————————————

/// A named enumeration: a finite, ordered set of member names.
///
/// The command line always works with member *names*, never member values,
/// so there is no parsing ambiguity when members carry non-string values on
/// the caller's side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumSpec {
    pub name: String,
    pub members: Vec<String>,
}

impl EnumSpec {
    pub fn new<N, I, M>(name: N, members: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        EnumSpec {
            name: name.into(),
            members: members.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m == name)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE EXPRESSIONS
// ————————————————————————————————————————————————————————————————————————————

/// How many tokens a sequence-typed flag consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Arity {
    ZeroOrMore,
    Exactly(usize),
    OneOrMore,
}

/// The declared type of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TypeExpr {
    Scalar { scalar: ScalarKind },
    /// The field may also hold the absence marker. Exactly one non-absence
    /// alternative is allowed; wider unions are not expressible here and the
    /// text grammar rejects them.
    Optional { inner: Box<TypeExpr> },
    /// Closed set of literal values, all of the same kind.
    Choice { choices: Vec<Literal> },
    Enum { spec: EnumSpec },
    /// Homogeneous sequence of a scalar/choice/enum element.
    Sequence { element: Box<TypeExpr>, arity: Arity },
}

impl TypeExpr {
    pub fn boolean() -> Self {
        TypeExpr::Scalar { scalar: ScalarKind::Bool }
    }

    pub fn int() -> Self {
        TypeExpr::Scalar { scalar: ScalarKind::Int }
    }

    pub fn float() -> Self {
        TypeExpr::Scalar { scalar: ScalarKind::Float }
    }

    pub fn string() -> Self {
        TypeExpr::Scalar { scalar: ScalarKind::Str }
    }

    pub fn path() -> Self {
        TypeExpr::Scalar { scalar: ScalarKind::Path }
    }

    pub fn choice<I, L>(choices: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<Literal>,
    {
        TypeExpr::Choice {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn enumeration(spec: EnumSpec) -> Self {
        TypeExpr::Enum { spec }
    }

    /// Variable-length sequence (`list[T]`): zero or more tokens.
    pub fn list(element: TypeExpr) -> Self {
        TypeExpr::Sequence {
            element: Box::new(element),
            arity: Arity::ZeroOrMore,
        }
    }

    /// Fixed-length sequence (`tuple[T, T]`): exactly `len` tokens.
    pub fn tuple(element: TypeExpr, len: usize) -> Self {
        TypeExpr::Sequence {
            element: Box::new(element),
            arity: Arity::Exactly(len),
        }
    }

    /// Head-plus-open-tail sequence (`tuple[T, T, ...]`): one or more tokens.
    pub fn at_least_one(element: TypeExpr) -> Self {
        TypeExpr::Sequence {
            element: Box::new(element),
            arity: Arity::OneOrMore,
        }
    }

    /// Wrap in the absence-marker union (`T | none`).
    pub fn optional(self) -> Self {
        TypeExpr::Optional { inner: Box::new(self) }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_tokens_render_like_command_line_input() {
        assert_eq!(Literal::from(42).token(), "42");
        assert_eq!(Literal::from(1.5).token(), "1.5");
        assert_eq!(Literal::from(1.0).token(), "1");
        assert_eq!(Literal::from("foo").token(), "foo");
    }

    #[test]
    fn type_expr_json_round_trip() {
        let ty = TypeExpr::list(TypeExpr::choice([1i64, 2, 3])).optional();
        let json = serde_json::to_string(&ty).unwrap();
        let parsed: TypeExpr = serde_json::from_str(&json).unwrap();
        assert_eq!(ty, parsed);
    }

    #[test]
    fn type_expr_kind_tag_is_kebab_case() {
        let json = serde_json::to_value(TypeExpr::int()).unwrap();
        assert_eq!(json["kind"], "scalar");
        assert_eq!(json["scalar"], "int");
    }

    #[test]
    fn enum_spec_member_lookup() {
        let spec = EnumSpec::new("bird", ["puffin", "lark"]);
        assert!(spec.has_member("lark"));
        assert!(!spec.has_member("emu"));
    }
}
