//! Flag binder: one resolved field → one (or two) flags on the command.
//!
//! Booleans bind as a `--name` / `--no-name` pair joined by a group so the
//! two halves exclude each other; the negated half and the group use
//! underscore-prefixed internal ids, which is why leading underscores are
//! reserved in field names. Closed value sets bind with a possible-values
//! parser and are retyped afterwards by the field's converter. Sequences
//! bind as a single flag whose token count follows the declared arity.

use clap::builder::{BoolishValueParser, PossibleValuesParser, ValueParser};
use clap::{Arg, ArgAction, ArgGroup, Command};

use crate::classify::{ElementShape, Shape};
use crate::convert::{build_converter, Converter};
use crate::error::SchemaError;
use crate::record::Value;
use crate::ty::{Arity, Literal, ScalarKind};

/// A field after type resolution and classification, ready to bind.
#[derive(Debug, Clone)]
pub(crate) struct ResolvedField {
    pub name: String,
    pub shape: Shape,
    /// The declared type admits the absence marker.
    pub optional: bool,
    pub default: Option<Value>,
    pub help: Option<String>,
}

impl ResolvedField {
    /// A flag must be given iff the field has no default and its type does
    /// not admit absence.
    fn required(&self) -> bool {
        self.default.is_none() && !self.optional
    }
}

/// How to pull a field's raw value out of the match result.
#[derive(Debug, Clone)]
pub(crate) enum RawKind {
    /// Two `SetTrue` flags; `no_id` is the internal id of the negated half.
    BoolPair { no_id: String },
    /// One typed value.
    Scalar(ScalarKind),
    /// Zero or more typed values.
    ScalarMany(ScalarKind),
    /// One token from a closed set, retyped by the converter.
    Token,
    /// Zero or more tokens from a closed set.
    TokenMany,
}

/// Everything the assembler needs to turn one field's matches into a value.
#[derive(Debug, Clone)]
pub(crate) struct Binding {
    pub field: String,
    pub raw: RawKind,
    pub converter: Option<Converter>,
    /// Default applied after matching, for the defaults the primitive
    /// cannot carry itself: boolean pairs (their flags take no value) and
    /// empty sequence defaults (an empty default token list counts as no
    /// default at all).
    pub fallback: Option<Value>,
}

/// Add the flag(s) for `field` to `cmd`.
pub(crate) fn bind_field(
    cmd: Command,
    field: &ResolvedField,
) -> Result<(Command, Binding), SchemaError> {
    if field.name.starts_with('_') {
        return Err(SchemaError::ReservedFieldName { name: field.name.clone() });
    }
    match &field.shape {
        Shape::Bool => bind_bool(cmd, field),
        Shape::Scalar(kind) => bind_scalar(cmd, field, *kind),
        Shape::Choice(lits) => {
            let tokens: Vec<String> = lits.iter().map(Literal::token).collect();
            bind_closed(cmd, field, tokens)
        }
        Shape::Enum(spec) => bind_closed(cmd, field, spec.members.clone()),
        Shape::Sequence { element, arity } => bind_sequence(cmd, field, element, *arity),
    }
}

fn bind_bool(cmd: Command, field: &ResolvedField) -> Result<(Command, Binding), SchemaError> {
    let flag = flag_spelling(&field.name);
    let no_id = format!("_no_{}", field.name);

    let yes = base_arg(field).action(ArgAction::SetTrue);
    let no = Arg::new(no_id.clone())
        .long(format!("no-{flag}"))
        .action(ArgAction::SetTrue);
    let pair = ArgGroup::new(format!("_{}_pair", field.name))
        .args([field.name.clone(), no_id.clone()])
        .multiple(false)
        .required(field.required());

    let fallback = match &field.default {
        None => None,
        Some(Value::Bool(b)) => Some(Value::Bool(*b)),
        Some(other) => {
            return Err(SchemaError::InvalidDefault {
                field: field.name.clone(),
                detail: format!("expected a bool, found {}", other.kind_name()),
            });
        }
    };

    let binding = Binding {
        field: field.name.clone(),
        raw: RawKind::BoolPair { no_id },
        converter: None,
        fallback,
    };
    Ok((cmd.arg(yes).arg(no).group(pair), binding))
}

fn bind_scalar(
    cmd: Command,
    field: &ResolvedField,
    kind: ScalarKind,
) -> Result<(Command, Binding), SchemaError> {
    let mut arg = base_arg(field)
        .action(ArgAction::Set)
        .value_parser(scalar_parser(kind))
        .required(field.required());
    if let Some(default) = &field.default {
        arg = arg.default_value(scalar_default_token(field, default, kind)?);
    }
    let binding = Binding {
        field: field.name.clone(),
        raw: RawKind::Scalar(kind),
        converter: build_converter(&field.shape),
        fallback: None,
    };
    Ok((cmd.arg(arg), binding))
}

/// Choices and enumerations: the flag accepts exactly the listed tokens.
fn bind_closed(
    cmd: Command,
    field: &ResolvedField,
    tokens: Vec<String>,
) -> Result<(Command, Binding), SchemaError> {
    let mut arg = base_arg(field)
        .action(ArgAction::Set)
        .value_parser(PossibleValuesParser::new(tokens.clone()))
        .required(field.required());
    if let Some(default) = &field.default {
        arg = arg.default_value(closed_default_token(field, default, &tokens)?);
    }
    let binding = Binding {
        field: field.name.clone(),
        raw: RawKind::Token,
        converter: build_converter(&field.shape),
        fallback: None,
    };
    Ok((cmd.arg(arg), binding))
}

fn bind_sequence(
    cmd: Command,
    field: &ResolvedField,
    element: &ElementShape,
    arity: Arity,
) -> Result<(Command, Binding), SchemaError> {
    let (parser, raw): (ValueParser, RawKind) = match element {
        ElementShape::Scalar(kind) => (scalar_parser(*kind), RawKind::ScalarMany(*kind)),
        ElementShape::Choice(lits) => {
            let tokens: Vec<String> = lits.iter().map(Literal::token).collect();
            (PossibleValuesParser::new(tokens).into(), RawKind::TokenMany)
        }
        ElementShape::Enum(spec) => (
            PossibleValuesParser::new(spec.members.clone()).into(),
            RawKind::TokenMany,
        ),
    };

    let mut arg = base_arg(field)
        .action(ArgAction::Set)
        .value_parser(parser)
        .required(field.required());
    arg = match arity {
        Arity::ZeroOrMore => arg.num_args(0..),
        Arity::Exactly(n) => arg.num_args(n),
        Arity::OneOrMore => arg.num_args(1..),
    };
    let mut fallback = None;
    if let Some(default) = &field.default {
        let tokens = sequence_default_tokens(field, default, element, arity)?;
        if tokens.is_empty() {
            fallback = Some(Value::Seq(Vec::new()));
        } else {
            arg = arg.default_values(tokens);
        }
    }

    let binding = Binding {
        field: field.name.clone(),
        raw,
        converter: build_converter(&field.shape),
        fallback,
    };
    Ok((cmd.arg(arg), binding))
}

// ————————————————————————————————————————————————————————————————————————————
// HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn flag_spelling(name: &str) -> String {
    name.replace('_', "-")
}

fn base_arg(field: &ResolvedField) -> Arg {
    let mut arg = Arg::new(field.name.clone()).long(flag_spelling(&field.name));
    if let Some(help) = &field.help {
        arg = arg.help(help.clone());
    }
    arg
}

fn scalar_parser(kind: ScalarKind) -> ValueParser {
    match kind {
        ScalarKind::Bool => BoolishValueParser::new().into(),
        ScalarKind::Int => clap::value_parser!(i64).into(),
        ScalarKind::Float => clap::value_parser!(f64).into(),
        ScalarKind::Str => ValueParser::string(),
        ScalarKind::Path => ValueParser::path_buf(),
    }
}

/// Render a scalar default as the token the flag would have parsed, checking
/// the default's kind against the declared one. Ints are accepted where a
/// float is declared.
fn scalar_default_token(
    field: &ResolvedField,
    default: &Value,
    kind: ScalarKind,
) -> Result<String, SchemaError> {
    let ok = matches!(
        (kind, default),
        (ScalarKind::Bool, Value::Bool(_))
            | (ScalarKind::Int, Value::Int(_))
            | (ScalarKind::Float, Value::Float(_))
            | (ScalarKind::Float, Value::Int(_))
            | (ScalarKind::Str, Value::Str(_))
            | (ScalarKind::Path, Value::Path(_))
            | (ScalarKind::Path, Value::Str(_))
    );
    match default.token() {
        Some(token) if ok => Ok(token),
        _ => Err(SchemaError::InvalidDefault {
            field: field.name.clone(),
            detail: format!(
                "expected {}, found {}",
                kind.token_name().to_lowercase(),
                default.kind_name()
            ),
        }),
    }
}

/// Render a closed-set default, checking it is one of the accepted tokens.
/// Enum defaults are given as the member name.
fn closed_default_token(
    field: &ResolvedField,
    default: &Value,
    tokens: &[String],
) -> Result<String, SchemaError> {
    match default.token() {
        Some(token) if tokens.contains(&token) => Ok(token),
        _ => Err(SchemaError::InvalidDefault {
            field: field.name.clone(),
            detail: format!(
                "`{}` is not one of the accepted values",
                default.token().unwrap_or_else(|| default.kind_name().into())
            ),
        }),
    }
}

fn sequence_default_tokens(
    field: &ResolvedField,
    default: &Value,
    element: &ElementShape,
    arity: Arity,
) -> Result<Vec<String>, SchemaError> {
    let Some(items) = default.items() else {
        return Err(SchemaError::InvalidDefault {
            field: field.name.clone(),
            detail: format!("expected a sequence, found {}", default.kind_name()),
        });
    };
    if let Arity::Exactly(n) = arity {
        if items.len() != n {
            return Err(SchemaError::InvalidDefault {
                field: field.name.clone(),
                detail: format!("expected {n} elements, found {}", items.len()),
            });
        }
    }
    if matches!(arity, Arity::OneOrMore) && items.is_empty() {
        return Err(SchemaError::InvalidDefault {
            field: field.name.clone(),
            detail: "expected at least one element".into(),
        });
    }
    items
        .iter()
        .map(|item| match element {
            ElementShape::Scalar(kind) => scalar_default_token(field, item, *kind),
            ElementShape::Choice(lits) => {
                let tokens: Vec<String> = lits.iter().map(Literal::token).collect();
                closed_default_token(field, item, &tokens)
            }
            ElementShape::Enum(spec) => closed_default_token(field, item, &spec.members),
        })
        .collect()
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::EnumSpec;

    fn command() -> Command {
        Command::new("test").no_binary_name(true)
    }

    fn resolved(name: &str, shape: Shape) -> ResolvedField {
        ResolvedField {
            name: name.into(),
            shape,
            optional: false,
            default: None,
            help: None,
        }
    }

    #[test]
    fn reserved_names_are_rejected_before_binding() {
        let field = resolved("_a", Shape::Scalar(ScalarKind::Int));
        let err = bind_field(command(), &field).unwrap_err();
        assert_eq!(
            err.to_string(),
            "field names must not start with an underscore; got '_a'"
        );
    }

    #[test]
    fn bool_pair_halves_exclude_each_other() {
        let field = resolved("loud", Shape::Bool);
        let (cmd, binding) = bind_field(command(), &field).unwrap();
        assert!(matches!(binding.raw, RawKind::BoolPair { ref no_id } if no_id == "_no_loud"));
        assert!(cmd.clone().try_get_matches_from(["--loud"]).is_ok());
        assert!(cmd.try_get_matches_from(["--loud", "--no-loud"]).is_err());
    }

    #[test]
    fn required_bool_pair_demands_one_half() {
        let field = resolved("loud", Shape::Bool);
        let (cmd, _) = bind_field(command(), &field).unwrap();
        assert!(cmd.clone().try_get_matches_from(Vec::<&str>::new()).is_err());
        assert!(cmd.try_get_matches_from(["--no-loud"]).is_ok());
    }

    #[test]
    fn underscores_become_dashes_in_the_flag() {
        let field = resolved("max_count", Shape::Scalar(ScalarKind::Int));
        let (cmd, _) = bind_field(command(), &field).unwrap();
        let matches = cmd.try_get_matches_from(["--max-count", "3"]).unwrap();
        assert_eq!(matches.get_one::<i64>("max_count"), Some(&3));
    }

    #[test]
    fn closed_sets_reject_foreign_tokens() {
        let spec = EnumSpec::new("bird", ["puffin", "lark"]);
        let field = resolved("b", Shape::Enum(spec));
        let (cmd, _) = bind_field(command(), &field).unwrap();
        assert!(cmd.clone().try_get_matches_from(["--b", "lark"]).is_ok());
        assert!(cmd.try_get_matches_from(["--b", "sparrow"]).is_err());
    }

    #[test]
    fn bad_defaults_fail_at_bind_time() {
        let mut field = resolved("a", Shape::Scalar(ScalarKind::Int));
        field.default = Some(Value::Str("x".into()));
        assert!(matches!(
            bind_field(command(), &field).unwrap_err(),
            SchemaError::InvalidDefault { .. }
        ));

        let mut field = resolved(
            "c",
            Shape::Choice(vec![Literal::Int(1), Literal::Int(2)]),
        );
        field.default = Some(Value::Int(3));
        assert!(matches!(
            bind_field(command(), &field).unwrap_err(),
            SchemaError::InvalidDefault { .. }
        ));
    }

    #[test]
    fn exact_arity_is_enforced_on_tokens_and_defaults() {
        let field = resolved(
            "xs",
            Shape::Sequence {
                element: ElementShape::Scalar(ScalarKind::Int),
                arity: Arity::Exactly(2),
            },
        );
        let (cmd, _) = bind_field(command(), &field).unwrap();
        assert!(cmd.clone().try_get_matches_from(["--xs", "1", "2"]).is_ok());
        assert!(cmd.try_get_matches_from(["--xs", "1"]).is_err());

        let mut short = field.clone();
        short.default = Some(Value::Tuple(vec![Value::Int(1)]));
        assert!(matches!(
            bind_field(command(), &short).unwrap_err(),
            SchemaError::InvalidDefault { .. }
        ));
    }

    #[test]
    fn empty_sequence_default_rides_the_fallback() {
        let mut field = resolved(
            "xs",
            Shape::Sequence {
                element: ElementShape::Scalar(ScalarKind::Int),
                arity: Arity::ZeroOrMore,
            },
        );
        field.default = Some(Value::Seq(vec![]));
        let (cmd, binding) = bind_field(command(), &field).unwrap();
        // An empty default token list would count as no default at all.
        assert_eq!(binding.fallback, Some(Value::Seq(vec![])));
        let matches = cmd.try_get_matches_from(Vec::<&str>::new()).unwrap();
        assert!(!matches.contains_id("xs"));
    }

    #[test]
    fn defaulted_scalar_is_not_required() {
        let mut field = resolved("t", Shape::Scalar(ScalarKind::Float));
        field.default = Some(Value::Float(1.5));
        let (cmd, _) = bind_field(command(), &field).unwrap();
        let matches = cmd.try_get_matches_from(Vec::<&str>::new()).unwrap();
        assert_eq!(matches.get_one::<f64>("t"), Some(&1.5));
    }
}
