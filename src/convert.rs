//! Converter builder: post-parse conversion from raw parsed values to the
//! final typed value stored on the record.
//!
//! Closed-value sets (choices and enums) are matched by the primitive as
//! token strings, so the coercion back to the declared runtime type happens
//! here, after the parse. Fixed-arity sequences additionally wrap the flat
//! result into a tuple value; element conversion composes first,
//! tuple-wrapping second. The absence marker passes through every converter
//! unchanged.

use crate::classify::{ElementShape, Shape};
use crate::error::ConstructError;
use crate::record::Value;
use crate::ty::{Arity, EnumSpec, Literal};

/// A pure post-parse conversion, keyed by field name in the assembler.
#[derive(Debug, Clone)]
pub enum Converter {
    /// Parsed member name → enum member.
    EnumName(EnumSpec),
    /// Each element of a parsed name list → enum member.
    EnumNames(EnumSpec),
    /// Parsed token → the matching choice literal's typed value.
    ChoiceValue(Vec<Literal>),
    /// Each element of a parsed token list → its choice literal's value.
    ChoiceValues(Vec<Literal>),
    /// Flat sequence → fixed-arity tuple, after the inner conversion.
    Tuplify(Option<Box<Converter>>),
}

/// Build the converter for a shape. `None` means the raw parsed value is
/// already the final value.
pub fn build_converter(shape: &Shape) -> Option<Converter> {
    match shape {
        // The primitive yields bools and kind-coerced scalars directly.
        Shape::Bool | Shape::Scalar(_) => None,
        Shape::Choice(lits) => Some(Converter::ChoiceValue(lits.clone())),
        Shape::Enum(spec) => Some(Converter::EnumName(spec.clone())),
        Shape::Sequence { element, arity } => {
            let element_converter = match element {
                ElementShape::Scalar(_) => None,
                ElementShape::Choice(lits) => Some(Converter::ChoiceValues(lits.clone())),
                ElementShape::Enum(spec) => Some(Converter::EnumNames(spec.clone())),
            };
            match arity {
                Arity::ZeroOrMore => element_converter,
                Arity::Exactly(_) | Arity::OneOrMore => {
                    Some(Converter::Tuplify(element_converter.map(Box::new)))
                }
            }
        }
    }
}

impl Converter {
    pub fn apply(&self, field: &str, value: Value) -> Result<Value, ConstructError> {
        if value.is_absent() {
            return Ok(value);
        }
        match self {
            Converter::EnumName(spec) => lookup_member(field, spec, value),
            Converter::EnumNames(spec) => {
                map_elements(field, value, |v| lookup_member(field, spec, v))
            }
            Converter::ChoiceValue(lits) => lookup_choice(field, lits, value),
            Converter::ChoiceValues(lits) => {
                map_elements(field, value, |v| lookup_choice(field, lits, v))
            }
            Converter::Tuplify(inner) => {
                let converted = match inner {
                    Some(c) => c.apply(field, value)?,
                    None => value,
                };
                match converted {
                    Value::Seq(items) | Value::Tuple(items) => Ok(Value::Tuple(items)),
                    other => Err(ConstructError::TypeMismatch {
                        field: field.into(),
                        expected: "sequence".into(),
                        found: other.kind_name().into(),
                    }),
                }
            }
        }
    }
}

fn lookup_member(field: &str, spec: &EnumSpec, value: Value) -> Result<Value, ConstructError> {
    let Value::Str(name) = value else {
        return Err(ConstructError::TypeMismatch {
            field: field.into(),
            expected: "member name".into(),
            found: value.kind_name().into(),
        });
    };
    if !spec.has_member(&name) {
        return Err(ConstructError::Invalid {
            field: field.into(),
            message: format!("`{name}` is not a member of enum `{}`", spec.name),
        });
    }
    Ok(Value::Member { enum_name: spec.name.clone(), member: name })
}

fn lookup_choice(field: &str, lits: &[Literal], value: Value) -> Result<Value, ConstructError> {
    let Value::Str(token) = value else {
        return Err(ConstructError::TypeMismatch {
            field: field.into(),
            expected: "choice token".into(),
            found: value.kind_name().into(),
        });
    };
    match lits.iter().find(|lit| lit.token() == token) {
        Some(Literal::Int(i)) => Ok(Value::Int(*i)),
        Some(Literal::Float(f)) => Ok(Value::Float(f.0)),
        Some(Literal::Str(s)) => Ok(Value::Str(s.clone())),
        None => Err(ConstructError::Invalid {
            field: field.into(),
            message: format!("`{token}` is not one of the declared choices"),
        }),
    }
}

fn map_elements<F>(field: &str, value: Value, f: F) -> Result<Value, ConstructError>
where
    F: Fn(Value) -> Result<Value, ConstructError>,
{
    match value {
        Value::Seq(items) => items
            .into_iter()
            .map(f)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Seq),
        other => Err(ConstructError::TypeMismatch {
            field: field.into(),
            expected: "sequence".into(),
            found: other.kind_name().into(),
        }),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use crate::ty::TypeExpr;

    fn shape_of(ty: &TypeExpr) -> Shape {
        classify("f", ty).unwrap().0
    }

    #[test]
    fn scalars_need_no_converter() {
        assert!(build_converter(&shape_of(&TypeExpr::int())).is_none());
        assert!(build_converter(&shape_of(&TypeExpr::boolean())).is_none());
        assert!(build_converter(&shape_of(&TypeExpr::list(TypeExpr::float()))).is_none());
    }

    #[test]
    fn choice_token_coerces_to_declared_kind() {
        let c = build_converter(&shape_of(&TypeExpr::choice([1i64, 2, 3]))).unwrap();
        let out = c.apply("f", Value::Str("1".into())).unwrap();
        assert_eq!(out, Value::Int(1));
    }

    #[test]
    fn enum_name_maps_back_to_member() {
        let spec = EnumSpec::new("bird", ["puffin", "lark"]);
        let c = build_converter(&shape_of(&TypeExpr::enumeration(spec))).unwrap();
        let out = c.apply("b", Value::Str("lark".into())).unwrap();
        assert_eq!(
            out,
            Value::Member { enum_name: "bird".into(), member: "lark".into() }
        );
    }

    #[test]
    fn enum_sequence_maps_every_element() {
        let spec = EnumSpec::new("bird", ["puffin", "lark"]);
        let c = build_converter(&shape_of(&TypeExpr::list(TypeExpr::enumeration(spec)))).unwrap();
        let out = c
            .apply(
                "bs",
                Value::Seq(vec![Value::Str("lark".into()), Value::Str("puffin".into())]),
            )
            .unwrap();
        let Value::Seq(items) = out else { panic!("expected Seq") };
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[0], Value::Member { member, .. } if member == "lark"));
        // An empty sequence is valid and maps to empty.
        let out = c.apply("bs", Value::Seq(vec![])).unwrap();
        assert_eq!(out, Value::Seq(vec![]));
    }

    #[test]
    fn fixed_arity_wraps_into_tuple_after_element_conversion() {
        let c = build_converter(&shape_of(&TypeExpr::tuple(TypeExpr::choice(["a", "b"]), 2)))
            .unwrap();
        let out = c
            .apply(
                "xs",
                Value::Seq(vec![Value::Str("a".into()), Value::Str("b".into())]),
            )
            .unwrap();
        assert_eq!(
            out,
            Value::Tuple(vec![Value::Str("a".into()), Value::Str("b".into())])
        );
    }

    #[test]
    fn tuplify_without_element_converter() {
        let c = build_converter(&shape_of(&TypeExpr::tuple(TypeExpr::int(), 2))).unwrap();
        let out = c
            .apply("xs", Value::Seq(vec![Value::Int(1), Value::Int(2)]))
            .unwrap();
        assert_eq!(out, Value::Tuple(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn absence_passes_through_every_converter() {
        let spec = EnumSpec::new("bird", ["puffin"]);
        for c in [
            Converter::EnumName(spec.clone()),
            Converter::ChoiceValue(vec![Literal::from(1)]),
            Converter::Tuplify(None),
        ] {
            assert_eq!(c.apply("f", Value::Absent).unwrap(), Value::Absent);
        }
    }
}
