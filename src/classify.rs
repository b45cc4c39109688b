//! Type classifier: reduce a field's declared [`TypeExpr`] to a normalized
//! shape plus an "optional" bit.
//!
//! The shape decides everything downstream: the flag's command-line form,
//! its converter, and how the raw parse result is read back. Classification
//! failures are schema errors and abort before any token is parsed.

use crate::error::SchemaError;
use crate::ty::{Arity, EnumSpec, Literal, ScalarKind, TypeExpr};

/// Normalized shape of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Boolean flag pair (`--x` / `--no-x`).
    Bool,
    Scalar(ScalarKind),
    /// Closed literal set; all literals share one kind (checked here).
    Choice(Vec<Literal>),
    Enum(EnumSpec),
    Sequence { element: ElementShape, arity: Arity },
}

/// What one sequence element can be. Sequences of sequences and optional
/// elements are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementShape {
    Scalar(ScalarKind),
    Choice(Vec<Literal>),
    Enum(EnumSpec),
}

/// Classify `ty`, returning the base shape and whether the field is
/// optional-typed. Optional wrappers unwrap to the single non-absence
/// alternative; nesting them is idempotent (absence is absence).
pub fn classify(field: &str, ty: &TypeExpr) -> Result<(Shape, bool), SchemaError> {
    let mut optional = false;
    let mut base = ty;
    while let TypeExpr::Optional { inner } = base {
        optional = true;
        base = inner;
    }
    let shape = classify_base(field, base)?;
    Ok((shape, optional))
}

fn classify_base(field: &str, ty: &TypeExpr) -> Result<Shape, SchemaError> {
    match ty {
        TypeExpr::Scalar { scalar: ScalarKind::Bool } => Ok(Shape::Bool),
        TypeExpr::Scalar { scalar } => Ok(Shape::Scalar(*scalar)),
        TypeExpr::Choice { choices } => Ok(Shape::Choice(checked_choices(field, choices)?)),
        TypeExpr::Enum { spec } => {
            if spec.members.is_empty() {
                return Err(SchemaError::EmptyChoices { field: field.into() });
            }
            Ok(Shape::Enum(spec.clone()))
        }
        TypeExpr::Sequence { element, arity } => Ok(Shape::Sequence {
            element: classify_element(field, element)?,
            arity: *arity,
        }),
        // Caller already stripped optional layers.
        TypeExpr::Optional { .. } => Err(SchemaError::UnsupportedType {
            field: field.into(),
            detail: "nested optional".into(),
        }),
    }
}

fn classify_element(field: &str, element: &TypeExpr) -> Result<ElementShape, SchemaError> {
    match element {
        TypeExpr::Scalar { scalar } => Ok(ElementShape::Scalar(*scalar)),
        TypeExpr::Choice { choices } => Ok(ElementShape::Choice(checked_choices(field, choices)?)),
        TypeExpr::Enum { spec } => {
            if spec.members.is_empty() {
                return Err(SchemaError::EmptyChoices { field: field.into() });
            }
            Ok(ElementShape::Enum(spec.clone()))
        }
        TypeExpr::Optional { .. } => Err(SchemaError::UnsupportedType {
            field: field.into(),
            detail: "optional sequence elements are not supported".into(),
        }),
        TypeExpr::Sequence { .. } => Err(SchemaError::UnsupportedType {
            field: field.into(),
            detail: "nested sequences are not supported".into(),
        }),
    }
}

/// Enforce that choice sets are non-empty and single-kind, so one
/// unambiguous scalar coercion can be chosen for the whole set.
fn checked_choices(field: &str, choices: &[Literal]) -> Result<Vec<Literal>, SchemaError> {
    let Some(first) = choices.first() else {
        return Err(SchemaError::EmptyChoices { field: field.into() });
    };
    let kind = first.kind();
    if choices.iter().any(|c| c.kind() != kind) {
        let mut kinds: Vec<&str> = choices.iter().map(|c| c.kind().token_name()).collect();
        kinds.dedup();
        return Err(SchemaError::AmbiguousChoiceType {
            field: field.into(),
            found: kinds.join(", "),
        });
    }
    Ok(choices.to_vec())
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
