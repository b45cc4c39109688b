//! Text form of the type grammar.
//!
//! Fields declared as data (JSON schemas, builder `.text(..)` calls) spell
//! their types as strings: `int`, `str | none`, `choice[1, 2, 3]`,
//! `list[float]`, `tuple[int, int]`, `tuple[str, ...]`, or the name of a
//! registered enumeration. This module turns that spelling into a
//! [`TypeExpr`]. Shape rules (homogeneous choices, no nested sequences) are
//! enforced later by the classifier; this parser only rejects what is not
//! even a type.

use ordered_float::OrderedFloat;

use crate::error::SchemaError;
use crate::ty::{EnumSpec, Literal, ScalarKind, TypeExpr};

/// Parse the text spelling of a field's type. `enums` is the set of
/// enumerations registered on the schema; a bare identifier that is neither
/// a scalar name nor a container must name one of them.
pub fn parse_type(
    field: &str,
    src: &str,
    enums: &[EnumSpec],
) -> Result<TypeExpr, SchemaError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(syntax(field, "empty type"));
    }

    let parts = split_top(src, '|');
    if parts.len() == 1 {
        if parts[0].trim() == "none" {
            return Err(SchemaError::UnsupportedType {
                field: field.into(),
                detail: "`none` by itself is not a type; use `T | none`".into(),
            });
        }
        return parse_atom(field, parts[0].trim(), enums);
    }

    // Union: exactly one alternative may be something other than `none`.
    let mut base: Option<&str> = None;
    for part in &parts {
        let part = part.trim();
        if part == "none" {
            continue;
        }
        if base.replace(part).is_some() {
            return Err(SchemaError::UnsupportedType {
                field: field.into(),
                detail: format!(
                    "unions may have at most one non-`none` alternative; got `{src}`"
                ),
            });
        }
    }
    match base {
        Some(atom) => Ok(parse_atom(field, atom, enums)?.optional()),
        None => Err(SchemaError::UnsupportedType {
            field: field.into(),
            detail: "`none | none` names no value type".into(),
        }),
    }
}

fn parse_atom(field: &str, src: &str, enums: &[EnumSpec]) -> Result<TypeExpr, SchemaError> {
    if let Some(kind) = ScalarKind::from_name(src) {
        return Ok(TypeExpr::Scalar { scalar: kind });
    }

    // Subscripted containers: `name[body]`.
    if let Some(open) = src.find('[') {
        if !src.ends_with(']') {
            return Err(syntax(field, format!("unclosed `[` in `{src}`")));
        }
        let head = src[..open].trim();
        let body = &src[open + 1..src.len() - 1];
        return match head {
            "choice" => parse_choice(field, body),
            "list" => parse_list(field, body, enums),
            "tuple" => parse_tuple(field, body, enums),
            other => Err(syntax(field, format!("`{other}` cannot be subscripted"))),
        };
    }

    match src {
        "list" | "tuple" => Err(SchemaError::Unsubscripted {
            field: field.into(),
            container: src.into(),
        }),
        "choice" => Err(syntax(field, "`choice` needs a literal list, e.g. `choice[1, 2]`")),
        ident if is_identifier(ident) => match enums.iter().find(|e| e.name == ident) {
            Some(spec) => Ok(TypeExpr::Enum { spec: spec.clone() }),
            None => Err(SchemaError::UnknownEnum {
                field: field.into(),
                name: ident.into(),
            }),
        },
        other => Err(syntax(field, format!("cannot read `{other}` as a type"))),
    }
}

fn parse_choice(field: &str, body: &str) -> Result<TypeExpr, SchemaError> {
    if body.trim().is_empty() {
        return Err(SchemaError::EmptyChoices { field: field.into() });
    }
    let choices = split_top(body, ',')
        .into_iter()
        .map(|tok| parse_literal(field, tok.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(TypeExpr::Choice { choices })
}

fn parse_list(field: &str, body: &str, enums: &[EnumSpec]) -> Result<TypeExpr, SchemaError> {
    let parts = split_top(body, ',');
    if parts.len() != 1 || parts[0].trim().is_empty() {
        return Err(syntax(field, format!("`list` takes one element type; got `{body}`")));
    }
    Ok(TypeExpr::list(parse_type(field, parts[0].trim(), enums)?))
}

fn parse_tuple(field: &str, body: &str, enums: &[EnumSpec]) -> Result<TypeExpr, SchemaError> {
    let mut parts: Vec<&str> = split_top(body, ',').into_iter().map(str::trim).collect();
    if parts.is_empty() || (parts.len() == 1 && parts[0].is_empty()) {
        return Err(SchemaError::UnsupportedType {
            field: field.into(),
            detail: "empty tuples are not supported".into(),
        });
    }

    let open_ended = parts.last() == Some(&"...");
    if open_ended {
        parts.pop();
    }
    if parts.iter().any(|p| *p == "...") {
        return Err(syntax(field, "`...` may only close a tuple"));
    }

    let heads = parts
        .iter()
        .map(|p| parse_type(field, p, enums))
        .collect::<Result<Vec<_>, _>>()?;

    if open_ended {
        return match heads.as_slice() {
            [] => Err(syntax(field, "`tuple[...]` names no element type")),
            [element] => Ok(TypeExpr::list(element.clone())),
            [first, second] if first == second => Ok(TypeExpr::at_least_one(first.clone())),
            [_, _] => Err(SchemaError::HeterogeneousTuple {
                field: field.into(),
                found: join_heads(&parts),
            }),
            _ => Err(SchemaError::UnsupportedType {
                field: field.into(),
                detail: format!(
                    "an open-ended tuple may repeat at most one leading element; got `{body}`"
                ),
            }),
        };
    }

    if heads.iter().any(|h| h != &heads[0]) {
        return Err(SchemaError::HeterogeneousTuple {
            field: field.into(),
            found: join_heads(&parts),
        });
    }
    Ok(TypeExpr::tuple(heads[0].clone(), heads.len()))
}

fn parse_literal(field: &str, tok: &str) -> Result<Literal, SchemaError> {
    if tok.is_empty() {
        return Err(syntax(field, "empty choice literal"));
    }
    for quote in ['"', '\''] {
        if tok.len() >= 2 && tok.starts_with(quote) && tok.ends_with(quote) {
            return Ok(Literal::Str(tok[1..tok.len() - 1].to_owned()));
        }
    }
    if let Ok(i) = tok.parse::<i64>() {
        return Ok(Literal::Int(i));
    }
    if let Ok(f) = tok.parse::<f64>() {
        return Ok(Literal::Float(OrderedFloat(f)));
    }
    if is_identifier(tok) {
        return Ok(Literal::Str(tok.to_owned()));
    }
    Err(syntax(field, format!("cannot read `{tok}` as a choice literal")))
}

/// Split on `sep` at bracket depth zero, outside quotes.
fn split_top(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            c if c == sep && depth == 0 => {
                parts.push(&s[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn syntax(field: &str, detail: impl Into<String>) -> SchemaError {
    SchemaError::TypeSyntax {
        field: field.into(),
        detail: detail.into(),
    }
}

fn join_heads(parts: &[&str]) -> String {
    parts.join(", ")
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<TypeExpr, SchemaError> {
        parse_type("f", src, &[])
    }

    #[test]
    fn scalars() {
        assert_eq!(parse("int").unwrap(), TypeExpr::int());
        assert_eq!(parse("  path  ").unwrap(), TypeExpr::path());
        assert_eq!(parse("bool").unwrap(), TypeExpr::boolean());
    }

    #[test]
    fn optional_union() {
        assert_eq!(parse("int | none").unwrap(), TypeExpr::int().optional());
        assert_eq!(parse("none|str").unwrap(), TypeExpr::string().optional());
        assert_eq!(
            parse("list[int] | none").unwrap(),
            TypeExpr::list(TypeExpr::int()).optional()
        );
    }

    #[test]
    fn wide_unions_rejected() {
        assert!(matches!(
            parse("int | str"),
            Err(SchemaError::UnsupportedType { .. })
        ));
        assert!(matches!(
            parse("none"),
            Err(SchemaError::UnsupportedType { .. })
        ));
        assert!(matches!(
            parse("none | none"),
            Err(SchemaError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn choices() {
        assert_eq!(
            parse("choice[1, 2, 3]").unwrap(),
            TypeExpr::choice([1i64, 2, 3])
        );
        assert_eq!(
            parse(r#"choice["a", 'b c']"#).unwrap(),
            TypeExpr::choice(["a", "b c"])
        );
        // Bare words read as strings.
        assert_eq!(parse("choice[red, green]").unwrap(), TypeExpr::choice(["red", "green"]));
        assert_eq!(
            parse("choice[1.5, 2.5]").unwrap(),
            TypeExpr::choice([1.5f64, 2.5])
        );
        assert!(matches!(
            parse("choice[]"),
            Err(SchemaError::EmptyChoices { .. })
        ));
    }

    #[test]
    fn quoted_comma_stays_inside_literal() {
        assert_eq!(parse(r#"choice["a,b", "c"]"#).unwrap(), TypeExpr::choice(["a,b", "c"]));
    }

    #[test]
    fn lists_and_tuples() {
        assert_eq!(parse("list[int]").unwrap(), TypeExpr::list(TypeExpr::int()));
        assert_eq!(
            parse("tuple[float, float]").unwrap(),
            TypeExpr::tuple(TypeExpr::float(), 2)
        );
        assert_eq!(
            parse("tuple[str, ...]").unwrap(),
            TypeExpr::list(TypeExpr::string())
        );
        assert_eq!(
            parse("tuple[int, int, ...]").unwrap(),
            TypeExpr::at_least_one(TypeExpr::int())
        );
        assert_eq!(
            parse("list[choice[1, 2]]").unwrap(),
            TypeExpr::list(TypeExpr::choice([1i64, 2]))
        );
    }

    #[test]
    fn bad_tuples() {
        assert!(matches!(
            parse("tuple[int, str]"),
            Err(SchemaError::HeterogeneousTuple { .. })
        ));
        assert!(matches!(
            parse("tuple[int, str, ...]"),
            Err(SchemaError::HeterogeneousTuple { .. })
        ));
        assert!(matches!(
            parse("tuple[int, int, int, ...]"),
            Err(SchemaError::UnsupportedType { .. })
        ));
        assert!(matches!(
            parse("tuple[...]"),
            Err(SchemaError::TypeSyntax { .. })
        ));
        assert!(matches!(
            parse("tuple[]"),
            Err(SchemaError::UnsupportedType { .. })
        ));
    }

    #[test]
    fn bare_containers_must_be_subscripted() {
        for src in ["list", "tuple"] {
            let err = parse(src).unwrap_err();
            assert!(matches!(err, SchemaError::Unsubscripted { ref container, .. } if container == src));
        }
        assert!(matches!(parse("choice"), Err(SchemaError::TypeSyntax { .. })));
    }

    #[test]
    fn enum_names_resolve_against_the_registry() {
        let birds = EnumSpec::new("bird", ["puffin", "lark"]);
        let parsed = parse_type("b", "bird | none", std::slice::from_ref(&birds)).unwrap();
        assert_eq!(parsed, TypeExpr::enumeration(birds).optional());

        assert!(matches!(
            parse_type("b", "mammal", &[]),
            Err(SchemaError::UnknownEnum { .. })
        ));
    }

    #[test]
    fn garbage_is_a_syntax_error() {
        assert!(matches!(parse(""), Err(SchemaError::TypeSyntax { .. })));
        assert!(matches!(parse("int["), Err(SchemaError::TypeSyntax { .. })));
        assert!(matches!(parse("7up"), Err(SchemaError::TypeSyntax { .. })));
    }
}
