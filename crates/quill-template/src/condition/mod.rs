//! `<If condition="...">` blocks.
//!
//! Conditions are small expressions evaluated against a scope: the current
//! loop item (alias = loop alias) or the document frontmatter (alias =
//! `frontmatter`). The scope is exposed both under the alias and field by
//! field, so `post.draft` and `draft` both work inside a loop aliased `post`.
//!
//! Before parsing, `{alias.path}` placeholders in the expression are replaced
//! by literals of the looked-up values.
//!
//! Evaluation never runs arbitrary code: the grammar only covers literals,
//! identifiers, member access, comparison and logical operators.

mod eval;
mod lexer;
mod parser;

use std::convert::Infallible;

use regex::Regex;
use serde_json::{Map, Value};

use crate::{element, placeholder, value};

/// Condition parse or evaluation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConditionError {
    /// Character that starts no token.
    #[error("Unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    /// String literal without closing quote.
    #[error("Unterminated string starting at position {pos}")]
    UnterminatedString { pos: usize },
    /// Malformed `\u` escape.
    #[error("Invalid escape sequence at position {pos}")]
    InvalidEscape { pos: usize },
    /// Numeric literal that does not parse.
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    /// Token in the wrong place.
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),
    /// Expression ended early.
    #[error("Unexpected end of expression")]
    UnexpectedEnd,
    /// Identifier not present in the scope.
    #[error("{0} is not defined")]
    UnknownIdentifier(String),
    /// Member access on `null` or `undefined`.
    #[error("Cannot read properties of {target} (reading '{property}')")]
    NullMember { property: String, target: String },
}

/// Evaluate `expr` against `scope`, exposed as bare variables and under `alias`.
///
/// # Errors
///
/// Returns [`ConditionError`] when the expression is malformed or references
/// an unknown identifier.
pub fn evaluate(expr: &str, scope: &Map<String, Value>, alias: &str) -> Result<bool, ConditionError> {
    let mut context = Map::new();
    context.insert(alias.to_owned(), Value::Object(scope.clone()));
    for (key, value) in scope {
        context.insert(key.clone(), value.clone());
    }

    let tokens = lexer::tokenize(expr)?;
    let expr = parser::parse(&tokens)?;
    Ok(eval::eval(&expr, &context)?.is_truthy())
}

/// Replace `{alias.path}` placeholders in an expression with literals.
///
/// Strings become quoted literals, other values JSON literal text and missing
/// paths `undefined` (or the quoted fallback, if one is given).
fn inline_placeholders(expr: &str, scope: &Map<String, Value>, alias: &str) -> String {
    if !expr.contains(&format!("{{{alias}.")) {
        return expr.to_owned();
    }
    let pattern = format!(
        r"\{{{}\.([^}}|\s]+)(?:\s+or\s+([^}}]+))?\}}",
        regex::escape(alias)
    );
    let Ok(re) = Regex::new(&pattern) else {
        return expr.to_owned();
    };

    placeholder::replace_with(expr, &re, |caps| {
        let literal = match value::lookup(scope, &caps[1]) {
            Some(Value::String(s)) => Value::String(s.clone()).to_string(),
            Some(other) => value::render_json(other),
            None => match placeholder::fallback_capture(caps, 2) {
                Some(fallback) => Value::String(fallback).to_string(),
                None => "undefined".to_owned(),
            },
        };
        Some(literal)
    })
}

/// Resolve every `<If>` block in `text` against `scope`.
///
/// Truthy blocks are replaced by their body (with nested `<If>` blocks
/// resolved), falsy ones by nothing. Conditions that fail to parse or
/// evaluate are logged and count as false. Blocks without a `condition`
/// attribute are left untouched.
pub(crate) fn process_conditions(text: &str, scope: &Map<String, Value>, alias: &str) -> String {
    let Ok(output) = element::replace_each::<Infallible>(text, "If", |el| {
        let Some(condition) = el.attrs.get("condition") else {
            tracing::warn!("If block without condition attribute, leaving it as is");
            return Ok(None);
        };

        let expr = inline_placeholders(condition, scope, alias);
        let truthy = evaluate(&expr, scope, alias).unwrap_or_else(|e| {
            tracing::warn!(condition = %condition, error = %e, "Failed to evaluate condition");
            false
        });

        if !truthy {
            return Ok(Some(String::new()));
        }
        Ok(Some(process_conditions(el.body.unwrap_or_default(), scope, alias)))
    });
    output
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn scope(value: &Value) -> &Map<String, Value> {
        value.as_object().unwrap()
    }

    #[test]
    fn test_evaluate_bare_and_aliased() {
        let item = json!({"title": "A", "draft": false, "views": 12});

        assert!(evaluate("post.views > 10 && !draft", scope(&item), "post").unwrap());
        assert!(!evaluate("post.draft", scope(&item), "post").unwrap());
        assert!(evaluate("title === 'A'", scope(&item), "post").unwrap());
    }

    #[test]
    fn test_evaluate_fields_shadow_alias() {
        let item = json!({"featured": true, "loop": 2});

        assert!(evaluate("loop === 2", scope(&item), "loop").unwrap());
    }

    #[test]
    fn test_inline_placeholders() {
        let item = json!({"title": "It's \"here\"", "n": 3, "tags": ["a"], "meta": {"x": null}});

        assert_eq!(
            inline_placeholders(
                "{post.title} {post.n} {post.tags} {post.meta.x} {post.nope} {post.nope or 'd'} {other.x}",
                scope(&item),
                "post"
            ),
            r#""It's \"here\"" 3 ["a"] null undefined "d" {other.x}"#
        );
    }

    #[test]
    fn test_process_conditions_loop_flag() {
        let featured = json!({"featured": true, "loop": 1});
        let plain = json!({"featured": false, "loop": 2});
        let body = r#"<If condition="{loop.featured}">YES</If>"#;

        assert_eq!(process_conditions(body, scope(&featured), "loop"), "YES");
        assert_eq!(process_conditions(body, scope(&plain), "loop"), "");
    }

    #[test]
    fn test_process_conditions_nested() {
        let fm = json!({"a": true, "b": false});
        let text = r#"[<If condition="a">x<If condition="b">y</If>z</If>]"#;

        assert_eq!(process_conditions(text, scope(&fm), "frontmatter"), "[xz]");
    }

    #[test]
    fn test_process_conditions_errors_are_false() {
        let fm = json!({"title": "T"});
        let text = r#"<If condition="missing">a</If><If condition="title ===">b</If><If condition="{other.x}">c</If>d"#;

        assert_eq!(process_conditions(text, scope(&fm), "frontmatter"), "d");
    }

    #[test]
    fn test_process_conditions_without_condition_kept() {
        let fm = Map::new();
        let text = "<If>kept</If>";

        assert_eq!(process_conditions(text, &fm, "frontmatter"), text);
    }

    #[test]
    fn test_process_conditions_single_quoted_attribute() {
        let fm = json!({"layout": "post"});
        let text = r#"<If condition='layout == "post"'>P</If>"#;

        assert_eq!(process_conditions(text, scope(&fm), "frontmatter"), "P");
    }
}
