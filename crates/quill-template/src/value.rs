//! Rendering of data values into template text.

use serde_json::Value;

/// Render a value for insertion into a document.
///
/// Strings are inserted as-is, numbers in their shortest form (`3`, `2.5`),
/// booleans and `null` as their keywords. Arrays of scalars are joined with
/// `|`; arrays of objects and plain objects become compact JSON.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => render_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_owned(),
        Value::Array(items) => {
            if items.first().is_some_and(|first| first.is_object() || first.is_array()) {
                value.to_string()
            } else {
                items.iter().map(render_joined).collect::<Vec<_>>().join("|")
            }
        }
        Value::Object(_) => value.to_string(),
    }
}

/// Render a value as JSON literal text.
#[must_use]
pub fn render_json(value: &Value) -> String {
    value.to_string()
}

/// Array elements render like standalone values, except `null` which joins as empty.
fn render_joined(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => render(other),
    }
}

fn render_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => format!("{f}"),
        _ => n.to_string(),
    }
}

/// Look up a dotted path in a mapping.
///
/// An exact key match wins over nested traversal, so keys that contain dots
/// still resolve. Array elements are addressed by index.
#[must_use]
pub fn lookup<'a>(map: &'a serde_json::Map<String, Value>, path: &str) -> Option<&'a Value> {
    if let Some(value) = map.get(path) {
        return Some(value);
    }

    let (head, rest) = path.split_once('.')?;
    let mut current = map.get(head)?;
    for key in rest.split('.') {
        current = match current {
            Value::Object(obj) => obj.get(key)?,
            Value::Array(items) => items.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_render_scalars() {
        assert_eq!(render(&json!("text")), "text");
        assert_eq!(render(&json!(3)), "3");
        assert_eq!(render(&json!(-7)), "-7");
        assert_eq!(render(&json!(2.5)), "2.5");
        assert_eq!(render(&json!(3.0)), "3");
        assert_eq!(render(&json!(true)), "true");
        assert_eq!(render(&json!(false)), "false");
        assert_eq!(render(&Value::Null), "null");
    }

    #[test]
    fn test_render_scalar_array_joins_with_pipe() {
        assert_eq!(render(&json!(["a", "b", 3])), "a|b|3");
        assert_eq!(render(&json!(["a", null, "c"])), "a||c");
        assert_eq!(render(&json!([])), "");
    }

    #[test]
    fn test_render_object_array_as_json() {
        assert_eq!(
            render(&json!([{"name": "a"}, {"name": "b"}])),
            r#"[{"name":"a"},{"name":"b"}]"#
        );
    }

    #[test]
    fn test_render_object_as_json() {
        assert_eq!(render(&json!({"k": [1, 2]})), r#"{"k":[1,2]}"#);
    }

    #[test]
    fn test_lookup_direct_and_nested() {
        let map = json!({
            "title": "T",
            "author": {"name": "Ann", "links": ["x", "y"]},
            "dotted.key": 1
        });
        let map = map.as_object().unwrap();

        assert_eq!(lookup(map, "title"), Some(&json!("T")));
        assert_eq!(lookup(map, "author.name"), Some(&json!("Ann")));
        assert_eq!(lookup(map, "author.links.1"), Some(&json!("y")));
        assert_eq!(lookup(map, "dotted.key"), Some(&json!(1)));
        assert_eq!(lookup(map, "author.missing"), None);
        assert_eq!(lookup(map, "title.length"), None);
    }
}
