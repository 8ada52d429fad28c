//! Program dictionary access helpers
//!
//! Gantree: L2_Program → Wire
//!
//! The program dictionary is a tagged-union JSON tree: every statement and
//! expression is a single-key object `{tag: body}`. These helpers read that
//! shape and turn missing or mistyped fields into [`QsimError::MalformedNode`].

use qsim_core::{QsimError, QsimResult};
use serde_json::{Map, Value};

/// Split a single-key object into `(tag, body)`
pub fn tagged<'a>(value: &'a Value, node: &str) -> QsimResult<(&'a str, &'a Value)> {
    let object = as_object(value, node)?;
    let mut entries = object.iter();

    match (entries.next(), entries.next()) {
        (Some((tag, body)), None) => Ok((tag.as_str(), body)),
        (None, _) => Err(QsimError::malformed(node, "empty tagged node")),
        (Some(_), Some(_)) => Err(QsimError::malformed(
            node,
            format!(
                "expected a single tag, found {:?}",
                object.keys().collect::<Vec<_>>()
            ),
        )),
    }
}

/// Value as a JSON object
pub fn as_object<'a>(value: &'a Value, node: &str) -> QsimResult<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| QsimError::malformed(node, format!("expected an object, got {}", value)))
}

/// Required field
pub fn field<'a>(body: &'a Value, key: &str, node: &str) -> QsimResult<&'a Value> {
    optional(body, key).ok_or_else(|| QsimError::malformed(node, format!("missing '{}'", key)))
}

/// Optional field; JSON `null` counts as absent
pub fn optional<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

/// Required string field
pub fn str_field<'a>(body: &'a Value, key: &str, node: &str) -> QsimResult<&'a str> {
    field(body, key, node)?
        .as_str()
        .ok_or_else(|| QsimError::malformed(node, format!("'{}' must be a string", key)))
}

/// `{key: {name: ...}}` lookup, as used for pulse and variable references
pub fn named(body: &Value, key: &str, node: &str) -> QsimResult<String> {
    let inner = field(body, key, node)?;
    Ok(str_field(inner, "name", node)?.to_string())
}

/// Statement list of a `{statements: [...]}` block; a missing list is empty
pub fn statement_list<'a>(block: &'a Value, node: &str) -> QsimResult<&'a [Value]> {
    match optional(block, "statements") {
        None => Ok(&[]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(QsimError::malformed(
            node,
            format!("'statements' must be a list, got {}", other),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tagged() {
        let value = json!({"wait": {"time": 4}});
        let (tag, body) = tagged(&value, "statement").unwrap();
        assert_eq!(tag, "wait");
        assert_eq!(body["time"], 4);
    }

    #[test]
    fn test_tagged_rejects_multiple_keys() {
        let value = json!({"wait": {}, "play": {}});
        assert!(matches!(
            tagged(&value, "statement"),
            Err(QsimError::MalformedNode { .. })
        ));
        assert!(tagged(&json!({}), "statement").is_err());
        assert!(tagged(&json!("wait"), "statement").is_err());
    }

    #[test]
    fn test_optional_null() {
        let value = json!({"amp": null});
        assert!(optional(&value, "amp").is_none());
        assert!(field(&value, "amp", "play").is_err());
    }

    #[test]
    fn test_named() {
        let value = json!({"namedPulse": {"name": "x90"}});
        assert_eq!(named(&value, "namedPulse", "play").unwrap(), "x90");
        assert!(named(&value, "pulse", "measure").is_err());
    }

    #[test]
    fn test_statement_list() {
        assert!(statement_list(&json!({}), "body").unwrap().is_empty());
        assert_eq!(
            statement_list(&json!({"statements": [{}, {}]}), "body")
                .unwrap()
                .len(),
            2
        );
        assert!(statement_list(&json!({"statements": 3}), "body").is_err());
    }
}
