//! Element reference normalization
//!
//! Gantree: L2_Program → extract_elements
//!
//! The `qe` field of a statement names its target elements in one of three
//! shapes: a bare string, a single `{name}` object, or a list of `{name}`
//! objects. All three normalize to a list of names.

use qsim_core::{ElementName, QsimError, QsimResult};
use serde_json::Value;

/// Element-reference field
pub const QE: &str = "qe";

/// Normalize the `qe` field of a statement body.
///
/// A missing `qe` yields an empty list (`align()` with no arguments).
pub fn extract_elements(body: &Value) -> QsimResult<Vec<ElementName>> {
    match body.get(QE) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::String(name)) => Ok(vec![name.clone()]),
        Some(Value::Array(items)) => items.iter().map(element_name).collect(),
        Some(object @ Value::Object(_)) => Ok(vec![element_name(object)?]),
        Some(other) => Err(QsimError::UnsupportedElementShape(other.to_string())),
    }
}

/// Normalize a `qe` field that must name exactly one element
pub fn extract_single_element(body: &Value, node: &str) -> QsimResult<ElementName> {
    let mut elements = extract_elements(body)?;
    if elements.len() != 1 {
        return Err(QsimError::malformed(
            node,
            format!("expected one element, got {:?}", elements),
        ));
    }
    Ok(elements.remove(0))
}

fn element_name(value: &Value) -> QsimResult<ElementName> {
    value
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| QsimError::UnsupportedElementShape(value.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_string() {
        assert_eq!(extract_elements(&json!({"qe": "q0"})).unwrap(), vec!["q0"]);
    }

    #[test]
    fn test_list_of_names() {
        let body = json!({"qe": [{"name": "q0"}, {"name": "q1"}]});
        assert_eq!(extract_elements(&body).unwrap(), vec!["q0", "q1"]);
    }

    #[test]
    fn test_single_name_object() {
        assert_eq!(
            extract_elements(&json!({"qe": {"name": "q0"}})).unwrap(),
            vec!["q0"]
        );
    }

    #[test]
    fn test_missing_is_empty() {
        assert!(extract_elements(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_unsupported_shapes() {
        for body in [
            json!({"qe": 3}),
            json!({"qe": true}),
            json!({"qe": {"id": "q0"}}),
            json!({"qe": ["q0"]}),
        ] {
            assert!(
                matches!(
                    extract_elements(&body),
                    Err(QsimError::UnsupportedElementShape(_))
                ),
                "{} should be rejected",
                body
            );
        }
    }

    #[test]
    fn test_single_element() {
        assert_eq!(
            extract_single_element(&json!({"qe": {"name": "q0"}}), "play").unwrap(),
            "q0"
        );
        assert!(extract_single_element(&json!({"qe": []}), "play").is_err());
    }
}
