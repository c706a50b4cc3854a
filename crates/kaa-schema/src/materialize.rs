//! # Materialization
//!
//! Converts a parsed YAML tree into the JSON forms the validation engine
//! consumes: a [`CanonicalSchema`] string and [`CanonicalDocument`] bytes.
//!
//! Object keys come out sorted, so a given tree always has one encoding.
//! YAML tags are dropped in favour of the tagged value. Merge keys have
//! already been expanded by the loader, so `<<` never reaches the output.

use serde_json::Value;

use crate::error::{KaaError, Result};
use crate::source::ParsedTree;

/// A schema encoded as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSchema(String);

impl CanonicalSchema {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A document encoded as JSON bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalDocument(Vec<u8>);

impl CanonicalDocument {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// Encode a schema tree as a JSON string.
///
/// # Errors
///
/// Returns [`KaaError::Serialization`] if the tree holds a non-finite
/// float or a key that is not a scalar.
pub fn materialize_schema(tree: &ParsedTree) -> Result<CanonicalSchema> {
    let value = tree_to_json(tree)?;
    serde_json::to_string(&value)
        .map(CanonicalSchema)
        .map_err(|e| KaaError::Serialization {
            reason: e.to_string(),
        })
}

/// Encode a document tree as JSON bytes.
///
/// # Errors
///
/// Same conditions as [`materialize_schema`].
pub fn materialize_document(tree: &ParsedTree) -> Result<CanonicalDocument> {
    let value = tree_to_json(tree)?;
    serde_json::to_vec(&value)
        .map(CanonicalDocument)
        .map_err(|e| KaaError::Serialization {
            reason: e.to_string(),
        })
}

fn tree_to_json(tree: &ParsedTree) -> Result<Value> {
    mapping_to_json(tree.as_mapping()).map_err(|reason| KaaError::Serialization { reason })
}

fn mapping_to_json(map: &serde_yaml::Mapping) -> std::result::Result<Value, String> {
    let mut json_map = serde_json::Map::new();
    for (k, v) in map {
        json_map.insert(key_to_string(k)?, yaml_to_json_value(v)?);
    }
    Ok(Value::Object(json_map))
}

fn key_to_string(key: &serde_yaml::Value) -> std::result::Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Tagged(tagged) => key_to_string(&tagged.value),
        other => Err(format!("unsupported YAML map key: {other:?}")),
    }
}

/// Convert a `serde_yaml::Value` into the equivalent `serde_json::Value`.
fn yaml_to_json_value(yaml: &serde_yaml::Value) -> std::result::Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(i.into()))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(u.into()))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .map(yaml_to_json_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => mapping_to_json(map),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn tree(yaml: &str) -> ParsedTree {
        ParsedTree::from_slice(yaml.as_bytes()).unwrap()
    }

    #[test]
    fn scalars_keep_yaml_typing() {
        let doc = materialize_document(&tree(
            r#"
name: user-service
version: "1.2.3"
replicas: 3
ratio: 0.5
enabled: true
owner: ~
items:
  - one
  - 2
"#,
        ))
        .unwrap();
        let value: Value = serde_json::from_slice(doc.as_bytes()).unwrap();

        assert_eq!(value["name"], "user-service");
        assert_eq!(value["version"], "1.2.3");
        assert_eq!(value["replicas"], 3);
        assert_eq!(value["ratio"], 0.5);
        assert_eq!(value["enabled"], true);
        assert_eq!(value["owner"], Value::Null);
        assert_eq!(value["items"], json!(["one", 2]));
    }

    #[test]
    fn keys_are_sorted() {
        let schema = materialize_schema(&tree("b: 1\na: 2\nc: {z: 1, y: 2}\n")).unwrap();
        assert_eq!(schema.as_str(), r#"{"a":2,"b":1,"c":{"y":2,"z":1}}"#);
    }

    #[test]
    fn scalar_keys_are_stringified() {
        let schema = materialize_schema(&tree("1: one\ntrue: yes-flag\n")).unwrap();
        let value: Value = serde_json::from_str(schema.as_str()).unwrap();
        assert_eq!(value["1"], "one");
        assert_eq!(value["true"], "yes-flag");
    }

    #[test]
    fn tags_are_dropped() {
        let doc = materialize_document(&tree("name: !custom service\n")).unwrap();
        let value: Value = serde_json::from_slice(doc.as_bytes()).unwrap();
        assert_eq!(value["name"], "service");
    }

    #[test]
    fn nan_is_serialization_error() {
        let err = materialize_document(&tree("value: .nan\n")).unwrap_err();
        assert!(matches!(err, KaaError::Serialization { .. }), "got: {err}");
    }

    #[test]
    fn merged_anchor_is_materialized_inline() {
        let doc = materialize_document(&tree("base: &b {a: 1}\nderived:\n  <<: *b\n  c: 2\n"))
            .unwrap();
        let value: Value = serde_json::from_slice(doc.as_bytes()).unwrap();
        assert_eq!(value, json!({"base": {"a": 1}, "derived": {"a": 1, "c": 2}}));
    }

    #[test]
    fn nan_error_names_the_float() {
        let err = materialize_document(&tree("value: .nan\n")).unwrap_err();
        assert!(err.to_string().contains("cannot represent float NaN in JSON"), "got: {err}");
    }

    #[test]
    fn infinity_is_serialization_error() {
        let err = materialize_schema(&tree("maximum: .inf\n")).unwrap_err();
        assert!(err.to_string().starts_with("Cannot marshal YAML into JSON"));
    }

    #[test]
    fn sequence_key_is_serialization_error() {
        let err = materialize_document(&tree("? [a, b]\n: value\n")).unwrap_err();
        assert!(matches!(err, KaaError::Serialization { .. }), "got: {err}");
    }

    #[test]
    fn schema_and_document_encode_identically() {
        let t = tree("type: object\nrequired: [a]\n");
        let schema = materialize_schema(&t).unwrap();
        let doc = materialize_document(&t).unwrap();
        assert_eq!(schema.as_str().as_bytes(), doc.as_bytes());
    }

    fn json_leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|i| Value::Number(i.into())),
            "[a-z][a-z0-9-]{0,10}".prop_map(Value::String),
        ]
    }

    fn json_tree() -> impl Strategy<Value = Value> {
        json_leaf().prop_recursive(3, 32, 6, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,8}", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn yaml_round_trips_through_json(
            root in prop::collection::btree_map("[a-z]{1,8}", json_tree(), 1..6)
        ) {
            let expected = Value::Object(root.into_iter().collect());
            let yaml = serde_yaml::to_string(&expected).unwrap();

            let doc = materialize_document(&tree(&yaml)).unwrap();
            let actual: Value = serde_json::from_slice(doc.as_bytes()).unwrap();

            prop_assert_eq!(actual, expected);
        }
    }
}
