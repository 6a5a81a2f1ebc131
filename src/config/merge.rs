//! Deep merge of YAML configuration trees

use serde_yaml::Value;
use thiserror::Error;

/// The one failure the merge can produce: being asked to merge into a node
/// that is neither a mapping nor a sequence. Everything else degrades to a
/// logged warning so a partially malformed override file still loads.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("cannot merge {overlay} data into {base} at `{path}`: merge roots must be mappings or sequences")]
    ScalarRoot { path: String, base: &'static str, overlay: &'static str },
}

/// Recursively merge `overlay` into `base`, mutating `base` in place.
///
/// The merge is asymmetric on purpose:
/// - keys absent from `base` are adopted from `overlay` wholesale,
/// - keys holding mappings on both sides are merged recursively,
/// - keys holding sequences on both sides are concatenated (no dedup),
/// - keys holding anything else are overwritten with the overlay value.
///
/// This lets a small override file extend the subject list, change a single
/// scalar under `natsServer`, or introduce new keys, all without restating
/// the rest of the configuration.
///
/// A type mismatch below the root (mapping vs. sequence, scalar where a
/// mapping sits, ...) abandons that subtree with a warning naming `path` and
/// both types; sibling keys are still processed. Only a scalar `base` root
/// is an error.
pub fn merge(base: &mut Value, overlay: Value, path: &str) -> Result<(), MergeError> {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                let key_path = child_path(path, &key);
                match base_map.get_mut(&key) {
                    None => {
                        base_map.insert(key, value);
                    }
                    Some(existing @ (Value::Mapping(_) | Value::Sequence(_))) => {
                        merge(existing, value, &key_path)?;
                    }
                    Some(existing) => {
                        *existing = value;
                    }
                }
            }
            Ok(())
        }
        (Value::Sequence(base_seq), Value::Sequence(tail)) => {
            base_seq.extend(tail);
            Ok(())
        }
        (base @ (Value::Mapping(_) | Value::Sequence(_)), overlay) => {
            tracing::warn!(
                "incompatible types {} and {} while merging configuration at `{}`; keeping the existing value",
                node_kind(base),
                node_kind(&overlay),
                display_path(path),
            );
            Ok(())
        }
        (base, overlay) => Err(MergeError::ScalarRoot {
            path: display_path(path).into_owned(),
            base: node_kind(base),
            overlay: node_kind(&overlay),
        }),
    }
}

/// Human-readable name of a YAML node's runtime type, for diagnostics.
pub fn node_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

fn child_path(path: &str, key: &Value) -> String {
    let key = match key {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other).map_or_else(|_| "?".into(), |s| s.trim_end().to_string()),
    };
    if path.is_empty() {
        key
    } else {
        format!("{path}.{key}")
    }
}

fn display_path(path: &str) -> std::borrow::Cow<'_, str> {
    if path.is_empty() {
        "<root>".into()
    } else {
        path.into()
    }
}
