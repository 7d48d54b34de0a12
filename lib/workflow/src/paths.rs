//! Path extraction from sample JSON values.
//!
//! Given a node's last output, this module produces the flat list of
//! dot-addressed paths the binding picker offers. Extraction is pure and
//! depth-bounded; arrays are treated as homogeneous and only their first
//! element is sampled.

use serde_json::Value as JsonValue;
use serde::{Deserialize, Serialize};

/// Maximum characters of a string value shown in a preview.
const PREVIEW_LEN: usize = 30;

/// Default recursion bound for extraction.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// The inferred type of an addressable path.
///
/// `Constant` and `Mapped` never come out of extraction; they mark the
/// synthetic entries the binding resolver adds for constant nodes and for
/// curated `_mapped.*` re-exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    String,
    Number,
    Boolean,
    Null,
    Object,
    Array,
    Constant,
    Mapped,
}

impl PathKind {
    /// Returns true for kinds a binding can address directly.
    ///
    /// Containers are excluded from the raw-path list: a binding must
    /// resolve to a scalar the backend can substitute into a placeholder.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        matches!(self, Self::String | Self::Number | Self::Boolean)
    }
}

/// One addressable path discovered in a sample value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEntry {
    /// Dot-addressed path relative to the sampled value's root.
    pub path: String,
    /// Inferred type of the value at this path.
    pub kind: PathKind,
    /// Short human-readable preview of the value.
    pub preview: String,
}

impl PathEntry {
    fn new(path: impl Into<String>, kind: PathKind, preview: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            preview: preview.into(),
        }
    }
}

/// Flattens a JSON value into addressable paths.
///
/// - A scalar at `prefix` yields a single entry typed by its runtime type.
/// - Arrays yield one `Array` entry, then only element 0 is sampled
///   (`prefix.0`), with the depth budget decremented.
/// - Objects yield one `Object` entry per key before recursing into the
///   key's value with the depth budget decremented.
/// - Extraction returns nothing once `max_depth` reaches 0.
#[must_use]
pub fn extract_paths(value: &JsonValue, prefix: &str, max_depth: u32) -> Vec<PathEntry> {
    if max_depth == 0 {
        return Vec::new();
    }

    match value {
        JsonValue::Null => vec![PathEntry::new(prefix, PathKind::Null, "null")],
        JsonValue::Bool(b) => vec![PathEntry::new(prefix, PathKind::Boolean, b.to_string())],
        JsonValue::Number(n) => vec![PathEntry::new(prefix, PathKind::Number, n.to_string())],
        JsonValue::String(s) => vec![PathEntry::new(prefix, PathKind::String, preview_string(s))],
        JsonValue::Array(items) => {
            let mut entries = vec![PathEntry::new(
                prefix,
                PathKind::Array,
                format!("Array[{}]", items.len()),
            )];
            if let Some(first) = items.first() {
                entries.extend(extract_paths(first, &join(prefix, "0"), max_depth - 1));
            }
            entries
        }
        JsonValue::Object(map) => {
            let mut entries = Vec::new();
            for (key, child) in map {
                let child_path = join(prefix, key);
                entries.push(PathEntry::new(&child_path, PathKind::Object, "{...}"));
                entries.extend(extract_paths(child, &child_path, max_depth - 1));
            }
            entries
        }
    }
}

/// Looks up a dot-addressed path inside a value. Numeric segments index
/// into arrays.
#[must_use]
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    if path.is_empty() {
        return Some(value);
    }
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Builds a short preview for an arbitrary value, using the same forms as
/// extraction.
#[must_use]
pub fn preview_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "null".to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::String(s) => preview_string(s),
        JsonValue::Array(items) => format!("Array[{}]", items.len()),
        JsonValue::Object(_) => "{...}".to_string(),
    }
}

fn preview_string(s: &str) -> String {
    if s.chars().count() <= PREVIEW_LEN {
        s.to_string()
    } else {
        s.chars().take(PREVIEW_LEN).collect()
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{prefix}.{segment}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn scalar_types_are_inferred() {
        let value = json!({"name": "Ada", "age": 36, "active": true, "notes": null});
        let paths = extract_paths(&value, "", DEFAULT_MAX_DEPTH);

        let kind_of = |path: &str| {
            paths
                .iter()
                .filter(|e| e.path == path && e.kind != PathKind::Object)
                .map(|e| e.kind)
                .next()
                .unwrap_or_else(|| panic!("no entry for {path}"))
        };
        assert_eq!(kind_of("name"), PathKind::String);
        assert_eq!(kind_of("age"), PathKind::Number);
        assert_eq!(kind_of("active"), PathKind::Boolean);
        assert_eq!(kind_of("notes"), PathKind::Null);
    }

    #[test]
    fn long_strings_are_truncated_to_thirty_chars() {
        let value = json!("abcdefghijklmnopqrstuvwxyz0123456789");
        let paths = extract_paths(&value, "", DEFAULT_MAX_DEPTH);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].preview.chars().count(), 30);
        assert!(paths[0].preview.starts_with("abcdefghij"));
    }

    #[test]
    fn arrays_sample_only_the_first_element() {
        let items: Vec<_> = (0..1000).map(|i| json!({"n": i})).collect();
        let value = JsonValue::Array(items);
        let paths = extract_paths(&value, "", DEFAULT_MAX_DEPTH);

        assert_eq!(paths[0].kind, PathKind::Array);
        assert_eq!(paths[0].preview, "Array[1000]");
        // Only element 0 was traversed.
        assert!(paths.iter().any(|e| e.path == "0.n"));
        assert!(paths.iter().all(|e| !e.path.starts_with("1")));
    }

    #[test]
    fn empty_array_yields_only_the_container_entry() {
        let paths = extract_paths(&json!([]), "", DEFAULT_MAX_DEPTH);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].preview, "Array[0]");
    }

    #[test]
    fn depth_budget_bounds_recursion() {
        // Five levels of nesting under a depth budget of 3.
        let value = json!({"a": {"b": {"c": {"d": {"e": 1}}}}});
        let paths = extract_paths(&value, "", 3);

        let deepest = paths
            .iter()
            .map(|e| e.path.split('.').count())
            .max()
            .expect("nonempty");
        assert!(deepest <= 3, "path deeper than budget: {deepest}");
        assert!(paths.iter().all(|e| !e.path.contains("d")));
    }

    #[test]
    fn zero_depth_yields_nothing() {
        let paths = extract_paths(&json!({"a": 1}), "", 0);
        assert!(paths.is_empty());
    }

    #[test]
    fn prefix_is_prepended_to_every_path() {
        let value = json!({"inner": 2});
        let paths = extract_paths(&value, "data", DEFAULT_MAX_DEPTH);
        assert!(paths.iter().all(|e| e.path.starts_with("data.")));
    }

    #[test]
    fn object_entries_precede_their_children() {
        let value = json!({"user": {"id": 7}});
        let paths = extract_paths(&value, "", DEFAULT_MAX_DEPTH);
        let container = paths
            .iter()
            .position(|e| e.path == "user" && e.kind == PathKind::Object)
            .expect("container entry");
        let child = paths
            .iter()
            .position(|e| e.path == "user.id" && e.kind == PathKind::Number)
            .expect("child entry");
        assert!(container < child);
    }

    #[test]
    fn lookup_path_follows_objects_and_arrays() {
        let value = json!({"items": [{"sku": "a-1"}, {"sku": "b-2"}]});
        assert_eq!(
            lookup_path(&value, "items.0.sku"),
            Some(&json!("a-1"))
        );
        assert_eq!(lookup_path(&value, "items.5.sku"), None);
        assert_eq!(lookup_path(&value, ""), Some(&value));
        assert_eq!(lookup_path(&value, "missing"), None);
    }

    #[test]
    fn extraction_is_deterministic() {
        let value = json!({"b": 1, "a": {"x": true}});
        let first = extract_paths(&value, "", DEFAULT_MAX_DEPTH);
        let second = extract_paths(&value, "", DEFAULT_MAX_DEPTH);
        assert_eq!(first, second);
    }
}
