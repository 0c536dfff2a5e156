//! In-memory document transforms
//!
//! Pure operations on a decoded document. `get_path` and `set_path` walk
//! arbitrarily deep key paths; `merge_shallow` and `delete_keys` only ever
//! touch top-level keys.

use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::path::{is_index, KeyPath};

/// How far past the end of an array `set_path` may write
///
/// The gap is filled with `null`, so an index beyond this fails with
/// [`Error::InvalidKeyPath`] instead of allocating the padding.
pub const MAX_INDEX_GAP: usize = 10_000;

/// Look up the value at `path`
pub fn lookup<'a>(doc: &'a Value, path: &KeyPath) -> Option<&'a Value> {
    path.segments()
        .iter()
        .try_fold(doc, |node, segment| match node {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => is_index(segment).and_then(|i| items.get(i)),
            _ => None,
        })
}

/// Resolve `path`, falling back to `default` when nothing is there
///
/// A `null` stored at the path is a value and is returned as such.
pub fn get_path(doc: &Value, path: &KeyPath, default: Option<Value>) -> Option<Value> {
    lookup(doc, path).cloned().or(default)
}

/// Store `value` at `path`, creating containers along the way
///
/// A missing or scalar intermediate becomes an array when the next segment
/// is an index and an object otherwise. Indexing past the end of an array
/// pads it with `null`, up to [`MAX_INDEX_GAP`] elements. On error `doc` may
/// already hold the containers created before the offending segment.
pub fn set_path(doc: &mut Value, path: &KeyPath, value: Value) -> Result<()> {
    let segments = path.segments();
    let mut node = doc;

    for (i, segment) in segments.iter().enumerate() {
        ensure_container(node, segment);
        let slot = child_mut(node, segment).ok_or_else(|| Error::InvalidKeyPath {
            key_path: path.to_string(),
            reason: "array index too far past the end",
        })?;

        if i + 1 == segments.len() {
            *slot = value;
            return Ok(());
        }
        node = slot;
    }
    Ok(())
}

/// Remove top-level `keys`; returns whether anything was removed
///
/// A document that is not an object has no keys to remove.
pub fn delete_keys<S: AsRef<str>>(doc: &mut Value, keys: &[S]) -> bool {
    let Value::Object(map) = doc else {
        return false;
    };

    let mut changed = false;
    for key in keys {
        changed |= map.remove(key.as_ref()).is_some();
    }
    changed
}

/// Overwrite top-level keys of `doc` with those of `partial`
///
/// Nested values are replaced, never combined. Returns `false` and leaves
/// `doc` untouched when it is not an object.
pub fn merge_shallow(doc: &mut Value, partial: Map<String, Value>) -> bool {
    let Value::Object(map) = doc else {
        return false;
    };

    for (key, value) in partial {
        map.insert(key, value);
    }
    true
}

/// Make sure `node` can hold a child named `segment`
fn ensure_container(node: &mut Value, segment: &str) {
    match node {
        Value::Object(_) => {}
        Value::Array(items) => {
            if is_index(segment).is_none() {
                let map: Map<String, Value> = std::mem::take(items)
                    .into_iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v))
                    .collect();
                *node = Value::Object(map);
            }
        }
        _ => {
            *node = if is_index(segment).is_some() {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
        }
    }
}

/// Borrow the child slot named `segment`, creating it as `null` if absent
///
/// `node` must already be a container able to hold `segment`. `None` when
/// the index lies more than [`MAX_INDEX_GAP`] past the end of an array.
fn child_mut<'a>(node: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    match node {
        Value::Array(items) => {
            let index = is_index(segment).unwrap_or(items.len());
            if index.saturating_sub(items.len()) > MAX_INDEX_GAP {
                return None;
            }
            if index >= items.len() {
                items.resize(index.checked_add(1)?, Value::Null);
            }
            items.get_mut(index)
        }
        Value::Object(map) => Some(map.entry(segment.to_string()).or_insert(Value::Null)),
        other => {
            // ensure_container always runs first
            *other = Value::Object(Map::new());
            child_mut(other, segment)
        }
    }
}
