//! Document command handlers

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use jsonfile_core::Store;

use super::parse_value;

/// Read the whole document
pub fn read(store: &Store) -> Result<Value> {
    store
        .read()
        .with_context(|| format!("Failed to read {:?}", store.path()))
}

/// Replace the whole document
pub fn write(store: &Store, raw: &str) -> Result<Value> {
    store
        .write(&parse_value(raw))
        .with_context(|| format!("Failed to write {:?}", store.path()))
}

/// Get the value at a key path
pub fn get(store: &Store, key_path: &str, fallback: Option<&str>) -> Result<Value> {
    store
        .get(key_path, fallback.map(parse_value))
        .with_context(|| format!("Failed to get \"{}\" from {:?}", key_path, store.path()))
}

/// Set the value at a key path
pub fn set(store: &Store, key_path: &str, raw: &str) -> Result<Value> {
    let value = parse_value(raw);
    debug!(key_path, %value, "setting value");
    store
        .set(key_path, &value)
        .with_context(|| format!("Failed to set \"{}\" in {:?}", key_path, store.path()))
}

/// Merge a JSON object into the top level
pub fn merge(store: &Store, raw: &str) -> Result<Value> {
    store
        .merge(&parse_value(raw))
        .with_context(|| format!("Failed to merge into {:?}", store.path()))
}

/// Remove top-level keys
pub fn delete(store: &Store, keys: &[String]) -> Result<Value> {
    store
        .delete_keys(keys)
        .with_context(|| format!("Failed to delete keys from {:?}", store.path()))
}

/// Re-write the document with the current formatting options
pub fn rewrite(store: &Store) -> Result<Value> {
    store
        .rewrite()
        .with_context(|| format!("Failed to rewrite {:?}", store.path()))
}
