//! Lock-protected document store
//!
//! A `Store` binds a file path to its options. It caches nothing: every
//! operation takes the sidecar lock, reads the file fresh, applies its
//! change, writes the result back atomically and releases the lock. The lock
//! is released on every exit path, including errors.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::new("settings.json")
//!     .with_options(Options::default().with_cant_read_file_default(json!({})));
//!
//! store.set("window.width", &1280)?;
//! let width = store.get("window.width", None)?;
//! store.merge(&json!({"theme": "dark"}))?;
//! ```
//!
//! Calls on one store (or on separate stores for the same file, in this or
//! another process) are serialized by the lock. The lock is not reentrant,
//! so a store operation must never be issued from inside another one on the
//! same file.

use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::debug_span;

use crate::codec;
use crate::config::{Options, ResolvedOptions};
use crate::document;
use crate::error::{Error, Result};
use crate::lock::{lock_path_for, FileLock, LockOptions};
use crate::path::IntoKeyPath;
use crate::storage::{read_document, write_document};

/// A JSON document stored in a single file
#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
    options: Options,
    lock_options: LockOptions,
}

impl Store {
    /// Create a store for the file at `path` with default options
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: Options::default(),
            lock_options: LockOptions::default(),
        }
    }

    /// Set the store-level options
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Set the lock polling budget
    pub fn with_lock_options(mut self, lock_options: LockOptions) -> Self {
        self.lock_options = lock_options;
        self
    }

    /// A store for the same file with call-level options layered on top
    ///
    /// ```ignore
    /// store.with_overrides(&Options::default().with_indent(4)).rewrite()?;
    /// ```
    pub fn with_overrides(&self, overrides: &Options) -> Store {
        Self {
            path: self.path.clone(),
            options: self.options.merged_with(overrides),
            lock_options: self.lock_options.clone(),
        }
    }

    /// Path of the document file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the sidecar lock file
    pub fn lock_path(&self) -> PathBuf {
        lock_path_for(&self.path)
    }

    /// Store-level options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Lock polling budget
    pub fn lock_options(&self) -> &LockOptions {
        &self.lock_options
    }

    // ==================== Operations ====================

    /// Read the whole document
    pub fn read(&self) -> Result<Value> {
        self.locked("read", |options| read_document(&self.path, options))
    }

    /// Replace the whole document with `value`
    pub fn write<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value> {
        self.locked("write", |options| {
            let value = self.to_document(value)?;
            write_document(&self.path, &value, options)?;
            Ok(value)
        })
    }

    /// Get the value at `key_path`
    ///
    /// Without a default, a missing value fails with [`Error::KeyNotFound`].
    /// The file is never written.
    pub fn get(&self, key_path: impl IntoKeyPath, default: Option<Value>) -> Result<Value> {
        let key_path = key_path.into_key_path()?;
        self.locked("get", |options| {
            let doc = read_document(&self.path, options)?;
            document::get_path(&doc, &key_path, default).ok_or_else(|| Error::KeyNotFound {
                path: self.path.clone(),
                key: key_path.to_string(),
            })
        })
    }

    /// Set the value at `key_path`, creating intermediate containers
    ///
    /// Returns the updated document.
    pub fn set<T: Serialize + ?Sized>(
        &self,
        key_path: impl IntoKeyPath,
        value: &T,
    ) -> Result<Value> {
        let key_path = key_path.into_key_path()?;
        self.locked("set", |options| {
            let mut doc = read_document(&self.path, options)?;
            document::set_path(&mut doc, &key_path, self.to_document(value)?)?;
            write_document(&self.path, &doc, options)?;
            Ok(doc)
        })
    }

    /// Alias of [`Store::set`]
    #[deprecated(note = "use `Store::set`")]
    pub fn update<T: Serialize + ?Sized>(
        &self,
        key_path: impl IntoKeyPath,
        value: &T,
    ) -> Result<Value> {
        self.set(key_path, value)
    }

    /// Overwrite top-level keys with those of `partial`
    ///
    /// Nested values are replaced wholesale. Both the document and `partial`
    /// must be objects.
    pub fn merge<T: Serialize + ?Sized>(&self, partial: &T) -> Result<Value> {
        self.locked("merge", |options| {
            let mut doc = read_document(&self.path, options)?;
            let Value::Object(partial) = self.to_document(partial)? else {
                return Err(self.not_an_object("merge"));
            };
            if !document::merge_shallow(&mut doc, partial) {
                return Err(self.not_an_object("merge"));
            }
            write_document(&self.path, &doc, options)?;
            Ok(doc)
        })
    }

    /// Remove a single top-level key
    pub fn delete_key(&self, key: &str) -> Result<Value> {
        self.delete_keys(&[key])
    }

    /// Remove top-level keys
    ///
    /// When none of the keys are present the file is left untouched and the
    /// document is returned as read.
    pub fn delete_keys<S: AsRef<str>>(&self, keys: &[S]) -> Result<Value> {
        self.locked("delete_keys", |options| {
            let mut doc = read_document(&self.path, options)?;
            if document::delete_keys(&mut doc, keys) {
                write_document(&self.path, &doc, options)?;
            } else {
                tracing::debug!(path = ?self.path, "no keys removed, skipping write");
            }
            Ok(doc)
        })
    }

    /// Read the document and write it back unchanged
    ///
    /// Re-normalizes formatting, e.g. after changing the indent.
    pub fn rewrite(&self) -> Result<Value> {
        self.locked("rewrite", |options| {
            let doc = read_document(&self.path, options)?;
            write_document(&self.path, &doc, options)?;
            Ok(doc)
        })
    }

    // ==================== Internals ====================

    /// Run `body` while holding the file's lock
    fn locked<R>(
        &self,
        operation: &'static str,
        body: impl FnOnce(&ResolvedOptions) -> Result<R>,
    ) -> Result<R> {
        let span = debug_span!("jsonfile", operation, path = ?self.path);
        let _entered = span.enter();

        let options = self.options.resolve();
        let _lock = FileLock::acquire_for(&self.path, &self.lock_options)?;
        body(&options)
    }

    fn to_document<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value> {
        codec::to_document(value).map_err(|source| Error::Serialize {
            path: self.path.clone(),
            source,
        })
    }

    fn not_an_object(&self, operation: &'static str) -> Error {
        Error::NotAnObject {
            path: self.path.clone(),
            operation,
        }
    }
}
