//! jsonfile Core Library
//!
//! A JSON document kept in a single file, safe to read and modify from
//! several cooperating processes at once.
//!
//! # Architecture
//!
//! - **Lock**: advisory sidecar file (`<file>.lock`) created exclusively to
//!   acquire, deleted to release
//! - **Atomic writes**: temp file in the same directory, renamed over the
//!   target, so readers never see a partial document
//! - **Read-modify-write**: every operation locks, reads fresh from disk,
//!   mutates, writes and unlocks
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::new("settings.json")
//!     .with_options(Options::default().with_default_value(json!({})));
//!
//! store.set("editor.tab_width", &4)?;
//! store.merge(&json!({"theme": "dark"}))?;
//! let width = store.get("editor.tab_width", None)?;
//! store.delete_key("theme")?;
//! ```
//!
//! # Modules
//!
//! - `store`: the lock-protected facade (main entry point)
//! - `async_store`: the same operations for tokio callers
//! - `lock`: sidecar lock acquisition and release
//! - `storage`: document reading and atomic writing
//! - `document`: in-memory path and top-level key transforms
//! - `path`: key path parsing
//! - `codec`: JSON / JSON5 text handling
//! - `config`: layered options

pub mod async_store;
pub mod codec;
pub mod config;
pub mod document;
pub mod error;
pub mod lock;
pub mod path;
pub mod storage;
pub mod store;

pub use async_store::AsyncStore;
pub use codec::{CodecError, Dialect};
pub use config::{Options, ResolvedOptions};
pub use error::{Error, Result};
pub use lock::{lock_path_for, FileLock, LockOptions};
pub use path::{IntoKeyPath, KeyPath};
pub use store::Store;
