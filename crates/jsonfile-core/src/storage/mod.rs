//! Storage layer
//!
//! Handles reading the document file and replacing it atomically.
//!
//! ## Architecture
//!
//! - **Reader**: decodes the file, substituting configured defaults when the
//!   file is unreadable or undecodable
//! - **Writer**: temp file in the same directory, fsync, rename over target
//!
//! Neither side takes the lock; callers hold it around both.

pub mod persistence;

pub use persistence::{atomic_write, read_document, write_document};
