//! Document file persistence
//!
//! Reading applies the configured fallback values when the file is missing,
//! unreadable or undecodable. Writing is atomic: content goes to a temporary
//! file in the same directory, which is then renamed over the target, so a
//! reader sees either the old document or the new one in full.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::codec;
use crate::config::ResolvedOptions;
use crate::error::{Error, Result};

/// Read and decode the document at `path`
///
/// Unreadable files fall back to `cant_read_file_default`; undecodable ones
/// to `parse_error_default`. Without a fallback the error propagates.
pub fn read_document(path: &Path, options: &ResolvedOptions) -> Result<Value> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(source) => {
            return match &options.cant_read_file_default {
                Some(default) => {
                    debug!(?path, error = %source, "unreadable file, using default");
                    Ok(default.clone())
                }
                None => Err(Error::Read {
                    path: path.to_path_buf(),
                    source,
                }),
            };
        }
    };

    match codec::decode_bytes(bytes, options.dialect) {
        Ok(value) => Ok(value),
        Err(source) => match &options.parse_error_default {
            Some(default) => {
                debug!(?path, error = %source, "undecodable file, using default");
                Ok(default.clone())
            }
            None => Err(Error::Parse {
                path: path.to_path_buf(),
                source,
            }),
        },
    }
}

/// Encode `value` and atomically replace the document at `path`
pub fn write_document(path: &Path, value: &Value, options: &ResolvedOptions) -> Result<()> {
    let text = codec::encode(value, options.indent).map_err(|source| Error::Serialize {
        path: path.to_path_buf(),
        source,
    })?;

    atomic_write(path, text.as_bytes()).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Write data to a file atomically
///
/// 1. Write to a uniquely named temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// The temporary file is removed if any step fails.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    debug!(?path, bytes = data.len(), "document written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Dialect;
    use crate::config::Options;
    use serde_json::json;
    use tempfile::TempDir;

    fn resolved(options: Options) -> ResolvedOptions {
        options.resolve()
    }

    #[test]
    fn test_atomic_write_needs_existing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested_path = temp_dir.path().join("a").join("file.json");

        let err = atomic_write(&nested_path, b"{}").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(!temp_dir.path().join("a").exists());
    }

    #[test]
    fn test_atomic_write_replaces_and_leaves_no_temp_files() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");

        atomic_write(&path, b"{\"v\": 1}").unwrap();
        atomic_write(&path, b"{\"v\": 2}").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"v\": 2}");
        let entries: Vec<_> = fs::read_dir(temp_dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_missing_without_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");

        let err = read_document(&path, &resolved(Options::default())).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_read_missing_uses_cant_read_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.json");
        let options = Options::default()
            .with_default_value(json!("general"))
            .with_cant_read_file_default(json!({"fresh": true}));

        let value = read_document(&path, &resolved(options)).unwrap();
        assert_eq!(value, json!({"fresh": true}));
    }

    #[test]
    fn test_read_malformed_without_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();

        let err = read_document(&path, &resolved(Options::default())).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_read_malformed_uses_parse_default() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let options = Options::default()
            .with_cant_read_file_default(json!("unused"))
            .with_parse_error_default(json!([]));

        let value = read_document(&path, &resolved(options)).unwrap();
        assert_eq!(value, json!([]));
    }

    #[test]
    fn test_read_malformed_falls_back_to_default_value() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.json");
        fs::write(&path, "").unwrap();

        let options = Options::default().with_default_value(json!(7));
        assert_eq!(read_document(&path, &resolved(options)).unwrap(), json!(7));
    }

    #[test]
    fn test_read_json5_dialect() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json5");
        fs::write(&path, "{ // settings\n  itParsedProperly: 42, }").unwrap();

        let options = Options::default().with_dialect(Dialect::Json5);
        let value = read_document(&path, &resolved(options)).unwrap();
        assert_eq!(value, json!({"itParsedProperly": 42}));
    }

    #[test]
    fn test_write_document_uses_indent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("doc.json");

        let options = Options::default().with_indent(4);
        write_document(&path, &json!({"x": 1}), &resolved(options)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n    \"x\": 1\n}");
    }
}
