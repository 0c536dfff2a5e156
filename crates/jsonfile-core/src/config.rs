//! Document store configuration
//!
//! Options are layered in three tiers, lowest to highest precedence:
//! 1. System defaults (`indent = 2`, strict JSON, no fallback values)
//! 2. Store-level options, given when the `Store` is created
//! 3. Call-level options, applied with `Store::with_overrides`
//!
//! Tiers are merged field by field. Fallback values are resolved after the
//! merge, so a call-level `default_value` still applies when the store sets
//! no more specific fallback.
//!
//! Options can also be loaded from a TOML file, with environment variable
//! overrides (`JSONFILE_*`) applied on request.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::Dialect;
use crate::error::{Error, Result};

/// Environment variable prefix
const ENV_PREFIX: &str = "JSONFILE";

/// Indentation used when no tier sets one
pub const DEFAULT_INDENT: usize = 2;

/// Per-store or per-call options
///
/// Every field is optional; an unset field defers to the tier below.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Options {
    /// Fallback for both unreadable and unparsable files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,

    /// Fallback when the file cannot be read; overrides `default_value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cant_read_file_default: Option<Value>,

    /// Fallback when the file cannot be decoded; overrides `default_value`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parse_error_default: Option<Value>,

    /// Pretty-print width in spaces (0 for compact output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent: Option<usize>,

    /// Text dialect of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dialect: Option<Dialect>,
}

/// Options after merging every tier and applying system defaults
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedOptions {
    pub indent: usize,
    pub dialect: Dialect,
    pub cant_read_file_default: Option<Value>,
    pub parse_error_default: Option<Value>,
}

impl Options {
    pub fn with_default_value(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_cant_read_file_default(mut self, value: Value) -> Self {
        self.cant_read_file_default = Some(value);
        self
    }

    pub fn with_parse_error_default(mut self, value: Value) -> Self {
        self.parse_error_default = Some(value);
        self
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = Some(indent);
        self
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = Some(dialect);
        self
    }

    /// Layer `overrides` on top of these options, field by field
    pub fn merged_with(&self, overrides: &Options) -> Options {
        Options {
            default_value: pick(&overrides.default_value, &self.default_value),
            cant_read_file_default: pick(
                &overrides.cant_read_file_default,
                &self.cant_read_file_default,
            ),
            parse_error_default: pick(&overrides.parse_error_default, &self.parse_error_default),
            indent: overrides.indent.or(self.indent),
            dialect: overrides.dialect.or(self.dialect),
        }
    }

    /// Apply system defaults and resolve the fallback chain
    pub fn resolve(&self) -> ResolvedOptions {
        ResolvedOptions {
            indent: self.indent.unwrap_or(DEFAULT_INDENT),
            dialect: self.dialect.unwrap_or_default(),
            cant_read_file_default: pick(&self.cant_read_file_default, &self.default_value),
            parse_error_default: pick(&self.parse_error_default, &self.default_value),
        }
    }

    /// Load options from a TOML file
    ///
    /// A missing file yields the default (empty) options. Environment
    /// overrides are not applied here; see [`Options::apply_env_overrides`].
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        Self::parse_toml(&content, path)
    }

    /// Load options from a TOML string
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        Self::parse_toml(toml_content, Path::new("<string>"))
    }

    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }

    /// Apply environment variable overrides
    ///
    /// Only `JSONFILE_INDENT` and `JSONFILE_DIALECT` are recognized. Values
    /// that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        // JSONFILE_INDENT
        if let Ok(val) = std::env::var(format!("{}_INDENT", ENV_PREFIX)) {
            if let Ok(indent) = val.trim().parse() {
                self.indent = Some(indent);
            }
        }

        // JSONFILE_DIALECT
        if let Ok(val) = std::env::var(format!("{}_DIALECT", ENV_PREFIX)) {
            if let Ok(dialect) = val.trim().parse() {
                self.dialect = Some(dialect);
            }
        }
    }

    /// Get the options file path
    ///
    /// Can be overridden with the JSONFILE_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jsonfile")
            .join("config.toml")
    }
}

fn pick(preferred: &Option<Value>, fallback: &Option<Value>) -> Option<Value> {
    preferred.clone().or_else(|| fallback.clone())
}
