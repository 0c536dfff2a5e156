//! Document text codec
//!
//! Converts between file text and `serde_json::Value`. Two dialects are
//! understood when decoding: strict JSON and JSON5 (comments, trailing
//! commas, unquoted keys). Encoding always produces strict JSON, which every
//! JSON5 reader accepts.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

/// Widest indentation the encoder will emit
pub const MAX_INDENT: usize = 10;

/// Text dialect of a document file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Strict JSON
    #[default]
    Json,
    /// JSON5: comments, trailing commas and unquoted keys are accepted
    ///
    /// Only reading differs. Documents are written back as strict JSON,
    /// which is also valid JSON5, so comments do not survive a write.
    Json5,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Json => f.write_str("json"),
            Dialect::Json5 => f.write_str("json5"),
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Dialect::Json),
            "json5" => Ok(Dialect::Json5),
            other => Err(format!("unknown dialect '{other}' (expected json or json5)")),
        }
    }
}

/// Errors from decoding or encoding document text
#[derive(Error, Debug)]
pub enum CodecError {
    /// Strict JSON syntax or serialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// JSON5 syntax error
    #[error("{0}")]
    Json5(String),

    /// File content is not UTF-8
    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Decode document text in the given dialect
pub fn decode(text: &str, dialect: Dialect) -> Result<Value, CodecError> {
    match dialect {
        Dialect::Json => Ok(serde_json::from_str(text)?),
        Dialect::Json5 => {
            serde_json5::from_str(text).map_err(|e| CodecError::Json5(e.to_string()))
        }
    }
}

/// Decode raw file bytes; content that is not UTF-8 is a decode failure
pub fn decode_bytes(bytes: Vec<u8>, dialect: Dialect) -> Result<Value, CodecError> {
    let text = String::from_utf8(bytes)?;
    decode(&text, dialect)
}

/// Encode a document, pretty-printed with `indent` spaces
///
/// An indent of 0 produces compact output. Widths above [`MAX_INDENT`] are
/// clamped.
pub fn encode(value: &Value, indent: usize) -> Result<String, CodecError> {
    if indent == 0 {
        return Ok(serde_json::to_string(value)?);
    }

    let indent = " ".repeat(indent.min(MAX_INDENT));
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;

    // serde_json only ever emits UTF-8
    Ok(String::from_utf8(out)?)
}

/// Convert any serializable value into a document tree
pub fn to_document<T: Serialize + ?Sized>(value: &T) -> Result<Value, CodecError> {
    Ok(serde_json::to_value(value)?)
}
