//! Key paths into a document
//!
//! A key path is a sequence of segments. The string form accepts dots and
//! brackets:
//!
//! ```text
//! a.b.c          -> ["a", "b", "c"]
//! items[0].name  -> ["items", "0", "name"]
//! a["x.y"]       -> ["a", "x.y"]
//! ```
//!
//! Segments are plain strings. Whether a segment addresses an array element
//! depends on the container it is applied to; see [`is_index`].

use std::fmt;

use crate::error::{Error, Result};

/// A parsed key path
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyPath {
    segments: Vec<String>,
    display: String,
}

impl KeyPath {
    /// Parse a dotted/bracketed key path
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = |reason| Error::InvalidKeyPath {
            key_path: input.to_string(),
            reason,
        };

        if input.is_empty() {
            return Err(invalid("key path is empty"));
        }

        let mut segments = Vec::new();
        let mut current = String::new();
        let mut chars = input.chars().peekable();
        // True right after a closing bracket, where only '.', '[' or the end may follow
        let mut after_bracket = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if !after_bracket {
                        if current.is_empty() {
                            return Err(invalid("empty segment"));
                        }
                        segments.push(std::mem::take(&mut current));
                    }
                    after_bracket = false;
                    if chars.peek().is_none() {
                        return Err(invalid("trailing '.'"));
                    }
                }
                '[' => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    } else if !after_bracket && !segments.is_empty() {
                        return Err(invalid("empty segment"));
                    }
                    segments.push(parse_bracket(&mut chars).map_err(invalid)?);
                    after_bracket = true;
                }
                _ if after_bracket => {
                    return Err(invalid("expected '.' or '[' after ']'"));
                }
                _ => current.push(c),
            }
        }

        if !current.is_empty() {
            segments.push(current);
        }

        Ok(Self {
            segments,
            display: input.to_string(),
        })
    }

    /// Build a key path from literal segments
    ///
    /// Segments are taken as-is; dots inside them are part of the key.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        let display = segments.join(".");
        if segments.is_empty() {
            return Err(Error::InvalidKeyPath {
                key_path: display,
                reason: "key path is empty",
            });
        }

        Ok(Self { segments, display })
    }

    /// The path's segments in order
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

/// Parse the inside of `[...]`, consuming the closing bracket
fn parse_bracket(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
) -> std::result::Result<String, &'static str> {
    let mut segment = String::new();

    match chars.peek().copied() {
        Some(quote @ ('"' | '\'')) => {
            chars.next();
            loop {
                match chars.next() {
                    Some('\\') => match chars.next() {
                        Some(escaped) => segment.push(escaped),
                        None => return Err("unterminated quoted segment"),
                    },
                    Some(c) if c == quote => break,
                    Some(c) => segment.push(c),
                    None => return Err("unterminated quoted segment"),
                }
            }
            match chars.next() {
                Some(']') => Ok(segment),
                _ => Err("expected ']' after quoted segment"),
            }
        }
        _ => {
            for c in chars.by_ref() {
                if c == ']' {
                    if segment.is_empty() {
                        return Err("empty brackets");
                    }
                    return Ok(segment);
                }
                segment.push(c);
            }
            Err("unterminated '['")
        }
    }
}

/// Interpret a segment as an array index
///
/// Only canonical non-negative integers count: `0`, `7`, `42`, but not
/// `07` or `-1`.
pub fn is_index(segment: &str) -> Option<usize> {
    let canonical = segment == "0"
        || (!segment.is_empty()
            && !segment.starts_with('0')
            && segment.bytes().all(|b| b.is_ascii_digit()));
    if canonical {
        segment.parse().ok()
    } else {
        None
    }
}

/// Anything a store operation accepts as a key path
pub trait IntoKeyPath {
    fn into_key_path(self) -> Result<KeyPath>;
}

impl IntoKeyPath for KeyPath {
    fn into_key_path(self) -> Result<KeyPath> {
        Ok(self)
    }
}

impl IntoKeyPath for &KeyPath {
    fn into_key_path(self) -> Result<KeyPath> {
        Ok(self.clone())
    }
}

impl IntoKeyPath for &str {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::parse(self)
    }
}

impl IntoKeyPath for String {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::parse(&self)
    }
}

impl IntoKeyPath for &String {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::parse(self)
    }
}

impl IntoKeyPath for &[&str] {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::from_segments(self.iter().copied())
    }
}

impl<const N: usize> IntoKeyPath for [&str; N] {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::from_segments(self)
    }
}

impl IntoKeyPath for Vec<String> {
    fn into_key_path(self) -> Result<KeyPath> {
        KeyPath::from_segments(self)
    }
}
