//! Output formatting for CLI
//!
//! Results are printed as JSON on stdout:
//! - Pretty-printed by default
//! - On one line with --compact
//! - Not at all with --quiet

use anyhow::Result;
use serde_json::Value;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Indented JSON (default)
    Pretty,
    /// Single-line JSON
    Compact,
    /// Quiet mode - no output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(compact: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if compact {
            OutputFormat::Compact
        } else {
            OutputFormat::Pretty
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render a value, or `None` in quiet mode
    pub fn render(&self, value: &Value) -> Result<Option<String>> {
        Ok(match self.format {
            OutputFormat::Pretty => Some(serde_json::to_string_pretty(value)?),
            OutputFormat::Compact => Some(serde_json::to_string(value)?),
            OutputFormat::Quiet => None,
        })
    }

    /// Print a result value
    pub fn print_value(&self, value: &Value) -> Result<()> {
        if let Some(text) = self.render(value)? {
            println!("{}", text);
        }
        Ok(())
    }
}
