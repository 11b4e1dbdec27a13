//! Output formatting for dispatched commands
//!
//! This module renders command results and completion events for display:
//! - Compact JSON for piping and logging
//! - Pretty-printed JSON, optionally colored, for terminals

mod json;

pub use json::JsonFormatter;

use serde_json::json;

use crate::config::{DisplayConfig, OutputFormat};
use crate::dispatch::{CommandCompleted, CommandResult};

/// Formatter for command results and completion events
pub struct ResultFormatter {
    /// Output format type
    format_type: OutputFormat,

    /// JSON renderer
    json: JsonFormatter,
}

impl ResultFormatter {
    /// Create a new formatter
    ///
    /// # Arguments
    /// * `format_type` - Output format type
    /// * `use_colors` - Enable colored output
    pub fn new(format_type: OutputFormat, use_colors: bool) -> Self {
        Self {
            format_type,
            json: JsonFormatter::new(format_type.is_pretty(), use_colors, 2),
        }
    }

    /// Create a formatter from display configuration
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(config.format, config.color_output)
    }

    /// Output format in use
    pub fn format_type(&self) -> OutputFormat {
        self.format_type
    }

    /// Render the raw reply of a command
    pub fn format_result(&self, result: &CommandResult) -> String {
        self.json.format_document(&result.response)
    }

    /// Render a completion event with its reply
    pub fn format_event(&self, event: &CommandCompleted) -> String {
        let value = json!({
            "command": event.command,
            "scope": event.scope.as_str(),
            "ok": event.result.ok,
            "elapsedMs": event.elapsed_ms,
            "response": JsonFormatter::document_to_value(&event.result.response),
        });
        self.json.format_value(&value)
    }
}
