//! JSON rendering for MongoDB documents
//!
//! Documents are rendered as relaxed Extended JSON, so numbers stay numbers
//! while ObjectIds, dates and binaries keep their `$oid`/`$date` wrappers.

use colored_json::prelude::*;
use mongodb::bson::{Bson, Document};
use serde_json::Value;

/// JSON formatter with pretty printing support
pub struct JsonFormatter {
    /// Enable pretty printing
    pretty: bool,

    /// Indentation level
    indent: usize,

    /// Enable colored output
    use_colors: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    ///
    /// # Arguments
    /// * `pretty` - Enable pretty printing
    /// * `use_colors` - Enable colored output
    /// * `indent` - Spaces per indentation level
    pub fn new(pretty: bool, use_colors: bool, indent: usize) -> Self {
        Self {
            pretty,
            indent,
            use_colors,
        }
    }

    /// Convert a BSON document to a JSON value
    pub fn document_to_value(doc: &Document) -> Value {
        Bson::Document(doc.clone()).into_relaxed_extjson()
    }

    /// Format single document as JSON object
    pub fn format_document(&self, doc: &Document) -> String {
        self.format_value(&Self::document_to_value(doc))
    }

    /// Format an arbitrary JSON value
    pub fn format_value(&self, value: &Value) -> String {
        let json_str = if self.pretty {
            self.to_pretty_string(value)
                .unwrap_or_else(|_| value.to_string())
        } else {
            value.to_string()
        };

        // Compact JSON stays uncolored for piping
        if self.use_colors && self.pretty {
            json_str.to_colored_json_auto().unwrap_or(json_str)
        } else {
            json_str
        }
    }

    /// Serialize with the configured indentation
    fn to_pretty_string(&self, value: &Value) -> std::result::Result<String, serde_json::Error> {
        let mut buf = Vec::new();
        let indent = " ".repeat(self.indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        serde::Serialize::serialize(value, &mut ser)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(true, false, 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_compact_is_single_line() {
        let formatter = JsonFormatter::new(false, false, 2);
        let result = formatter.format_document(&doc! { "ok": 1.0 });
        assert_eq!(result, r#"{"ok":1.0}"#);

        let nested = formatter.format_document(&doc! { "a": { "b": [1, 2] }, "c": "d" });
        assert!(!nested.contains('\n'));
    }

    #[test]
    fn test_pretty_uses_indent() {
        let formatter = JsonFormatter::new(true, false, 4);
        let result = formatter.format_document(&doc! { "ok": 1 });
        assert_eq!(result, "{\n    \"ok\": 1\n}");
    }

    #[test]
    fn test_object_id_keeps_extended_json_wrapper() {
        use mongodb::bson::oid::ObjectId;
        let oid = ObjectId::parse_str("65705d84dfc3f3b5094e1f72").unwrap();
        let formatter = JsonFormatter::new(false, false, 2);
        let result = formatter.format_document(&doc! { "_id": oid });
        assert!(result.contains("$oid"));
        assert!(result.contains("65705d84dfc3f3b5094e1f72"));
    }

    #[test]
    fn test_compact_ignores_colors() {
        let formatter = JsonFormatter::new(false, true, 2);
        let result = formatter.format_document(&doc! { "a": "b" });
        assert!(!result.contains('\u{1b}'));
    }
}
