//! Command descriptors
//!
//! A descriptor pairs what to run ([`CommandSpec`]) with the scope it was
//! built for ([`ScopeLevel`]).

use std::fmt;

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// Granularity at which an administrative command is issued
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeLevel {
    /// Server-wide command, sent to the `admin` database
    Server,

    /// Database-level command
    Database,

    /// Collection-level command, sent to the owning database
    Collection,

    /// Not bound to any scope; running it is a no-op
    Unscoped,
}

impl ScopeLevel {
    /// Lowercase name used in messages and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            ScopeLevel::Server => "server",
            ScopeLevel::Database => "database",
            ScopeLevel::Collection => "collection",
            ScopeLevel::Unscoped => "unscoped",
        }
    }
}

impl fmt::Display for ScopeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The command to send: a bare name or a full command document
#[derive(Debug, Clone, PartialEq)]
pub enum CommandSpec {
    /// Command name, sent as `{ <name>: 1 }`
    Name(String),

    /// Complete command document, sent as-is
    Document(Document),
}

impl CommandSpec {
    /// Command name: the name itself, or the first key of the document
    pub fn command_name(&self) -> &str {
        match self {
            CommandSpec::Name(name) => name,
            CommandSpec::Document(doc) => doc.keys().next().map(String::as_str).unwrap_or(""),
        }
    }

    /// String identifying this command in completion events
    pub fn command_string(&self) -> String {
        match self {
            CommandSpec::Name(name) => name.clone(),
            CommandSpec::Document(doc) => doc.to_string(),
        }
    }

    /// Document sent to a database or server target
    pub fn to_document(&self) -> Document {
        match self {
            CommandSpec::Name(name) => {
                let mut command = Document::new();
                command.insert(name.as_str(), 1);
                command
            }
            CommandSpec::Document(doc) => doc.clone(),
        }
    }

    /// Document sent for a collection-level command
    ///
    /// The command field names the collection; any further fields of a
    /// document spec are carried along after it. An unnamed spec yields an
    /// empty field name; the dispatcher refuses such specs before sending.
    pub fn to_collection_document(&self, collection: &str) -> Document {
        let mut command = Document::new();
        command.insert(self.command_name(), collection);
        if let CommandSpec::Document(doc) = self {
            for (key, value) in doc.iter().skip(1) {
                command.insert(key.clone(), value.clone());
            }
        }
        command
    }
}

impl From<&str> for CommandSpec {
    fn from(name: &str) -> Self {
        CommandSpec::Name(name.to_string())
    }
}

impl From<String> for CommandSpec {
    fn from(name: String) -> Self {
        CommandSpec::Name(name)
    }
}

impl From<Document> for CommandSpec {
    fn from(doc: Document) -> Self {
        CommandSpec::Document(doc)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_string())
    }
}

/// Command descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct MongoCommand {
    /// What to run
    pub spec: CommandSpec,

    /// Scope the descriptor was built for
    pub scope: ScopeLevel,
}

impl MongoCommand {
    /// Create a new descriptor
    ///
    /// # Arguments
    /// * `spec` - Command name or document
    /// * `scope` - Scope level the command targets
    pub fn new(spec: impl Into<CommandSpec>, scope: ScopeLevel) -> Self {
        Self {
            spec: spec.into(),
            scope,
        }
    }

    /// Server-scoped descriptor
    pub fn server(spec: impl Into<CommandSpec>) -> Self {
        Self::new(spec, ScopeLevel::Server)
    }

    /// Database-scoped descriptor
    pub fn database(spec: impl Into<CommandSpec>) -> Self {
        Self::new(spec, ScopeLevel::Database)
    }

    /// Collection-scoped descriptor
    pub fn collection(spec: impl Into<CommandSpec>) -> Self {
        Self::new(spec, ScopeLevel::Collection)
    }
}

/// Read the `ok` field of a reply, whatever numeric type the server used
pub(crate) fn reply_ok(reply: &Document) -> bool {
    match reply.get("ok") {
        Some(Bson::Double(v)) => *v == 1.0,
        Some(Bson::Int32(v)) => *v == 1,
        Some(Bson::Int64(v)) => *v == 1,
        Some(Bson::Boolean(v)) => *v,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_name_spec_becomes_single_field_document() {
        let spec = CommandSpec::from("serverStatus");
        assert_eq!(spec.to_document(), doc! { "serverStatus": 1 });
        assert_eq!(spec.command_string(), "serverStatus");
        assert_eq!(spec.command_name(), "serverStatus");
    }

    #[test]
    fn test_document_spec_is_sent_unchanged() {
        let command = doc! { "listDatabases": 1, "nameOnly": true };
        let spec = CommandSpec::from(command.clone());
        assert_eq!(spec.to_document(), command);
        assert_eq!(spec.command_name(), "listDatabases");
        assert_eq!(spec.command_string(), command.to_string());
    }

    #[test]
    fn test_collection_document_names_collection() {
        let spec = CommandSpec::from("collStats");
        assert_eq!(spec.to_collection_document("users"), doc! { "collStats": "users" });
    }

    #[test]
    fn test_collection_document_keeps_extra_fields() {
        let spec = CommandSpec::from(doc! { "collStats": 1, "scale": 1024 });
        assert_eq!(
            spec.to_collection_document("users"),
            doc! { "collStats": "users", "scale": 1024 }
        );
    }

    #[test]
    fn test_empty_document_has_empty_name() {
        let spec = CommandSpec::from(Document::new());
        assert_eq!(spec.command_name(), "");
    }

    #[test]
    fn test_descriptor_constructors() {
        assert_eq!(MongoCommand::server("ping").scope, ScopeLevel::Server);
        assert_eq!(MongoCommand::database("dbStats").scope, ScopeLevel::Database);
        assert_eq!(
            MongoCommand::collection("validate").scope,
            ScopeLevel::Collection
        );
    }

    #[test]
    fn test_reply_ok_variants() {
        assert!(reply_ok(&doc! { "ok": 1.0 }));
        assert!(reply_ok(&doc! { "ok": 1 }));
        assert!(reply_ok(&doc! { "ok": 1_i64 }));
        assert!(reply_ok(&doc! { "ok": true }));
        assert!(!reply_ok(&doc! { "ok": 0.0 }));
        assert!(!reply_ok(&doc! {}));
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(ScopeLevel::Database.to_string(), "database");
        assert_eq!(ScopeLevel::Unscoped.as_str(), "unscoped");
    }
}
