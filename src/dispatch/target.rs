//! Command targets
//!
//! The dispatcher only needs a few capabilities from the handles it is given:
//! run a command on a database, run an admin command on a server, and know a
//! collection's name and owning database. These traits describe them, and are
//! implemented here for the `mongodb` driver types.

use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::{Client, Database};

use crate::error::Result;

/// Name of the database server-wide commands are sent to
pub const ADMIN_DATABASE: &str = "admin";

/// A database that can execute commands
///
/// A rejected command must be reported as `DispatchError::CommandFailed`
/// carrying the server reply; any other error is passed through untouched.
#[async_trait]
pub trait DatabaseTarget: Send + Sync {
    /// Database name
    fn name(&self) -> &str;

    /// Run a command against this database
    async fn run_command(&self, command: Document) -> Result<Document>;
}

/// A server that can execute admin commands
#[async_trait]
pub trait ServerTarget: Send + Sync {
    /// Run a command against the server's admin database
    async fn run_admin_command(&self, command: Document) -> Result<Document>;
}

/// A collection, known by name within its owning database
pub trait CollectionTarget: Send + Sync {
    /// Collection name
    fn name(&self) -> &str;

    /// Database the collection lives in
    fn database(&self) -> &dyn DatabaseTarget;
}

/// Source of the currently selected handles
///
/// Any of them may be absent when nothing is selected at that scope.
pub trait ScopeContext: Send + Sync {
    fn current_collection(&self) -> Option<&dyn CollectionTarget>;

    fn current_database(&self) -> Option<&dyn DatabaseTarget>;

    fn current_server(&self) -> Option<&dyn ServerTarget>;
}

#[async_trait]
impl DatabaseTarget for Database {
    fn name(&self) -> &str {
        Database::name(self)
    }

    async fn run_command(&self, command: Document) -> Result<Document> {
        Ok(Database::run_command(self, command).await?)
    }
}

#[async_trait]
impl ServerTarget for Client {
    async fn run_admin_command(&self, command: Document) -> Result<Document> {
        Ok(self.database(ADMIN_DATABASE).run_command(command).await?)
    }
}

/// Collection handle backed by a driver database
///
/// `mongodb::Collection` does not expose its database, so the pair is kept
/// together here.
#[derive(Debug, Clone)]
pub struct DriverCollection {
    database: Database,
    name: String,
}

impl DriverCollection {
    /// Create a new collection handle
    ///
    /// # Arguments
    /// * `database` - Owning database
    /// * `name` - Collection name
    pub fn new(database: Database, name: impl Into<String>) -> Self {
        Self {
            database,
            name: name.into(),
        }
    }
}

impl CollectionTarget for DriverCollection {
    fn name(&self) -> &str {
        &self.name
    }

    fn database(&self) -> &dyn DatabaseTarget {
        &self.database
    }
}
