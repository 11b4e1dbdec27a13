use mongodb::{Client, Database};

use crate::dispatch::{
    CollectionTarget, DatabaseTarget, DriverCollection, ScopeContext, ScopeLevel, ServerTarget,
};
use crate::error::{Result, UsageError};

/// The currently selected server, database and collection.
///
/// A server is always present; database and collection are optional and
/// narrow the selection.
#[derive(Debug, Clone)]
pub struct Selection {
    client: Client,
    database: Option<Database>,
    collection: Option<DriverCollection>,
}

impl Selection {
    /// Select a server.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            database: None,
            collection: None,
        }
    }

    /// Select a database on the server, clearing any collection.
    pub fn with_database(mut self, name: &str) -> Self {
        self.database = Some(self.client.database(name));
        self.collection = None;
        self
    }

    /// Select a collection in the selected database.
    pub fn with_collection(mut self, name: &str) -> Result<Self> {
        let database = self
            .database
            .clone()
            .ok_or(UsageError::NoSelection(ScopeLevel::Database))?;
        self.collection = Some(DriverCollection::new(database, name));
        Ok(self)
    }

    /// Name of the selected database, if any.
    pub fn database_name(&self) -> Option<&str> {
        self.database.as_ref().map(|db| db.name())
    }

    /// Name of the selected collection, if any.
    pub fn collection_name(&self) -> Option<&str> {
        self.collection.as_ref().map(|c| CollectionTarget::name(c))
    }
}

impl ScopeContext for Selection {
    fn current_collection(&self) -> Option<&dyn CollectionTarget> {
        self.collection.as_ref().map(|c| c as &dyn CollectionTarget)
    }

    fn current_database(&self) -> Option<&dyn DatabaseTarget> {
        self.database.as_ref().map(|db| db as &dyn DatabaseTarget)
    }

    fn current_server(&self) -> Option<&dyn ServerTarget> {
        Some(&self.client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;

    async fn client() -> Client {
        Client::with_uri_str("mongodb://localhost:27017")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_server_only_selection() {
        let selection = Selection::new(client().await);

        assert!(selection.current_server().is_some());
        assert!(selection.current_database().is_none());
        assert!(selection.current_collection().is_none());
    }

    #[tokio::test]
    async fn test_collection_selection() {
        let selection = Selection::new(client().await)
            .with_database("shop")
            .with_collection("users")
            .unwrap();

        assert_eq!(selection.database_name(), Some("shop"));
        assert_eq!(selection.collection_name(), Some("users"));

        let collection = selection.current_collection().unwrap();
        assert_eq!(collection.name(), "users");
        assert_eq!(collection.database().name(), "shop");
    }

    #[tokio::test]
    async fn test_collection_requires_database() {
        let err = Selection::new(client().await)
            .with_collection("users")
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Usage(UsageError::NoSelection(ScopeLevel::Database))
        ));
    }

    #[tokio::test]
    async fn test_switching_database_clears_collection() {
        let selection = Selection::new(client().await)
            .with_database("shop")
            .with_collection("users")
            .unwrap()
            .with_database("billing");

        assert_eq!(selection.database_name(), Some("billing"));
        assert!(selection.current_collection().is_none());
    }
}
