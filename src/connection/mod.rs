//! Connection management for MongoDB
//!
//! This module provides:
//! - Connection establishment and termination
//! - Connection state tracking
//! - The current server/database/collection selection

mod selection;

pub use selection::Selection;

use mongodb::bson::doc;
use mongodb::{Client, Database, options::ClientOptions};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::dispatch::target::ADMIN_DATABASE;
use crate::error::{ConnectionError, Result};

/// MongoDB connection manager
pub struct ConnectionManager {
    /// MongoDB client instance
    client: Option<Client>,

    /// Connection configuration
    config: ConnectionConfig,

    /// Current connection state
    state: Arc<RwLock<ConnectionState>>,

    /// Connection URI
    uri: String,
}

/// Connection state information
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,

    /// Currently connecting
    Connecting,

    /// Connected and ready
    Connected,

    /// Connection failed
    Failed(String),
}

impl ConnectionManager {
    /// Create a new connection manager
    ///
    /// # Arguments
    /// * `uri` - MongoDB connection URI
    /// * `config` - Connection configuration
    ///
    /// # Returns
    /// * `Self` - New connection manager instance
    pub fn new(uri: String, config: ConnectionConfig) -> Self {
        Self {
            client: None,
            config,
            state: Arc::new(RwLock::new(ConnectionState::Disconnected)),
            uri,
        }
    }

    /// Establish connection to MongoDB
    ///
    /// The client is only kept once the server has answered a ping.
    ///
    /// # Returns
    /// * `Result<()>` - Success or connection error
    pub async fn connect(&mut self) -> Result<()> {
        self.set_state(ConnectionState::Connecting).await;
        info!("Connecting to {}", self.uri);

        let options = match Self::parse_uri(&self.uri).await {
            Ok(options) => self.configure(options),
            Err(e) => {
                self.set_state(ConnectionState::Failed(e.to_string())).await;
                return Err(e);
            }
        };

        let client = match Client::with_options(options) {
            Ok(client) => client,
            Err(e) => {
                self.set_state(ConnectionState::Failed(e.to_string())).await;
                return Err(ConnectionError::ConnectionFailed(e.to_string()).into());
            }
        };

        if let Err(e) = Self::ping_client(&client).await {
            self.set_state(ConnectionState::Failed(e.to_string())).await;
            return Err(e);
        }

        self.client = Some(client);
        self.set_state(ConnectionState::Connected).await;
        info!("Connected to {}", self.uri);
        Ok(())
    }

    /// Disconnect from MongoDB
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    pub async fn disconnect(&mut self) -> Result<()> {
        if let Some(client) = self.client.take() {
            client.shutdown().await;
            debug!("Client shut down");
        }
        self.set_state(ConnectionState::Disconnected).await;
        Ok(())
    }

    /// Get a database handle
    ///
    /// # Arguments
    /// * `name` - Database name
    ///
    /// # Returns
    /// * `Result<Database>` - Database handle or error
    pub fn get_database(&self, name: &str) -> Result<Database> {
        Ok(self.get_client()?.database(name))
    }

    /// Get the MongoDB client
    ///
    /// # Returns
    /// * `Result<&Client>` - Reference to client or error
    pub fn get_client(&self) -> Result<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| ConnectionError::NotConnected.into())
    }

    /// Selection rooted at the connected server, with nothing else selected
    pub fn selection(&self) -> Result<Selection> {
        Ok(Selection::new(self.get_client()?.clone()))
    }

    /// Verify connection is alive by sending a ping
    pub async fn ping(&self) -> Result<()> {
        Self::ping_client(self.get_client()?).await
    }

    /// Get current connection state
    ///
    /// # Returns
    /// * `ConnectionState` - Current state
    pub async fn get_state(&self) -> ConnectionState {
        self.state.read().await.clone()
    }

    /// Check if currently connected
    ///
    /// # Returns
    /// * `bool` - True if connected
    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.read().await, ConnectionState::Connected)
    }

    /// Connection URI
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// Parse connection URI and create client options
    async fn parse_uri(uri: &str) -> Result<ClientOptions> {
        ClientOptions::parse(uri)
            .await
            .map_err(|e| ConnectionError::InvalidUri(format!("{uri}: {e}")).into())
    }

    /// Apply timeouts, pool sizes and app name from the configuration
    fn configure(&self, mut options: ClientOptions) -> ClientOptions {
        let timeout = Duration::from_secs(self.config.timeout);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.max_pool_size = Some(self.config.max_pool_size);
        options.min_pool_size = Some(self.config.min_pool_size);
        if options.app_name.is_none() {
            options.app_name = Some(self.config.app_name.clone());
        }
        options
    }

    /// Update connection state
    async fn set_state(&self, new_state: ConnectionState) {
        *self.state.write().await = new_state;
    }

    async fn ping_client(client: &Client) -> Result<()> {
        client
            .database(ADMIN_DATABASE)
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(|e| ConnectionError::PingFailed(e.to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DispatchError;

    #[test]
    fn test_connection_state() {
        let state = ConnectionState::Disconnected;
        assert_eq!(state, ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn test_new_manager_is_disconnected() {
        let manager = ConnectionManager::new(
            "mongodb://localhost:27017".to_string(),
            ConnectionConfig::default(),
        );

        assert!(!manager.is_connected().await);
        assert_eq!(manager.get_state().await, ConnectionState::Disconnected);
        assert!(matches!(
            manager.get_client(),
            Err(DispatchError::Connection(ConnectionError::NotConnected))
        ));
        assert!(manager.selection().is_err());
    }

    #[tokio::test]
    async fn test_invalid_uri_marks_failed() {
        let mut manager =
            ConnectionManager::new("not-a-uri".to_string(), ConnectionConfig::default());

        let err = manager.connect().await.unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Connection(ConnectionError::InvalidUri(_))
        ));
        assert!(matches!(
            manager.get_state().await,
            ConnectionState::Failed(_)
        ));
    }

    #[tokio::test]
    async fn test_configure_applies_settings() {
        let config = ConnectionConfig {
            timeout: 5,
            max_pool_size: 4,
            ..ConnectionConfig::default()
        };
        let manager = ConnectionManager::new("mongodb://localhost:27017".to_string(), config);

        let options = ClientOptions::parse("mongodb://localhost:27017").await.unwrap();
        let options = manager.configure(options);

        assert_eq!(options.connect_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.server_selection_timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.max_pool_size, Some(4));
        assert_eq!(options.app_name.as_deref(), Some("mongo-dispatch"));
    }

    #[tokio::test]
    async fn test_disconnect_without_client() {
        let mut manager = ConnectionManager::new(
            "mongodb://localhost:27017".to_string(),
            ConnectionConfig::default(),
        );
        assert!(manager.disconnect().await.is_ok());
    }
}
