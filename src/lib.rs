//! MongoDB administrative command dispatch
//!
//! This library runs administrative commands at server, database or
//! collection scope on top of the `mongodb` driver. Command rejections come
//! back as ordinary results, and every completed command is announced on a
//! completion bus that front ends subscribe to.
//!
//! # Modules
//!
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `connection`: MongoDB connection management and scope selection
//! - `dispatch`: Command descriptors, targets, dispatcher and completion events
//! - `error`: Error types and handling
//! - `formatter`: Output formatting and display
//!
//! # Example
//!
//! ```no_run
//! use mongo_dispatch::config::Config;
//! use mongo_dispatch::connection::ConnectionManager;
//! use mongo_dispatch::dispatch::{CommandDispatcher, CompletionBus, MongoCommand};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let mut manager = ConnectionManager::new(
//!         "mongodb://localhost:27017".to_string(),
//!         config.connection,
//!     );
//!     manager.connect().await?;
//!
//!     let selection = manager.selection()?.with_database("shop").with_collection("users")?;
//!     let dispatcher = CommandDispatcher::new(CompletionBus::new());
//!     let outcome = dispatcher
//!         .run_at_current_scope(&MongoCommand::collection("collStats"), &selection)
//!         .await?;
//!     println!("{:?}", outcome.into_result().response);
//!
//!     manager.disconnect().await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod formatter;

// Re-export commonly used types
pub use config::Config;
pub use connection::{ConnectionManager, Selection};
pub use dispatch::{
    CommandCompleted, CommandDispatcher, CommandOutcome, CommandResult, CommandSpec,
    CompletionBus, MongoCommand, ScopeLevel,
};
pub use error::{DispatchError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
pub fn version() -> &'static str {
    VERSION
}
