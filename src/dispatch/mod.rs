//! Administrative command dispatch
//!
//! This module provides the layer between a front end and the MongoDB driver:
//! - Command descriptors pairing a command with its scope
//! - Target traits for servers, databases and collections
//! - The dispatcher that routes, normalizes and reports commands
//! - The completion bus front ends subscribe to
//!
//! # Example
//!
//! ```no_run
//! use mongo_dispatch::dispatch::{CommandDispatcher, CompletionBus, MongoCommand};
//!
//! # async fn run(client: mongodb::Client) -> mongo_dispatch::Result<()> {
//! let bus = CompletionBus::new();
//! let _sub = bus.subscribe(|event| {
//!     println!("{} finished at {} scope", event.command, event.scope);
//!     Ok(())
//! });
//!
//! let dispatcher = CommandDispatcher::new(bus);
//! let outcome = dispatcher
//!     .run_at_server(&MongoCommand::server("serverStatus"), &client)
//!     .await?;
//! println!("ok: {}", outcome.into_result().ok);
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod dispatcher;
pub mod events;
pub mod result;
pub mod target;


pub use command::{CommandSpec, MongoCommand, ScopeLevel};
pub use dispatcher::CommandDispatcher;
pub use events::{CommandCompleted, CompletionBus, Subscription};
pub use result::{CommandOutcome, CommandResult};
pub use target::{CollectionTarget, DatabaseTarget, DriverCollection, ScopeContext, ServerTarget};
