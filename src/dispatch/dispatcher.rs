//! Scoped command dispatcher
//!
//! Routes a command to the driver call that fits its scope, turns command
//! rejections into ordinary results and announces every completed command on
//! the [`CompletionBus`].

use std::future::Future;
use std::time::Instant;

use tracing::{debug, warn};

use crate::config::DispatchConfig;
use crate::error::{DispatchError, Result, UsageError};

use super::command::{CommandSpec, MongoCommand, ScopeLevel};
use super::events::{CommandCompleted, CompletionBus};
use super::result::{CommandOutcome, CommandResult};
use super::target::{CollectionTarget, DatabaseTarget, ScopeContext, ServerTarget};

/// Dispatches administrative commands at server, database or collection scope
#[derive(Debug, Clone)]
pub struct CommandDispatcher {
    /// Where completion events are published
    events: CompletionBus,

    /// Dispatch behaviour settings
    config: DispatchConfig,
}

impl CommandDispatcher {
    /// Create a dispatcher with default settings
    ///
    /// # Arguments
    /// * `events` - Bus completion events are published on
    pub fn new(events: CompletionBus) -> Self {
        Self::with_config(events, DispatchConfig::default())
    }

    /// Create a dispatcher with explicit settings
    pub fn with_config(events: CompletionBus, config: DispatchConfig) -> Self {
        Self { events, config }
    }

    /// Bus completion events are published on
    pub fn events(&self) -> &CompletionBus {
        &self.events
    }

    /// Run a command against whatever is currently selected at its scope
    ///
    /// # Arguments
    /// * `cmd` - Command descriptor
    /// * `context` - Provider of the current server, database and collection
    ///
    /// # Returns
    /// * `Result<CommandOutcome>` - `Skipped` for unscoped descriptors
    pub async fn run_at_current_scope(
        &self,
        cmd: &MongoCommand,
        context: &dyn ScopeContext,
    ) -> Result<CommandOutcome> {
        match cmd.scope {
            ScopeLevel::Collection => {
                let collection = context
                    .current_collection()
                    .ok_or(UsageError::NoSelection(ScopeLevel::Collection))?;
                self.execute_collection_command(&cmd.spec, collection).await
            }
            ScopeLevel::Database => {
                let database = context
                    .current_database()
                    .ok_or(UsageError::NoSelection(ScopeLevel::Database))?;
                self.execute_database_command(&cmd.spec, database).await
            }
            ScopeLevel::Server => {
                let server = context
                    .current_server()
                    .ok_or(UsageError::NoSelection(ScopeLevel::Server))?;
                self.execute_server_command(&cmd.spec, server).await
            }
            ScopeLevel::Unscoped => {
                debug!("Skipping unscoped command '{}'", cmd.spec);
                Ok(CommandOutcome::Skipped)
            }
        }
    }

    /// Run a command on a given server
    ///
    /// Database-scoped descriptors are refused without contacting the server.
    pub async fn run_at_server(
        &self,
        cmd: &MongoCommand,
        server: &dyn ServerTarget,
    ) -> Result<CommandOutcome> {
        if cmd.scope == ScopeLevel::Database {
            return Err(UsageError::ScopeMismatch {
                expected: "server",
                found: cmd.scope,
            }
            .into());
        }
        self.execute_server_command(&cmd.spec, server).await
    }

    /// Run a command on a given database
    ///
    /// Only database-scoped descriptors are accepted.
    pub async fn run_at_database(
        &self,
        cmd: &MongoCommand,
        database: &dyn DatabaseTarget,
    ) -> Result<CommandOutcome> {
        if cmd.scope != ScopeLevel::Database {
            return Err(UsageError::ScopeMismatch {
                expected: "database",
                found: cmd.scope,
            }
            .into());
        }
        self.execute_database_command(&cmd.spec, database).await
    }

    /// Execute a command on a database, without scope validation
    pub async fn execute_database_command(
        &self,
        command: &CommandSpec,
        database: &dyn DatabaseTarget,
    ) -> Result<CommandOutcome> {
        ensure_named(command)?;
        debug!(
            "Running '{}' on database '{}'",
            command.command_name(),
            database.name()
        );

        self.dispatch(
            command.command_string(),
            ScopeLevel::Database,
            database.run_command(command.to_document()),
        )
        .await
    }

    /// Execute a command on a collection, without scope validation
    ///
    /// The command is sent to the owning database as
    /// `{ <command>: <collection name> }`. Its completion is reported at
    /// database scope unless `report_collection_scope` is set.
    pub async fn execute_collection_command(
        &self,
        command: &CommandSpec,
        collection: &dyn CollectionTarget,
    ) -> Result<CommandOutcome> {
        ensure_named(command)?;
        let database = collection.database();
        debug!(
            "Running '{}' on collection '{}.{}'",
            command.command_name(),
            database.name(),
            collection.name()
        );

        let scope = if self.config.report_collection_scope {
            ScopeLevel::Collection
        } else {
            ScopeLevel::Database
        };

        self.dispatch(
            command.command_name().to_string(),
            scope,
            database.run_command(command.to_collection_document(collection.name())),
        )
        .await
    }

    /// Execute a command on a server's admin database, without scope validation
    pub async fn execute_server_command(
        &self,
        command: &CommandSpec,
        server: &dyn ServerTarget,
    ) -> Result<CommandOutcome> {
        ensure_named(command)?;
        debug!("Running '{}' on server", command.command_name());

        self.dispatch(
            command.command_string(),
            ScopeLevel::Server,
            server.run_admin_command(command.to_document()),
        )
        .await
    }

    /// Await a target call, normalize its reply and publish the completion
    async fn dispatch<F>(
        &self,
        command: String,
        scope: ScopeLevel,
        call: F,
    ) -> Result<CommandOutcome>
    where
        F: Future<Output = Result<mongodb::bson::Document>>,
    {
        let start = Instant::now();
        let reply = call.await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let outcome = normalize(reply)?;
        if let CommandOutcome::Rejected(result) = &outcome {
            warn!(
                "Command '{}' rejected at {} scope: {} ({})",
                command,
                scope,
                result.error_message.as_deref().unwrap_or("no message"),
                result.code_name.as_deref().unwrap_or("unknown code")
            );
        }
        if elapsed_ms > self.config.slow_command_ms {
            warn!("Command '{}' took {}ms", command, elapsed_ms);
        } else {
            debug!("Command '{}' completed in {}ms", command, elapsed_ms);
        }

        let event = CommandCompleted {
            command,
            scope,
            result: outcome.result().cloned().unwrap_or_default(),
            elapsed_ms,
        };
        self.events.publish(&event)?;

        Ok(outcome)
    }
}

/// Refuse commands without a name before anything is sent
fn ensure_named(command: &CommandSpec) -> Result<()> {
    if command.command_name().is_empty() {
        return Err(UsageError::EmptyCommand.into());
    }
    Ok(())
}

/// Convert a target reply into an outcome
///
/// Only command rejections are absorbed; every other error is returned as is.
fn normalize(reply: Result<mongodb::bson::Document>) -> Result<CommandOutcome> {
    match reply {
        Ok(response) => Ok(CommandOutcome::Success(CommandResult::from_response(
            response,
        ))),
        Err(DispatchError::CommandFailed(response)) => Ok(CommandOutcome::Rejected(
            CommandResult::from_response(response),
        )),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConnectionError;
    use mongodb::bson::doc;

    #[test]
    fn test_ensure_named() {
        assert!(ensure_named(&CommandSpec::from("dbStats")).is_ok());
        assert!(matches!(
            ensure_named(&CommandSpec::from("")),
            Err(DispatchError::Usage(UsageError::EmptyCommand))
        ));
        assert!(matches!(
            ensure_named(&CommandSpec::Document(mongodb::bson::Document::new())),
            Err(DispatchError::Usage(UsageError::EmptyCommand))
        ));
    }

    #[test]
    fn test_normalize_success() {
        let reply = doc! { "ok": 1.0, "version": "7.0.4" };
        let outcome = normalize(Ok(reply.clone())).unwrap();
        assert!(outcome.is_success());
        assert_eq!(outcome.result().unwrap().response, reply);
    }

    #[test]
    fn test_normalize_rejection() {
        let reply = doc! { "ok": 0.0, "errmsg": "unauthorized", "code": 13 };
        let outcome = normalize(Err(DispatchError::CommandFailed(reply.clone()))).unwrap();
        assert!(outcome.is_rejected());
        assert_eq!(outcome.result().unwrap().response, reply);
    }

    #[test]
    fn test_normalize_passes_transport_errors_through() {
        let err = normalize(Err(ConnectionError::Unreachable("db1:27017".into()).into()))
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Connection(ConnectionError::Unreachable(_))
        ));
    }
}
