//! mongo-dispatch
//!
//! Runs a single MongoDB administrative command at server, database or
//! collection scope and prints its completion.
//!
//! # Usage
//!
//! ```bash
//! # Server scope
//! mongo-dispatch serverStatus
//!
//! # Collection scope: sends { collStats: "users" } to database "shop"
//! mongo-dispatch -d shop -C users collStats
//!
//! # Full command document
//! mongo-dispatch -d shop '{"dbStats": 1, "scale": 1024}'
//! ```

use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use mongo_dispatch::cli::CliInterface;
use mongo_dispatch::connection::{ConnectionManager, Selection};
use mongo_dispatch::dispatch::{CommandDispatcher, CompletionBus};
use mongo_dispatch::error::Result;
use mongo_dispatch::formatter::ResultFormatter;

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Main application logic
///
/// 1. Parse command-line arguments and load configuration
/// 2. Initialize logging
/// 3. Connect and select the requested database/collection
/// 4. Dispatch the command and print its completion
async fn run() -> Result<()> {
    let cli = CliInterface::new()?;
    initialize_logging(&cli);

    if let Some(path) = cli.config_path() {
        tracing::debug!("Using config file {}", path.display());
    }

    let command = cli.command()?;

    let mut conn_manager =
        ConnectionManager::new(cli.get_connection_uri(), cli.config().connection.clone());
    conn_manager.connect().await?;

    let selection = build_selection(&cli, &conn_manager)?;

    let bus = CompletionBus::new();
    let formatter = ResultFormatter::from_config(&cli.config().display);
    let _printer = bus.subscribe(move |event| {
        println!("{}", formatter.format_event(event));
        Ok(())
    });

    let dispatcher = CommandDispatcher::with_config(bus, cli.config().dispatch.clone());
    let outcome = dispatcher.run_at_current_scope(&command, &selection).await;

    conn_manager.disconnect().await?;

    if outcome?.is_rejected() {
        tracing::info!("Command '{}' was rejected by the server", command.spec);
    }
    Ok(())
}

/// Narrow the selection to the database and collection given on the command line
fn build_selection(cli: &CliInterface, conn_manager: &ConnectionManager) -> Result<Selection> {
    let mut selection = conn_manager.selection()?;
    if let Some(database) = cli.get_database() {
        selection = selection.with_database(&database);
    }
    if let Some(collection) = &cli.args().collection {
        selection = selection.with_collection(collection)?;
    }
    Ok(selection)
}

/// Initialize logging system based on verbosity level
///
/// `-v`/`--vv` win over `RUST_LOG`, which wins over the configured level.
///
/// # Arguments
/// * `cli` - CLI interface with verbosity settings
fn initialize_logging(cli: &CliInterface) {
    let flag_level = if cli.args().very_verbose {
        Some(Level::TRACE)
    } else if cli.args().verbose {
        Some(Level::DEBUG)
    } else {
        None
    };

    let filter = match flag_level {
        Some(level) => level_filter(level),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| level_filter(cli.config().logging.level.to_tracing_level())),
    };

    // Logs go to stderr so stdout stays parseable
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if cli.config().logging.timestamps {
        subscriber.init();
    } else {
        subscriber.without_time().init();
    }
}

fn level_filter(level: Level) -> EnvFilter {
    EnvFilter::default().add_directive(LevelFilter::from_level(level).into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_filter_caps_at_level() {
        assert_eq!(
            level_filter(Level::DEBUG).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(
            level_filter(Level::WARN).max_level_hint(),
            Some(LevelFilter::WARN)
        );
    }
}
