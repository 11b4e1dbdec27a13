//! Command-line interface for mongo-dispatch
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading, validation and overrides
//! - Turning the positional command into a descriptor
//! - Choosing the scope the command runs at

use bson::Bson;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};

use crate::config::{Config, OutputFormat};
use crate::dispatch::{CommandSpec, MongoCommand, ScopeLevel};
use crate::error::{DispatchError, Result};

/// Extract database name from MongoDB connection URI
///
/// # Arguments
/// * `uri` - MongoDB connection URI
///
/// # Returns
/// * `Option<String>` - Database name if found in URI
fn extract_database_from_uri(uri: &str) -> Option<String> {
    // Format: mongodb://[username:password@]host[:port][/database][?options]
    let after_scheme = uri.split("://").nth(1)?;
    let path_part = after_scheme.split('/').nth(1)?;
    let db_name = path_part.split('?').next().unwrap_or("");
    if db_name.is_empty() {
        None
    } else {
        Some(db_name.to_string())
    }
}

/// Scope selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScopeArg {
    Server,
    Database,
    Collection,
}

impl From<ScopeArg> for ScopeLevel {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Server => ScopeLevel::Server,
            ScopeArg::Database => ScopeLevel::Database,
            ScopeArg::Collection => ScopeLevel::Collection,
        }
    }
}

/// Run a MongoDB administrative command at server, database or collection scope
#[derive(Parser, Debug)]
#[command(
    name = "mongo-dispatch",
    version,
    about = "Run MongoDB administrative commands at a chosen scope",
    long_about = "Runs one administrative command against a server, database or collection.
Rejected commands are printed like any other reply; connection and
authentication failures end with a non-zero exit code."
)]
pub struct CliArgs {
    /// Command name (e.g. serverStatus) or a JSON command document
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// MongoDB connection URI
    ///
    /// Format: mongodb://[username:password@]host[:port][/database][?options]
    #[arg(long, value_name = "URI")]
    pub uri: Option<String>,

    /// Database to select
    #[arg(short = 'd', long, value_name = "NAME")]
    pub database: Option<String>,

    /// Collection to select (requires a database)
    #[arg(short = 'C', long, value_name = "NAME")]
    pub collection: Option<String>,

    /// Scope to run at (default: narrowest selected)
    #[arg(short = 's', long, value_enum)]
    pub scope: Option<ScopeArg>,

    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Output format (json, json-pretty)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Report collection commands at collection scope
    #[arg(long)]
    pub report_collection_scope: bool,

    /// Connection timeout in seconds
    #[arg(long, value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Verbose mode (detailed logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv")]
    pub very_verbose: bool,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Create a new CLI interface from the process arguments
    ///
    /// # Returns
    /// * `Result<Self>` - New CLI interface or error
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Create a CLI interface from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and apply argument overrides
    ///
    /// # Arguments
    /// * `args` - Command-line arguments
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;

        if let Some(format) = &args.format {
            config.display.format = format.parse::<OutputFormat>()?;
        }
        if args.no_color {
            config.display.color_output = false;
        }
        if let Some(timeout) = args.timeout {
            config.connection.timeout = timeout;
        }
        if args.report_collection_scope {
            config.dispatch.report_collection_scope = true;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parsed arguments
    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Effective configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Path of the configuration file given on the command line
    pub fn config_path(&self) -> Option<&Path> {
        self.args.config_file.as_deref()
    }

    /// Connection URI: the argument, or the configured default
    pub fn get_connection_uri(&self) -> String {
        self.args
            .uri
            .clone()
            .unwrap_or_else(|| self.config.connection.default_uri.clone())
    }

    /// Database to select: the argument, or the one named in the URI
    pub fn get_database(&self) -> Option<String> {
        self.args
            .database
            .clone()
            .or_else(|| extract_database_from_uri(&self.get_connection_uri()))
    }

    /// Scope to run at
    ///
    /// An explicit `--scope` wins; otherwise the narrowest selection does.
    pub fn get_scope(&self) -> ScopeLevel {
        match self.args.scope {
            Some(scope) => scope.into(),
            None if self.args.collection.is_some() => ScopeLevel::Collection,
            None if self.get_database().is_some() => ScopeLevel::Database,
            None => ScopeLevel::Server,
        }
    }

    /// Build the command descriptor from the positional argument
    pub fn command(&self) -> Result<MongoCommand> {
        Ok(MongoCommand::new(
            parse_command(&self.args.command)?,
            self.get_scope(),
        ))
    }
}

/// Parse a command argument: a JSON object becomes a document, anything else a name
pub fn parse_command(input: &str) -> Result<CommandSpec> {
    let trimmed = input.trim();
    if !trimmed.starts_with('{') {
        if trimmed.is_empty() {
            return Err(DispatchError::Parse("command must not be empty".to_string()));
        }
        return Ok(CommandSpec::Name(trimmed.to_string()));
    }

    let value: serde_json::Value = serde_json::from_str(trimmed)
        .map_err(|e| DispatchError::Parse(format!("invalid command document: {e}")))?;
    match Bson::try_from(value) {
        Ok(Bson::Document(doc)) if !doc.is_empty() => Ok(CommandSpec::Document(doc)),
        Ok(Bson::Document(_)) => Err(DispatchError::Parse(
            "command document must not be empty".to_string(),
        )),
        Ok(other) => Err(DispatchError::Parse(format!(
            "command must be a document, got {other}"
        ))),
        Err(e) => Err(DispatchError::Parse(format!("invalid command document: {e}"))),
    }
}
