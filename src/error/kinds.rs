use std::{fmt, io};

use mongodb::bson::Document;

use crate::dispatch::ScopeLevel;
use crate::error::mongo::{command_reply, format_mongodb_error};

/// Crate-wide `Result` type using [`DispatchError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, DispatchError>;

/// Top-level error type for dispatch operations.
///
/// This type wraps more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum DispatchError {
    /// A descriptor was used against the wrong kind of target.
    Usage(UsageError),

    /// The target understood the command and rejected it.
    ///
    /// Carries the reply document the server sent back. The dispatcher turns
    /// this into a rejected outcome; it never escapes operations that run a
    /// command.
    CommandFailed(Document),

    /// Connection-related errors.
    Connection(ConnectionError),

    /// Configuration errors.
    Config(ConfigError),

    /// A command argument could not be parsed into a document.
    Parse(String),

    /// A completion listener reported a failure.
    Listener(String),

    /// I/O errors.
    Io(io::Error),

    /// MongoDB driver errors other than command rejections.
    MongoDb(mongodb::error::Error),
}

/// Misuse of the dispatcher by its caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// The descriptor's scope does not fit the handle it was run against.
    ScopeMismatch {
        expected: &'static str,
        found: ScopeLevel,
    },

    /// Nothing is selected at the requested scope.
    NoSelection(ScopeLevel),

    /// The command has no name: an empty name or an empty document.
    EmptyCommand,
}

/// Connection-specific errors.
#[derive(Debug)]
pub enum ConnectionError {
    /// Failed to establish a connection.
    ConnectionFailed(String),

    /// Invalid connection URI.
    InvalidUri(String),

    /// Not currently connected to MongoDB.
    NotConnected,

    /// Ping command failed.
    PingFailed(String),

    /// The server could not be reached while running a command.
    Unreachable(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid field value.
    InvalidValue { field: String, value: String },
}

impl DispatchError {
    /// Whether this error is a usage error rather than a runtime failure.
    pub fn is_usage(&self) -> bool {
        matches!(self, DispatchError::Usage(_))
    }
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Usage(e) => write!(f, "Usage error: {e}"),
            DispatchError::CommandFailed(reply) => write!(f, "Command failed: {reply}"),
            DispatchError::Connection(e) => write!(f, "Connection error: {e}"),
            DispatchError::Config(e) => write!(f, "Configuration error: {e}"),
            DispatchError::Parse(msg) => write!(f, "Parse error: {msg}"),
            DispatchError::Listener(msg) => write!(f, "Listener error: {msg}"),
            DispatchError::Io(e) => write!(f, "I/O error: {e}"),
            DispatchError::MongoDb(e) => format_mongodb_error(f, e),
        }
    }
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UsageError::ScopeMismatch { expected, found } => {
                write!(f, "descriptor scope '{found}' cannot run on a {expected}")
            }
            UsageError::NoSelection(scope) => write!(f, "no {scope} is selected"),
            UsageError::EmptyCommand => write!(f, "command has no name"),
        }
    }
}

impl fmt::Display for ConnectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionError::ConnectionFailed(msg) => write!(f, "Failed to connect: {msg}"),
            ConnectionError::InvalidUri(uri) => write!(f, "Invalid connection URI: {uri}"),
            ConnectionError::NotConnected => write!(f, "Not connected to MongoDB"),
            ConnectionError::PingFailed(msg) => write!(f, "Ping failed: {msg}"),
            ConnectionError::Unreachable(msg) => write!(f, "Server unreachable: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
        }
    }
}

impl std::error::Error for DispatchError {}
impl std::error::Error for UsageError {}
impl std::error::Error for ConnectionError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to DispatchError ========================= */

impl From<io::Error> for DispatchError {
    fn from(err: io::Error) -> Self {
        DispatchError::Io(err)
    }
}

/// Command rejections keep their reply; everything else stays a driver error.
impl From<mongodb::error::Error> for DispatchError {
    fn from(err: mongodb::error::Error) -> Self {
        match command_reply(&err) {
            Some(reply) => DispatchError::CommandFailed(reply),
            None => DispatchError::MongoDb(err),
        }
    }
}

impl From<UsageError> for DispatchError {
    fn from(err: UsageError) -> Self {
        DispatchError::Usage(err)
    }
}

impl From<ConnectionError> for DispatchError {
    fn from(err: ConnectionError) -> Self {
        DispatchError::Connection(err)
    }
}

impl From<ConfigError> for DispatchError {
    fn from(err: ConfigError) -> Self {
        DispatchError::Config(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_usage_error_display() {
        let err = DispatchError::from(UsageError::ScopeMismatch {
            expected: "server",
            found: ScopeLevel::Database,
        });
        assert!(err.is_usage());
        assert_eq!(
            err.to_string(),
            "Usage error: descriptor scope 'database' cannot run on a server"
        );

        let err = DispatchError::from(UsageError::NoSelection(ScopeLevel::Collection));
        assert_eq!(err.to_string(), "Usage error: no collection is selected");
    }

    #[test]
    fn test_connection_error_is_not_usage() {
        let err = DispatchError::from(ConnectionError::Unreachable("localhost:27017".into()));
        assert!(!err.is_usage());
        assert!(err.to_string().contains("localhost:27017"));
    }

    #[test]
    fn test_command_failed_display_includes_reply() {
        let err = DispatchError::CommandFailed(doc! { "ok": 0.0, "errmsg": "ns not found" });
        assert!(err.to_string().contains("ns not found"));
    }

    #[test]
    fn test_driver_command_error_becomes_command_failed() {
        let command_error: mongodb::error::CommandError = mongodb::bson::from_document(doc! {
            "code": 26,
            "codeName": "NamespaceNotFound",
            "errmsg": "ns not found",
        })
        .unwrap();
        let driver_error =
            mongodb::error::Error::from(mongodb::error::ErrorKind::Command(command_error));

        match DispatchError::from(driver_error) {
            DispatchError::CommandFailed(reply) => assert_eq!(
                reply,
                doc! {
                    "ok": 0.0,
                    "errmsg": "ns not found",
                    "code": 26,
                    "codeName": "NamespaceNotFound",
                }
            ),
            other => panic!("expected CommandFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_driver_io_error_stays_mongodb() {
        let driver_error = mongodb::error::Error::from(io::Error::new(
            io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert!(matches!(
            DispatchError::from(driver_error),
            DispatchError::MongoDb(_)
        ));
    }
}
