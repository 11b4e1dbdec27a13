//! Error handling for command dispatch.
//!
//! This module provides:
//! - The crate-wide [`DispatchError`] type and its specific kinds
//! - Extraction of the server reply carried by a driver command failure
//! - Structured JSON formatting of driver errors for display and logging
//!
//! # Example
//!
//! ```rust,no_run
//! use mongo_dispatch::error::{DispatchError, Result};
//! use mongo_dispatch::error::mongo::ErrorInfo;
//!
//! fn describe(err: &mongodb::error::Error) -> String {
//!     ErrorInfo::from_mongodb_error(err).to_json().unwrap_or_default()
//! }
//! ```

pub mod kinds;
pub mod mongo;

// Re-export commonly used types
pub use kinds::{ConfigError, ConnectionError, DispatchError, Result, UsageError};
pub use mongo::ErrorInfo;
