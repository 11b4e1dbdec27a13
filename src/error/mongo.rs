use std::collections::HashSet;
use std::fmt;

use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{CommandError, ErrorKind};
use serde::{Deserialize, Serialize};

/// Structured error information extracted from MongoDB errors.
///
/// This is intended to be serialized to JSON and consumed by other
/// components (e.g. logging, front ends).
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub(crate) error_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) message: Option<String>,
}

impl ErrorInfo {
    /// Extract structured information from a MongoDB error using the driver API.
    pub fn from_mongodb_error(error: &mongodb::error::Error) -> Self {
        let mut info = ErrorInfo::default();

        match error.kind.as_ref() {
            ErrorKind::Command(command_error) => {
                info.error_type = Some("mongo.command_error".to_string());
                info.code = Some(command_error.code);
                info.message = Some(command_error.message.clone());
                info.name = if command_error.code_name.is_empty() {
                    get_error_name(command_error.code)
                } else {
                    Some(command_error.code_name.clone())
                };
            }
            ErrorKind::Authentication { message, .. } => {
                info.error_type = Some("mongo.authentication_error".to_string());
                info.message = Some(message.clone());
            }
            ErrorKind::InvalidArgument { message, .. } => {
                info.error_type = Some("mongo.invalid_argument".to_string());
                info.message = Some(message.clone());
            }
            ErrorKind::ServerSelection { message, .. } => {
                info.error_type = Some("mongo.server_selection_error".to_string());
                info.message = Some(message.clone());
            }
            ErrorKind::Io(io_error) => {
                info.error_type = Some("mongo.io_error".to_string());
                info.message = Some(io_error.to_string());
            }
            _ => {
                // For other error types, fall back to the Display representation.
                info.message = Some(error.to_string());
            }
        }

        info
    }

    /// Convert error info to pretty-printed JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert error info to compact JSON string (single line).
    pub fn to_json_compact(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Format MongoDB error messages as pretty JSON wrapped in an `error` field.
///
/// Used by the `Display` implementation of `DispatchError::MongoDb`.
pub fn format_mongodb_error(
    f: &mut fmt::Formatter<'_>,
    error: &mongodb::error::Error,
) -> fmt::Result {
    let info = ErrorInfo::from_mongodb_error(error);
    let wrapper = serde_json::json!({ "error": info });
    let json_output = serde_json::to_string_pretty(&wrapper).map_err(|_| fmt::Error)?;
    write!(f, "\n{json_output}")
}

/// Rebuild the reply a server sent for a rejected command.
///
/// The driver turns `ok: 0` replies into `ErrorKind::Command`, keeping the
/// code, code name and message. Returns `None` for every other error kind.
pub fn command_reply(error: &mongodb::error::Error) -> Option<Document> {
    let ErrorKind::Command(command_error) = error.kind.as_ref() else {
        return None;
    };
    Some(failure_reply(command_error, error.labels()))
}

/// Reply document for a command error and its labels, labels sorted.
fn failure_reply(command_error: &CommandError, labels: &HashSet<String>) -> Document {
    let mut reply = doc! {
        "ok": 0.0,
        "errmsg": command_error.message.clone(),
        "code": command_error.code,
        "codeName": command_error.code_name.clone(),
    };

    if !labels.is_empty() {
        let mut labels: Vec<&String> = labels.iter().collect();
        labels.sort();
        let labels: Vec<Bson> = labels.into_iter().map(|l| Bson::String(l.clone())).collect();
        reply.insert("errorLabels", labels);
    }

    reply
}

/// Get a human-readable error name from a MongoDB error code.
fn get_error_name(code: i32) -> Option<String> {
    let name = match code {
        13 => "Unauthorized",
        18 => "AuthenticationFailed",
        26 => "NamespaceNotFound",
        50 => "MaxTimeMSExpired",
        59 => "CommandNotFound",
        _ => return None,
    };

    Some(name.to_string())
}
