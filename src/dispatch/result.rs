//! Command result types
//!
//! This module defines how a dispatched command is reported back:
//! - CommandResult: the normalized reply, identical in shape for success and rejection
//! - CommandOutcome: which of those happened, or that nothing was dispatched

use mongodb::bson::Document;
use serde::Serialize;

use super::command::reply_ok;

/// Normalized reply of an administrative command
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CommandResult {
    /// Whether the reply reported `ok: 1`
    pub ok: bool,

    /// Server error message (`errmsg`), if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Server error code, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<i32>,

    /// Server error code name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_name: Option<String>,

    /// Raw reply document, exactly as received
    pub response: Document,
}

impl CommandResult {
    /// Build a result around a reply document without altering it
    pub fn from_response(response: Document) -> Self {
        let error_message = response.get_str("errmsg").ok().map(str::to_string);
        let code = response.get_i32("code").ok();
        let code_name = response
            .get_str("codeName")
            .ok()
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        Self {
            ok: reply_ok(&response),
            error_message,
            code,
            code_name,
            response,
        }
    }
}

/// Outcome of dispatching one command
///
/// Transport, authentication and usage failures are not outcomes; they are
/// returned as errors by the dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The target ran the command
    Success(CommandResult),

    /// The target understood the command and rejected it
    Rejected(CommandResult),

    /// The descriptor had no scope, so nothing was sent
    Skipped,
}

impl CommandOutcome {
    /// The result, unless nothing was dispatched
    pub fn result(&self) -> Option<&CommandResult> {
        match self {
            CommandOutcome::Success(result) | CommandOutcome::Rejected(result) => Some(result),
            CommandOutcome::Skipped => None,
        }
    }

    /// The result, with the empty default for a skipped dispatch
    pub fn into_result(self) -> CommandResult {
        match self {
            CommandOutcome::Success(result) | CommandOutcome::Rejected(result) => result,
            CommandOutcome::Skipped => CommandResult::default(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Success(_))
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, CommandOutcome::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn test_success_reply_is_kept_verbatim() {
        let reply = doc! { "ok": 1.0, "ns": "shop.users", "count": 42_i64, "size": 1024 };
        let result = CommandResult::from_response(reply.clone());

        assert!(result.ok);
        assert_eq!(result.response, reply);
        assert_eq!(result.error_message, None);
        assert_eq!(result.code, None);
    }

    #[test]
    fn test_rejection_fields_are_extracted() {
        let reply = doc! {
            "ok": 0.0,
            "errmsg": "no such command: 'bogus'",
            "code": 59,
            "codeName": "CommandNotFound",
        };
        let result = CommandResult::from_response(reply.clone());

        assert!(!result.ok);
        assert_eq!(result.error_message.as_deref(), Some("no such command: 'bogus'"));
        assert_eq!(result.code, Some(59));
        assert_eq!(result.code_name.as_deref(), Some("CommandNotFound"));
        assert_eq!(result.response, reply);
    }

    #[test]
    fn test_empty_code_name_is_dropped() {
        let result = CommandResult::from_response(doc! { "ok": 0, "codeName": "" });
        assert_eq!(result.code_name, None);
    }

    #[test]
    fn test_default_result_is_empty() {
        let result = CommandResult::default();
        assert!(!result.ok);
        assert!(result.response.is_empty());
    }

    #[test]
    fn test_outcome_accessors() {
        let result = CommandResult::from_response(doc! { "ok": 1 });

        let success = CommandOutcome::Success(result.clone());
        assert!(success.is_success());
        assert_eq!(success.result(), Some(&result));

        let rejected = CommandOutcome::Rejected(result.clone());
        assert!(rejected.is_rejected());
        assert_eq!(rejected.into_result(), result);

        assert_eq!(CommandOutcome::Skipped.result(), None);
        assert_eq!(CommandOutcome::Skipped.into_result(), CommandResult::default());
    }
}
