use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use crate::contract::ErrorEntry;
use crate::resources::RemoteApiError;

/// Error code reported for missing request parameters and empty bodies.
pub const VALIDATION_ERROR_CODE: u32 = 60200;
pub const DEFAULT_ERROR_CODE: u32 = 500;
pub const DEFAULT_ERROR_STATUS: u16 = 500;
pub const CONFLICT_ERROR_STATUS: u16 = 409;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    RemoteNotFound,
    RemoteRejected,
    Conflict,
    Transport,
    Parse,
    LogicalAbsence,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::RemoteNotFound => "remote_not_found",
            Self::RemoteRejected => "remote_rejected",
            Self::Conflict => "conflict",
            Self::Transport => "transport",
            Self::Parse => "parse",
            Self::LogicalAbsence => "logical_absence",
        }
    }
}

/// Failure of a single handler step, carrying everything needed to render
/// the HTTP response.
///
/// `body` holds a failure body that must be returned verbatim (raw platform
/// errors, resources missing their `sid`); when absent, renderers fall back
/// to a `{status, message}` object.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct HandlerError {
    pub kind: ErrorKind,
    pub http_status: u16,
    pub code: u32,
    pub message: String,
    pub body: Option<Value>,
}

impl HandlerError {
    fn new(kind: ErrorKind, http_status: u16, code: u32, message: impl Into<String>) -> Self {
        Self {
            kind,
            http_status,
            code,
            message: message.into(),
            body: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, 400, VALIDATION_ERROR_CODE, message)
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Parse,
            DEFAULT_ERROR_STATUS,
            DEFAULT_ERROR_CODE,
            message,
        )
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Transport,
            DEFAULT_ERROR_STATUS,
            DEFAULT_ERROR_CODE,
            message,
        )
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::Conflict,
            CONFLICT_ERROR_STATUS,
            u32::from(CONFLICT_ERROR_STATUS),
            message,
        )
    }

    pub fn logical_absence(http_status: u16, message: impl Into<String>) -> Self {
        Self::new(
            ErrorKind::LogicalAbsence,
            http_status,
            DEFAULT_ERROR_CODE,
            message,
        )
    }

    /// A platform call that returned successfully but without the resource
    /// `sid`. The status comes from the resource's own numeric `status`
    /// field when it holds a valid HTTP status.
    pub fn missing_sid(resource: &str, raw: Value) -> Self {
        let http_status = raw
            .get("status")
            .and_then(Value::as_u64)
            .and_then(valid_http_status)
            .unwrap_or(DEFAULT_ERROR_STATUS);
        Self::logical_absence(http_status, format!("Created {resource} has no sid"))
            .with_body(raw)
    }

    pub fn from_remote(error: RemoteApiError) -> Self {
        let kind = if error.status == 404 {
            ErrorKind::RemoteNotFound
        } else {
            ErrorKind::RemoteRejected
        };
        let http_status =
            valid_http_status(u64::from(error.status)).unwrap_or(DEFAULT_ERROR_STATUS);
        let body = error.to_body();
        Self::new(
            kind,
            http_status,
            error.code.unwrap_or(DEFAULT_ERROR_CODE),
            error.message,
        )
        .with_body(body)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Body used by the outbound-SMS handler: the raw failure body when one
    /// was captured, otherwise `{status, message}`.
    pub fn response_body(&self) -> Value {
        self.body.clone().unwrap_or_else(|| {
            json!({
                "status": self.http_status,
                "message": self.message,
            })
        })
    }

    pub fn error_entry(&self) -> ErrorEntry {
        ErrorEntry {
            code: self.code,
            message: self.message.clone(),
        }
    }
}

fn valid_http_status(value: u64) -> Option<u16> {
    if (100..=599).contains(&value) {
        u16::try_from(value).ok()
    } else {
        None
    }
}
