use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::HandlerError;

pub const OUTBOUND_FLOW_NAME: &str = "OutboundSMS";
pub const INACTIVE_CHANNEL_STATUS: &str = "INACTIVE";
pub const CHAT_ENDED_MESSAGE: &str = "Chat ended.";
pub const NO_BODY_MESSAGE: &str = "No body sent.";
pub const FLOW_NOT_FOUND_MESSAGE: &str = "Unable to find matching Flex Flow";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClearSessionRequest {
    #[serde(default)]
    pub channel_sid: Option<String>,
    #[serde(default)]
    pub session_sid: Option<String>,
}

impl ClearSessionRequest {
    pub fn require_channel_sid(&self) -> Result<&str, HandlerError> {
        non_empty(self.channel_sid.as_deref())
            .ok_or_else(|| HandlerError::validation("Request must include a channelSid"))
    }

    /// Checked only when the proxy session is about to be removed.
    pub fn require_session_sid(&self) -> Result<&str, HandlerError> {
        non_empty(self.session_sid.as_deref())
            .ok_or_else(|| HandlerError::validation("Request must include a sessionSid"))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateSmsChatRequest {
    #[serde(default)]
    pub to_name: Option<String>,
    #[serde(default)]
    pub to_number: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub worker_uri: Option<String>,
}

/// Outbound request with every required field present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOutboundRequest {
    pub from_number: String,
    pub to_name: String,
    pub to_number: String,
    pub email: Option<String>,
    pub worker_uri: Option<String>,
}

/// Checks the origin number, then `toName`, then `toNumber`; the first
/// missing value is reported.
pub fn validate_outbound_request(
    request: CreateSmsChatRequest,
    from_number: Option<&str>,
) -> Result<ValidatedOutboundRequest, HandlerError> {
    let Some(from_number) = non_empty(from_number) else {
        return Err(HandlerError::validation("Missing 'fromNumber' in request body"));
    };
    let Some(to_name) = non_empty(request.to_name.as_deref()) else {
        return Err(HandlerError::validation("Missing 'toName' in request body"));
    };
    let Some(to_number) = non_empty(request.to_number.as_deref()) else {
        return Err(HandlerError::validation("Missing 'toNumber' in request body"));
    };

    Ok(ValidatedOutboundRequest {
        from_number: from_number.to_string(),
        to_name: to_name.to_string(),
        to_number: to_number.to_string(),
        email: non_empty(request.email.as_deref()).map(str::to_string),
        worker_uri: non_empty(request.worker_uri.as_deref()).map(str::to_string),
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorEntry {
    pub code: u32,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeardownPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorEntry>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeardownResponseBody {
    pub success: bool,
    pub payload: TeardownPayload,
}

impl TeardownResponseBody {
    pub fn ended() -> Self {
        Self {
            success: true,
            payload: TeardownPayload {
                message: Some(CHAT_ENDED_MESSAGE.to_string()),
                errors: None,
            },
        }
    }

    pub fn failed(errors: Vec<ErrorEntry>) -> Self {
        Self {
            success: false,
            payload: TeardownPayload {
                message: None,
                errors: Some(errors),
            },
        }
    }

    /// Answer to a request carrying no parameters at all.
    pub fn no_body() -> Self {
        Self::failed(Vec::new())
    }
}

/// True when the normalized request carries no parameters.
pub fn is_empty_request(payload: &Value) -> bool {
    match payload {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|text| !text.is_empty())
}
