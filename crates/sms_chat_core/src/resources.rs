//! Remote platform resources as returned by its REST API (snake_case JSON).
//!
//! Only identifiers and the fields the handlers read or project are modelled;
//! the platform remains the owner of every resource.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Error body the platform returns alongside non-2xx statuses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteApiError {
    pub status: u16,
    #[serde(default)]
    pub code: Option<u32>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub more_info: Option<String>,
}

impl RemoteApiError {
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "status": self.status,
            "code": self.code,
            "message": self.message,
        });
        if let Some(more_info) = &self.more_info {
            body["more_info"] = Value::String(more_info.clone());
        }
        body
    }
}

impl std::fmt::Display for RemoteApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "HTTP {} (code {code}): {}", self.status, self.message),
            None => write!(f, "HTTP {}: {}", self.status, self.message),
        }
    }
}

impl std::error::Error for RemoteApiError {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatChannel {
    pub sid: String,
    #[serde(default)]
    pub account_sid: Option<String>,
    #[serde(default)]
    pub service_sid: Option<String>,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
    /// JSON text owned by the channel; `status` is the only key written here.
    #[serde(default)]
    pub attributes: Option<String>,
    #[serde(default, rename = "type")]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexFlow {
    pub sid: String,
    #[serde(default)]
    pub friendly_name: Option<String>,
    #[serde(default)]
    pub chat_service_sid: Option<String>,
    #[serde(default)]
    pub channel_type: Option<String>,
    #[serde(default)]
    pub contact_identity: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub integration_type: Option<String>,
    #[serde(default)]
    pub janitor_enabled: Option<bool>,
    #[serde(default)]
    pub long_lived: Option<bool>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

impl FlexFlow {
    pub fn has_name(&self, name: &str) -> bool {
        self.friendly_name.as_deref() == Some(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default)]
    pub next_page_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexFlowPage {
    #[serde(default)]
    pub flex_flows: Vec<FlexFlow>,
    #[serde(default)]
    pub meta: PageMeta,
}

/// Chat channel created through the flex channel endpoint, which also
/// creates the routing task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlexChannel {
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub account_sid: Option<String>,
    #[serde(default)]
    pub flex_flow_sid: Option<String>,
    #[serde(default)]
    pub user_sid: Option<String>,
    #[serde(default)]
    pub task_sid: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    /// Fields not modelled above, kept so the resource can be echoed back
    /// as received.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProxySession {
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub service_sid: Option<String>,
    #[serde(default)]
    pub account_sid: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    /// Lifecycle state such as `open`; numeric when the platform reports
    /// a failure in place of a session.
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub date_started: Option<String>,
    #[serde(default)]
    pub date_ended: Option<String>,
    #[serde(default)]
    pub date_last_interaction: Option<String>,
    #[serde(default)]
    pub date_expiry: Option<String>,
    #[serde(default)]
    pub closed_reason: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub links: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProxySession {
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().and_then(Value::as_str)
    }
}
