//! Request builders for the three platform resources an outbound SMS
//! conversation needs: the routing flow, the chat channel with its task, and
//! the number-masking proxy session.

use serde::{Deserialize, Serialize};

use crate::contract::{ValidatedOutboundRequest, OUTBOUND_FLOW_NAME};
use crate::error::HandlerError;

pub const SMS_CHANNEL_TYPE: &str = "sms";
pub const TASK_INTEGRATION_TYPE: &str = "task";
pub const OUTBOUND_DIRECTION: &str = "outbound";
pub const PROXY_SESSION_MODE: &str = "message-only";

/// Routing target every outbound flow is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowTarget {
    pub chat_service_sid: String,
    pub workspace_sid: String,
    pub workflow_sid: String,
    pub sms_channel_sid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlexFlowSpec {
    pub friendly_name: String,
    pub chat_service_sid: String,
    pub channel_type: String,
    pub contact_identity: String,
    pub enabled: bool,
    pub integration_type: String,
    pub integration_workspace_sid: String,
    pub integration_workflow_sid: String,
    pub integration_channel: String,
    pub long_lived: bool,
    pub janitor_enabled: bool,
}

/// Disabled, short-lived, janitor-enabled sms flow named `OutboundSMS`.
pub fn outbound_flow_spec(target: &FlowTarget, contact_identity: &str) -> FlexFlowSpec {
    FlexFlowSpec {
        friendly_name: OUTBOUND_FLOW_NAME.to_string(),
        chat_service_sid: target.chat_service_sid.clone(),
        channel_type: SMS_CHANNEL_TYPE.to_string(),
        contact_identity: contact_identity.to_string(),
        enabled: false,
        integration_type: TASK_INTEGRATION_TYPE.to_string(),
        integration_workspace_sid: target.workspace_sid.clone(),
        integration_workflow_sid: target.workflow_sid.clone(),
        integration_channel: target.sms_channel_sid.clone(),
        long_lived: false,
        janitor_enabled: true,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskAttributes {
    pub to: String,
    pub direction: String,
    pub name: String,
    pub from: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_worker: Option<String>,
    pub auto_answer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelWithTaskSpec {
    pub flex_flow_sid: String,
    pub identity: String,
    pub chat_user_friendly_name: String,
    pub chat_friendly_name: String,
    pub target: String,
    pub chat_unique_name: String,
    pub long_lived: bool,
    pub task_attributes: TaskAttributes,
}

impl ChannelWithTaskSpec {
    pub fn task_attributes_json(&self) -> Result<String, HandlerError> {
        serde_json::to_string(&self.task_attributes).map_err(|error| {
            HandlerError::parse(format!("Unable to encode task attributes: {error}"))
        })
    }
}

pub fn channel_identity(to_number: &str) -> String {
    format!("SMS{to_number}")
}

pub fn chat_friendly_name(to_number: &str) -> String {
    format!("Outbound Chat with {to_number}")
}

pub fn channel_with_task_spec(
    flex_flow_sid: &str,
    request: &ValidatedOutboundRequest,
    chat_unique_name: impl Into<String>,
) -> ChannelWithTaskSpec {
    ChannelWithTaskSpec {
        flex_flow_sid: flex_flow_sid.to_string(),
        identity: channel_identity(&request.to_number),
        chat_user_friendly_name: request.to_name.clone(),
        chat_friendly_name: chat_friendly_name(&request.to_number),
        target: request.to_number.clone(),
        chat_unique_name: chat_unique_name.into(),
        long_lived: false,
        task_attributes: TaskAttributes {
            to: request.to_number.clone(),
            direction: OUTBOUND_DIRECTION.to_string(),
            name: request.to_number.clone(),
            from: request.from_number.clone(),
            target_worker: request.worker_uri.clone(),
            auto_answer: true,
            email: request.email.clone(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProxyParticipant {
    pub identifier: String,
    pub proxy_identifier: String,
    pub friendly_name: String,
}

/// A proxy session always links exactly two participants: the external
/// party and the chat channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySessionSpec {
    pub unique_name: String,
    pub mode: String,
    pub participants: [ProxyParticipant; 2],
}

/// Session named after the channel so the platform holds at most one
/// session per channel. Both participants are masked by the origin number.
pub fn proxy_session_spec(
    channel_sid: &str,
    request: &ValidatedOutboundRequest,
) -> ProxySessionSpec {
    let participant = |identifier: &str| ProxyParticipant {
        identifier: identifier.to_string(),
        proxy_identifier: request.from_number.clone(),
        friendly_name: request.to_name.clone(),
    };

    ProxySessionSpec {
        unique_name: channel_sid.to_string(),
        mode: PROXY_SESSION_MODE.to_string(),
        participants: [participant(&request.to_number), participant(channel_sid)],
    }
}
