use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};
use sms_chat_core::outbound::{ChannelWithTaskSpec, FlexFlowSpec, ProxySessionSpec};
use sms_chat_core::resources::{
    ChatChannel, FlexChannel, FlexFlow, ProxySession, RemoteApiError,
};

use crate::adapters::platform::{CommsPlatform, PlatformError};

pub const CREATED_FLOW_SID: &str = "FO_CREATED";
pub const CREATED_CHANNEL_SID: &str = "CH_CREATED";
pub const CREATED_SESSION_SID: &str = "KC_CREATED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchChatChannel,
    UpdateChatChannel,
    RemoveProxySession,
    FetchProxySession,
    CreateProxySession,
    ListFlexFlows,
    FetchFlexFlow,
    CreateFlexFlow,
    CreateFlexChannel,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    FetchChatChannel { channel_sid: String },
    UpdateChatChannel { channel_sid: String, attributes: String },
    RemoveProxySession { session_sid: String },
    FetchProxySession { sid_or_unique_name: String },
    CreateProxySession(ProxySessionSpec),
    ListFlexFlows,
    FetchFlexFlow { flex_flow_sid: String },
    CreateFlexFlow(FlexFlowSpec),
    CreateFlexChannel(ChannelWithTaskSpec),
}

impl PlatformCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::FetchChatChannel { .. } => Operation::FetchChatChannel,
            Self::UpdateChatChannel { .. } => Operation::UpdateChatChannel,
            Self::RemoveProxySession { .. } => Operation::RemoveProxySession,
            Self::FetchProxySession { .. } => Operation::FetchProxySession,
            Self::CreateProxySession(_) => Operation::CreateProxySession,
            Self::ListFlexFlows => Operation::ListFlexFlows,
            Self::FetchFlexFlow { .. } => Operation::FetchFlexFlow,
            Self::CreateFlexFlow(_) => Operation::CreateFlexFlow,
            Self::CreateFlexChannel(_) => Operation::CreateFlexChannel,
        }
    }
}

/// In-memory platform that records every call in order.
#[derive(Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
    channels: Mutex<HashMap<String, ChatChannel>>,
    flows: Mutex<Vec<FlexFlow>>,
    sessions: Mutex<Vec<ProxySession>>,
    failures: Mutex<HashMap<Operation, RemoteApiError>>,
    without_sid: Mutex<Vec<Operation>>,
    reported_status: Mutex<HashMap<Operation, u16>>,
    concurrent_flow: Mutex<Option<FlexFlow>>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(self, channel_sid: &str, attributes: &str) -> Self {
        self.channels.lock().expect("poisoned mutex").insert(
            channel_sid.to_string(),
            ChatChannel {
                sid: channel_sid.to_string(),
                attributes: Some(attributes.to_string()),
                ..ChatChannel::default()
            },
        );
        self
    }

    pub fn with_flow(self, sid: &str, friendly_name: &str, date_created: &str) -> Self {
        self.flows
            .lock()
            .expect("poisoned mutex")
            .push(flow(sid, friendly_name, date_created));
        self
    }

    pub fn with_session(self, sid: &str, unique_name: &str) -> Self {
        self.sessions.lock().expect("poisoned mutex").push(ProxySession {
            sid: Some(sid.to_string()),
            unique_name: Some(unique_name.to_string()),
            ..ProxySession::default()
        });
        self
    }

    /// Flow another request creates at the same time as ours; it shows up
    /// in listings only after our own create call.
    pub fn with_concurrent_flow(self, sid: &str, date_created: &str) -> Self {
        *self.concurrent_flow.lock().expect("poisoned mutex") =
            Some(flow(sid, sms_chat_core::contract::OUTBOUND_FLOW_NAME, date_created));
        self
    }

    pub fn failing(self, operation: Operation, status: u16, code: u32, message: &str) -> Self {
        self.failures.lock().expect("poisoned mutex").insert(
            operation,
            RemoteApiError {
                status,
                code: Some(code),
                message: message.to_string(),
                more_info: None,
            },
        );
        self
    }

    pub fn returning_without_sid(self, operation: Operation) -> Self {
        self.without_sid
            .lock()
            .expect("poisoned mutex")
            .push(operation);
        self
    }

    /// Created resource comes back without a sid and with a numeric
    /// `status` in its body.
    pub fn returning_status_without_sid(self, operation: Operation, status: u16) -> Self {
        self.reported_status
            .lock()
            .expect("poisoned mutex")
            .insert(operation, status);
        self.returning_without_sid(operation)
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    pub fn operations(&self) -> Vec<Operation> {
        self.calls().iter().map(PlatformCall::operation).collect()
    }

    pub fn channel_attributes(&self, channel_sid: &str) -> Option<String> {
        self.channels
            .lock()
            .expect("poisoned mutex")
            .get(channel_sid)
            .and_then(|channel| channel.attributes.clone())
    }

    fn record(&self, call: PlatformCall) -> Result<(), PlatformError> {
        let operation = call.operation();
        self.calls.lock().expect("poisoned mutex").push(call);
        match self.failures.lock().expect("poisoned mutex").get(&operation) {
            Some(error) => Err(PlatformError::Api(error.clone())),
            None => Ok(()),
        }
    }

    fn reported_status(&self, operation: Operation) -> Option<Value> {
        self.reported_status
            .lock()
            .expect("poisoned mutex")
            .get(&operation)
            .map(|status| json!(status))
    }

    fn sid_for(&self, operation: Operation, sid: &str) -> Option<String> {
        if self
            .without_sid
            .lock()
            .expect("poisoned mutex")
            .contains(&operation)
        {
            None
        } else {
            Some(sid.to_string())
        }
    }
}

fn flow(sid: &str, friendly_name: &str, date_created: &str) -> FlexFlow {
    FlexFlow {
        sid: sid.to_string(),
        friendly_name: Some(friendly_name.to_string()),
        chat_service_sid: Some("IS1".to_string()),
        date_created: Some(date_created.to_string()),
        ..FlexFlow::default()
    }
}

fn not_found(message: String) -> PlatformError {
    PlatformError::Api(RemoteApiError {
        status: 404,
        code: Some(20404),
        message,
        more_info: None,
    })
}

#[async_trait]
impl CommsPlatform for RecordingPlatform {
    async fn fetch_chat_channel(
        &self,
        _chat_service_sid: &str,
        channel_sid: &str,
    ) -> Result<ChatChannel, PlatformError> {
        self.record(PlatformCall::FetchChatChannel {
            channel_sid: channel_sid.to_string(),
        })?;
        self.channels
            .lock()
            .expect("poisoned mutex")
            .get(channel_sid)
            .cloned()
            .ok_or_else(|| not_found(format!("Channel {channel_sid} was not found")))
    }

    async fn update_chat_channel_attributes(
        &self,
        _chat_service_sid: &str,
        channel_sid: &str,
        attributes: &str,
    ) -> Result<ChatChannel, PlatformError> {
        self.record(PlatformCall::UpdateChatChannel {
            channel_sid: channel_sid.to_string(),
            attributes: attributes.to_string(),
        })?;
        let mut channels = self.channels.lock().expect("poisoned mutex");
        let channel = channels
            .get_mut(channel_sid)
            .ok_or_else(|| not_found(format!("Channel {channel_sid} was not found")))?;
        channel.attributes = Some(attributes.to_string());
        Ok(channel.clone())
    }

    async fn remove_proxy_session(
        &self,
        _proxy_service_sid: &str,
        session_sid: &str,
    ) -> Result<(), PlatformError> {
        self.record(PlatformCall::RemoveProxySession {
            session_sid: session_sid.to_string(),
        })?;
        self.sessions
            .lock()
            .expect("poisoned mutex")
            .retain(|session| session.sid.as_deref() != Some(session_sid));
        Ok(())
    }

    async fn fetch_proxy_session(
        &self,
        _proxy_service_sid: &str,
        sid_or_unique_name: &str,
    ) -> Result<Option<ProxySession>, PlatformError> {
        self.record(PlatformCall::FetchProxySession {
            sid_or_unique_name: sid_or_unique_name.to_string(),
        })?;
        Ok(self
            .sessions
            .lock()
            .expect("poisoned mutex")
            .iter()
            .find(|session| {
                session.sid.as_deref() == Some(sid_or_unique_name)
                    || session.unique_name.as_deref() == Some(sid_or_unique_name)
            })
            .cloned())
    }

    async fn create_proxy_session(
        &self,
        proxy_service_sid: &str,
        spec: &ProxySessionSpec,
    ) -> Result<ProxySession, PlatformError> {
        self.record(PlatformCall::CreateProxySession(spec.clone()))?;
        let status = self
            .reported_status(Operation::CreateProxySession)
            .unwrap_or_else(|| json!("open"));
        let session = ProxySession {
            sid: self.sid_for(Operation::CreateProxySession, CREATED_SESSION_SID),
            service_sid: Some(proxy_service_sid.to_string()),
            unique_name: Some(spec.unique_name.clone()),
            mode: Some(spec.mode.clone()),
            status: Some(status),
            ..ProxySession::default()
        };
        self.sessions
            .lock()
            .expect("poisoned mutex")
            .push(session.clone());
        Ok(session)
    }

    async fn list_flex_flows(&self) -> Result<Vec<FlexFlow>, PlatformError> {
        self.record(PlatformCall::ListFlexFlows)?;
        Ok(self.flows.lock().expect("poisoned mutex").clone())
    }

    async fn fetch_flex_flow(&self, flex_flow_sid: &str) -> Result<FlexFlow, PlatformError> {
        self.record(PlatformCall::FetchFlexFlow {
            flex_flow_sid: flex_flow_sid.to_string(),
        })?;
        self.flows
            .lock()
            .expect("poisoned mutex")
            .iter()
            .find(|flow| flow.sid == flex_flow_sid)
            .cloned()
            .ok_or_else(|| not_found(format!("Flex flow {flex_flow_sid} was not found")))
    }

    async fn create_flex_flow(&self, spec: &FlexFlowSpec) -> Result<FlexFlow, PlatformError> {
        self.record(PlatformCall::CreateFlexFlow(spec.clone()))?;
        let created = FlexFlow {
            sid: CREATED_FLOW_SID.to_string(),
            friendly_name: Some(spec.friendly_name.clone()),
            chat_service_sid: Some(spec.chat_service_sid.clone()),
            channel_type: Some(spec.channel_type.clone()),
            enabled: Some(spec.enabled),
            date_created: Some("2024-06-01T00:00:00Z".to_string()),
            ..FlexFlow::default()
        };
        let mut flows = self.flows.lock().expect("poisoned mutex");
        flows.push(created.clone());
        if let Some(concurrent) = self.concurrent_flow.lock().expect("poisoned mutex").take() {
            flows.push(concurrent);
        }
        Ok(created)
    }

    async fn create_flex_channel(
        &self,
        spec: &ChannelWithTaskSpec,
    ) -> Result<FlexChannel, PlatformError> {
        self.record(PlatformCall::CreateFlexChannel(spec.clone()))?;
        let mut channel = FlexChannel {
            sid: self.sid_for(Operation::CreateFlexChannel, CREATED_CHANNEL_SID),
            account_sid: Some("AC1".to_string()),
            flex_flow_sid: Some(spec.flex_flow_sid.clone()),
            task_sid: Some("WT1".to_string()),
            ..FlexChannel::default()
        };
        if let Some(status) = self.reported_status(Operation::CreateFlexChannel) {
            channel.extra.insert("status".to_string(), status);
        }
        Ok(channel)
    }
}
