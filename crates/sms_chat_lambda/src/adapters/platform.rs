use async_trait::async_trait;
use sms_chat_core::error::HandlerError;
use sms_chat_core::outbound::{ChannelWithTaskSpec, FlexFlowSpec, ProxySessionSpec};
use sms_chat_core::resources::{
    ChatChannel, FlexChannel, FlexFlow, ProxySession, RemoteApiError,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("platform rejected request: {0}")]
    Api(RemoteApiError),
    #[error("platform transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to decode platform response: {0}")]
    Decode(String),
    #[error("failed to encode platform request: {0}")]
    Encode(String),
    #[error("invalid platform endpoint: {0}")]
    Endpoint(String),
}

impl PlatformError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api(error) if error.status == 404)
    }
}

impl From<PlatformError> for HandlerError {
    fn from(error: PlatformError) -> Self {
        match error {
            PlatformError::Api(remote) => HandlerError::from_remote(remote),
            PlatformError::Decode(message) => HandlerError::parse(message),
            other => HandlerError::transport(other.to_string()),
        }
    }
}

/// Remote operations of the communications platform used by both handlers.
///
/// Every call is a single blocking round-trip; implementations never retry.
#[async_trait]
pub trait CommsPlatform: Send + Sync {
    async fn fetch_chat_channel(
        &self,
        chat_service_sid: &str,
        channel_sid: &str,
    ) -> Result<ChatChannel, PlatformError>;

    async fn update_chat_channel_attributes(
        &self,
        chat_service_sid: &str,
        channel_sid: &str,
        attributes: &str,
    ) -> Result<ChatChannel, PlatformError>;

    async fn remove_proxy_session(
        &self,
        proxy_service_sid: &str,
        session_sid: &str,
    ) -> Result<(), PlatformError>;

    /// Looks a session up by sid or unique name; `None` when it does not exist.
    async fn fetch_proxy_session(
        &self,
        proxy_service_sid: &str,
        sid_or_unique_name: &str,
    ) -> Result<Option<ProxySession>, PlatformError>;

    async fn create_proxy_session(
        &self,
        proxy_service_sid: &str,
        spec: &ProxySessionSpec,
    ) -> Result<ProxySession, PlatformError>;

    /// Every flow of the account, across all pages.
    async fn list_flex_flows(&self) -> Result<Vec<FlexFlow>, PlatformError>;

    async fn fetch_flex_flow(&self, flex_flow_sid: &str) -> Result<FlexFlow, PlatformError>;

    async fn create_flex_flow(&self, spec: &FlexFlowSpec) -> Result<FlexFlow, PlatformError>;

    async fn create_flex_channel(
        &self,
        spec: &ChannelWithTaskSpec,
    ) -> Result<FlexChannel, PlatformError>;
}
