use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use sms_chat_core::outbound::{ChannelWithTaskSpec, FlexFlowSpec, ProxySessionSpec};
use sms_chat_core::resources::{
    ChatChannel, FlexChannel, FlexFlow, FlexFlowPage, ProxySession, RemoteApiError,
};

use crate::adapters::platform::{CommsPlatform, PlatformError};
use crate::config::Credentials;

const CHAT_API_BASE: &str = "https://chat.twilio.com/v2";
const PROXY_API_BASE: &str = "https://proxy.twilio.com/v1";
const FLEX_API_BASE: &str = "https://flex-api.twilio.com/v1";
const FLEX_FLOW_PAGE_SIZE: &str = "50";
const USER_AGENT: &str = concat!("sms-chat-functions/", env!("CARGO_PKG_VERSION"));

type FormBody = Vec<(&'static str, String)>;

/// Base URLs of the three platform products the handlers talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwilioEndpoints {
    pub chat: String,
    pub proxy: String,
    pub flex: String,
}

impl Default for TwilioEndpoints {
    fn default() -> Self {
        Self {
            chat: CHAT_API_BASE.to_string(),
            proxy: PROXY_API_BASE.to_string(),
            flex: FLEX_API_BASE.to_string(),
        }
    }
}

/// Thin REST client for the chat, proxy and flex APIs.
///
/// No timeout is configured beyond the transport defaults and nothing is
/// retried.
#[derive(Debug, Clone)]
pub struct TwilioRestClient {
    client: Client,
    credentials: Credentials,
    endpoints: TwilioEndpoints,
}

impl TwilioRestClient {
    pub fn new(credentials: &Credentials) -> Result<Self, PlatformError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            client,
            credentials: credentials.clone(),
            endpoints: TwilioEndpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: TwilioEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PlatformError> {
        let response = self
            .client
            .get(url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()
            .await?;
        decode_response(response).await
    }

    async fn post_form<T: DeserializeOwned>(
        &self,
        url: Url,
        form: &FormBody,
    ) -> Result<T, PlatformError> {
        let response = self
            .client
            .post(url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .form(form)
            .send()
            .await?;
        decode_response(response).await
    }

    async fn delete(&self, url: Url) -> Result<(), PlatformError> {
        let response = self
            .client
            .delete(url)
            .basic_auth(&self.credentials.account_sid, Some(&self.credentials.auth_token))
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await?;
        Err(PlatformError::Api(parse_error_body(status.as_u16(), &body)))
    }
}

#[async_trait]
impl CommsPlatform for TwilioRestClient {
    async fn fetch_chat_channel(
        &self,
        chat_service_sid: &str,
        channel_sid: &str,
    ) -> Result<ChatChannel, PlatformError> {
        let url = endpoint(
            &self.endpoints.chat,
            &["Services", chat_service_sid, "Channels", channel_sid],
        )?;
        self.get_json(url).await
    }

    async fn update_chat_channel_attributes(
        &self,
        chat_service_sid: &str,
        channel_sid: &str,
        attributes: &str,
    ) -> Result<ChatChannel, PlatformError> {
        let url = endpoint(
            &self.endpoints.chat,
            &["Services", chat_service_sid, "Channels", channel_sid],
        )?;
        self.post_form(url, &vec![("Attributes", attributes.to_string())])
            .await
    }

    async fn remove_proxy_session(
        &self,
        proxy_service_sid: &str,
        session_sid: &str,
    ) -> Result<(), PlatformError> {
        let url = endpoint(
            &self.endpoints.proxy,
            &["Services", proxy_service_sid, "Sessions", session_sid],
        )?;
        self.delete(url).await
    }

    async fn fetch_proxy_session(
        &self,
        proxy_service_sid: &str,
        sid_or_unique_name: &str,
    ) -> Result<Option<ProxySession>, PlatformError> {
        let url = endpoint(
            &self.endpoints.proxy,
            &["Services", proxy_service_sid, "Sessions", sid_or_unique_name],
        )?;
        match self.get_json(url).await {
            Ok(session) => Ok(Some(session)),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    async fn create_proxy_session(
        &self,
        proxy_service_sid: &str,
        spec: &ProxySessionSpec,
    ) -> Result<ProxySession, PlatformError> {
        let url = endpoint(
            &self.endpoints.proxy,
            &["Services", proxy_service_sid, "Sessions"],
        )?;
        self.post_form(url, &proxy_session_form(spec)?).await
    }

    async fn list_flex_flows(&self) -> Result<Vec<FlexFlow>, PlatformError> {
        let mut url = endpoint(&self.endpoints.flex, &["FlexFlows"])?;
        url.query_pairs_mut()
            .append_pair("PageSize", FLEX_FLOW_PAGE_SIZE);

        let mut flows = Vec::new();
        loop {
            let page: FlexFlowPage = self.get_json(url).await?;
            flows.extend(page.flex_flows);
            match page.meta.next_page_url {
                Some(next) if !next.is_empty() => {
                    url = Url::parse(&next).map_err(|error| {
                        PlatformError::Endpoint(format!("invalid next_page_url '{next}': {error}"))
                    })?;
                }
                _ => break,
            }
        }

        Ok(flows)
    }

    async fn fetch_flex_flow(&self, flex_flow_sid: &str) -> Result<FlexFlow, PlatformError> {
        let url = endpoint(&self.endpoints.flex, &["FlexFlows", flex_flow_sid])?;
        self.get_json(url).await
    }

    async fn create_flex_flow(&self, spec: &FlexFlowSpec) -> Result<FlexFlow, PlatformError> {
        let url = endpoint(&self.endpoints.flex, &["FlexFlows"])?;
        self.post_form(url, &flex_flow_form(spec)).await
    }

    async fn create_flex_channel(
        &self,
        spec: &ChannelWithTaskSpec,
    ) -> Result<FlexChannel, PlatformError> {
        let url = endpoint(&self.endpoints.flex, &["Channels"])?;
        self.post_form(url, &flex_channel_form(spec)?).await
    }
}

/// Joins path segments onto a product base URL, percent-encoding each one.
fn endpoint(base: &str, segments: &[&str]) -> Result<Url, PlatformError> {
    let mut url = Url::parse(base)
        .map_err(|error| PlatformError::Endpoint(format!("invalid base url '{base}': {error}")))?;
    url.path_segments_mut()
        .map_err(|_| PlatformError::Endpoint(format!("base url '{base}' cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

async fn decode_response<T: DeserializeOwned>(response: Response) -> Result<T, PlatformError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(PlatformError::Api(parse_error_body(status.as_u16(), &body)));
    }
    serde_json::from_str(&body).map_err(|error| PlatformError::Decode(error.to_string()))
}

/// Reads the platform's JSON error body; the HTTP status always wins over the
/// body's own `status`. Non-JSON bodies are kept as the message.
fn parse_error_body(status: u16, body: &str) -> RemoteApiError {
    match serde_json::from_str::<RemoteApiError>(body) {
        Ok(mut error) => {
            error.status = status;
            error
        }
        Err(_) => {
            let trimmed = body.trim();
            RemoteApiError {
                status,
                code: None,
                message: if trimmed.is_empty() {
                    format!("platform responded with HTTP {status}")
                } else {
                    trimmed.to_string()
                },
                more_info: None,
            }
        }
    }
}

fn flex_flow_form(spec: &FlexFlowSpec) -> FormBody {
    vec![
        ("FriendlyName", spec.friendly_name.clone()),
        ("ChatServiceSid", spec.chat_service_sid.clone()),
        ("ChannelType", spec.channel_type.clone()),
        ("ContactIdentity", spec.contact_identity.clone()),
        ("Enabled", spec.enabled.to_string()),
        ("IntegrationType", spec.integration_type.clone()),
        ("Integration.WorkspaceSid", spec.integration_workspace_sid.clone()),
        ("Integration.WorkflowSid", spec.integration_workflow_sid.clone()),
        ("Integration.Channel", spec.integration_channel.clone()),
        ("LongLived", spec.long_lived.to_string()),
        ("JanitorEnabled", spec.janitor_enabled.to_string()),
    ]
}

fn flex_channel_form(spec: &ChannelWithTaskSpec) -> Result<FormBody, PlatformError> {
    let task_attributes = serde_json::to_string(&spec.task_attributes)
        .map_err(|error| PlatformError::Encode(format!("task attributes: {error}")))?;
    Ok(vec![
        ("FlexFlowSid", spec.flex_flow_sid.clone()),
        ("Identity", spec.identity.clone()),
        ("ChatUserFriendlyName", spec.chat_user_friendly_name.clone()),
        ("ChatFriendlyName", spec.chat_friendly_name.clone()),
        ("Target", spec.target.clone()),
        ("ChatUniqueName", spec.chat_unique_name.clone()),
        ("TaskAttributes", task_attributes),
        ("LongLived", spec.long_lived.to_string()),
    ])
}

fn proxy_session_form(spec: &ProxySessionSpec) -> Result<FormBody, PlatformError> {
    let mut form = vec![
        ("UniqueName", spec.unique_name.clone()),
        ("Mode", spec.mode.clone()),
    ];
    for participant in &spec.participants {
        let encoded = serde_json::to_string(participant)
            .map_err(|error| PlatformError::Encode(format!("participant: {error}")))?;
        form.push(("Participants", encoded));
    }
    Ok(form)
}
