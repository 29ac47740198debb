//! Response projections: each resource exposes an explicit field list.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resources::{FlexChannel, ProxySession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatChannelView {
    /// Generated participant identity, not the channel's own `identity`.
    pub identity: String,
    pub sid: String,
    pub account_sid: Option<String>,
    pub flex_flow_sid: Option<String>,
    pub user_sid: Option<String>,
    pub task_sid: Option<String>,
    pub url: Option<String>,
    pub date_created: Option<String>,
    pub date_updated: Option<String>,
}

impl ChatChannelView {
    pub fn project(identity: &str, sid: &str, channel: &FlexChannel) -> Self {
        Self {
            identity: identity.to_string(),
            sid: sid.to_string(),
            account_sid: channel.account_sid.clone(),
            flex_flow_sid: channel.flex_flow_sid.clone(),
            user_sid: channel.user_sid.clone(),
            task_sid: channel.task_sid.clone(),
            url: channel.url.clone(),
            date_created: channel.date_created.clone(),
            date_updated: channel.date_updated.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySessionView {
    pub sid: String,
    pub service_sid: Option<String>,
    pub account_sid: Option<String>,
    pub unique_name: Option<String>,
    pub mode: Option<String>,
    pub status: Option<String>,
    pub ttl: Option<u64>,
    pub date_started: Option<String>,
    pub date_ended: Option<String>,
    pub date_last_interaction: Option<String>,
    pub date_expiry: Option<String>,
    pub closed_reason: Option<String>,
    pub date_created: Option<String>,
    pub date_updated: Option<String>,
    pub url: Option<String>,
    pub links: Option<Value>,
}

impl ProxySessionView {
    pub fn project(sid: &str, session: &ProxySession) -> Self {
        Self {
            sid: sid.to_string(),
            service_sid: session.service_sid.clone(),
            account_sid: session.account_sid.clone(),
            unique_name: session.unique_name.clone(),
            mode: session.mode.clone(),
            status: session.status_text().map(str::to_string),
            ttl: session.ttl,
            date_started: session.date_started.clone(),
            date_ended: session.date_ended.clone(),
            date_last_interaction: session.date_last_interaction.clone(),
            date_expiry: session.date_expiry.clone(),
            closed_reason: session.closed_reason.clone(),
            date_created: session.date_created.clone(),
            date_updated: session.date_updated.clone(),
            url: session.url.clone(),
            links: session.links.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSmsChatResponse {
    pub chat_channel: ChatChannelView,
    pub proxy_session: ProxySessionView,
}
