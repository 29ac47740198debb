//! Environment configuration for both Lambda binaries.
//!
//! Values are opaque identifiers supplied out-of-band. Blank values count as
//! missing. Loading goes through a lookup function so tests never touch the
//! process environment.

use std::fmt;

use sms_chat_core::flows::FlowCreationPolicy;
use sms_chat_core::outbound::FlowTarget;
use thiserror::Error;

pub const ACCOUNT_SID_VAR: &str = "ACCOUNT_SID";
pub const AUTH_TOKEN_VAR: &str = "AUTH_TOKEN";
pub const CHAT_SERVICE_SID_VAR: &str = "FLEX_CHAT_SERVICE_SID";
pub const PROXY_SERVICE_SID_VAR: &str = "TWILIO_PROXY_SERVICE_SID";
pub const WORKFLOW_SID_VAR: &str = "FLEX_WORKFLOW_SID";
pub const WORKSPACE_SID_VAR: &str = "FLEX_WORKSPACE_SID";
pub const SMS_CHANNEL_SID_VAR: &str = "FLEX_SMS_CHANNEL_SID";
pub const FROM_NUMBER_VAR: &str = "FROM_NUMBER";
pub const FLOW_POLICY_VAR: &str = "FLEX_FLOW_CREATION_POLICY";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("invalid {name}: {message}")]
    Invalid { name: &'static str, message: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub account_sid: String,
    pub auth_token: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("account_sid", &self.account_sid)
            .field("auth_token", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            account_sid: required(&lookup, ACCOUNT_SID_VAR)?,
            auth_token: required(&lookup, AUTH_TOKEN_VAR)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeardownSettings {
    pub chat_service_sid: String,
    pub proxy_service_sid: String,
}

impl TeardownSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            chat_service_sid: required(&lookup, CHAT_SERVICE_SID_VAR)?,
            proxy_service_sid: required(&lookup, PROXY_SERVICE_SID_VAR)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundSettings {
    pub chat_service_sid: String,
    pub proxy_service_sid: String,
    pub workflow_sid: String,
    pub workspace_sid: String,
    pub sms_channel_sid: String,
    /// Checked per request so its absence is reported as a validation error.
    pub from_number: Option<String>,
    pub flow_policy: FlowCreationPolicy,
}

impl OutboundSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let flow_policy = match optional(&lookup, FLOW_POLICY_VAR) {
            Some(value) => value
                .parse::<FlowCreationPolicy>()
                .map_err(|error| ConfigError::Invalid {
                    name: FLOW_POLICY_VAR,
                    message: error.to_string(),
                })?,
            None => FlowCreationPolicy::default(),
        };

        Ok(Self {
            chat_service_sid: required(&lookup, CHAT_SERVICE_SID_VAR)?,
            proxy_service_sid: required(&lookup, PROXY_SERVICE_SID_VAR)?,
            workflow_sid: required(&lookup, WORKFLOW_SID_VAR)?,
            workspace_sid: required(&lookup, WORKSPACE_SID_VAR)?,
            sms_channel_sid: required(&lookup, SMS_CHANNEL_SID_VAR)?,
            from_number: optional(&lookup, FROM_NUMBER_VAR),
            flow_policy,
        })
    }

    pub fn flow_target(&self) -> FlowTarget {
        FlowTarget {
            chat_service_sid: self.chat_service_sid.clone(),
            workspace_sid: self.workspace_sid.clone(),
            workflow_sid: self.workflow_sid.clone(),
            sms_channel_sid: self.sms_channel_sid.clone(),
        }
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, name: &'static str) -> Option<String> {
    lookup(name)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    optional(lookup, name).ok_or(ConfigError::Missing(name))
}
