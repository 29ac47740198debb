use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use sms_chat_core::contract::{
    validate_outbound_request, CreateSmsChatRequest, FLOW_NOT_FOUND_MESSAGE,
};
use sms_chat_core::error::{HandlerError, DEFAULT_ERROR_STATUS};
use sms_chat_core::outbound::{channel_with_task_spec, proxy_session_spec};
use sms_chat_core::projection::{ChatChannelView, CreateSmsChatResponse, ProxySessionView};
use tracing::{error, info};
use uuid::Uuid;

use crate::adapters::platform::CommsPlatform;
use crate::config::OutboundSettings;
use crate::handlers::flow_lookup::resolve_outbound_flow;
use crate::handlers::gateway::{json_response, normalize_apigw_event, ApiGatewayResponse};

const COMPONENT: &str = "create_sms_chat";

/// Starts an outbound SMS conversation.
///
/// Runs `validate -> resolve flow -> create channel with task -> create proxy
/// session`, strictly in sequence. The first failing step ends the request
/// with that step's status and body; nothing is retried or rolled back.
pub async fn handle_create_sms_chat_event(
    event: Value,
    settings: &OutboundSettings,
    platform: &impl CommsPlatform,
) -> ApiGatewayResponse {
    let payload = match normalize_apigw_event(event) {
        Ok(value) => value,
        Err(message) => return failure_response(HandlerError::validation(message)),
    };
    info!(component = COMPONENT, event = "request_received", request = %payload);

    let request: CreateSmsChatRequest = match serde_json::from_value(payload) {
        Ok(value) => value,
        Err(error) => {
            return failure_response(HandlerError::validation(format!(
                "Malformed request: {error}"
            )));
        }
    };

    match create_sms_chat(request, settings, platform).await {
        Ok(response) => json_response(200, &response),
        Err(failure) => failure_response(failure),
    }
}

async fn create_sms_chat(
    request: CreateSmsChatRequest,
    settings: &OutboundSettings,
    platform: &impl CommsPlatform,
) -> Result<CreateSmsChatResponse, HandlerError> {
    let request = validate_outbound_request(request, settings.from_number.as_deref())?;

    let flow = resolve_outbound_flow(
        platform,
        &settings.flow_target(),
        &request.from_number,
        settings.flow_policy,
    )
    .await
    .ok_or_else(|| {
        HandlerError::logical_absence(DEFAULT_ERROR_STATUS, FLOW_NOT_FOUND_MESSAGE)
            .with_body(json!({ "message": FLOW_NOT_FOUND_MESSAGE }))
    })?;
    info!(
        component = COMPONENT,
        event = "flow_resolved",
        flex_flow_sid = %flow.sid,
        chat_service_sid = ?flow.chat_service_sid
    );

    let identity = Uuid::now_v7().to_string();

    let channel_spec = channel_with_task_spec(
        &flow.sid,
        &request,
        Utc::now().timestamp_millis().to_string(),
    );
    let channel = platform.create_flex_channel(&channel_spec).await?;
    let Some(channel_sid) = channel.sid.clone() else {
        return Err(missing_sid("chat channel", &channel));
    };
    info!(
        component = COMPONENT,
        event = "chat_channel_created",
        channel_sid = %channel_sid,
        task_sid = ?channel.task_sid
    );

    ensure_no_session_for_channel(platform, &settings.proxy_service_sid, &channel_sid).await?;

    let session_spec = proxy_session_spec(&channel_sid, &request);
    let session = platform
        .create_proxy_session(&settings.proxy_service_sid, &session_spec)
        .await?;
    let Some(session_sid) = session.sid.clone() else {
        return Err(missing_sid("proxy session", &session));
    };
    info!(
        component = COMPONENT,
        event = "proxy_session_created",
        session_sid = %session_sid,
        unique_name = %session_spec.unique_name
    );

    Ok(CreateSmsChatResponse {
        chat_channel: ChatChannelView::project(&identity, &channel_sid, &channel),
        proxy_session: ProxySessionView::project(&session_sid, &session),
    })
}

/// A channel holds at most one proxy session, keyed by the channel sid as
/// the session's unique name.
async fn ensure_no_session_for_channel(
    platform: &impl CommsPlatform,
    proxy_service_sid: &str,
    channel_sid: &str,
) -> Result<(), HandlerError> {
    match platform
        .fetch_proxy_session(proxy_service_sid, channel_sid)
        .await?
    {
        Some(existing) => Err(HandlerError::conflict(format!(
            "Proxy session {} already exists for channel {channel_sid}",
            existing.sid.as_deref().unwrap_or("<unknown>")
        ))),
        None => Ok(()),
    }
}

fn missing_sid(resource: &str, value: &impl Serialize) -> HandlerError {
    match serde_json::to_value(value) {
        Ok(raw) => HandlerError::missing_sid(resource, raw),
        Err(error) => HandlerError::parse(format!("Unable to encode {resource}: {error}")),
    }
}

fn failure_response(failure: HandlerError) -> ApiGatewayResponse {
    error!(
        component = COMPONENT,
        event = "outbound_failed",
        kind = failure.kind.as_str(),
        status = failure.http_status,
        code = failure.code,
        error = %failure.message
    );
    json_response(failure.http_status, &failure.response_body())
}

#[cfg(test)]
mod tests {
    use sms_chat_core::flows::FlowCreationPolicy;

    use super::*;
    use crate::adapters::recording::{
        Operation, PlatformCall, RecordingPlatform, CREATED_CHANNEL_SID, CREATED_FLOW_SID,
        CREATED_SESSION_SID,
    };

    fn settings() -> OutboundSettings {
        OutboundSettings {
            chat_service_sid: "IS1".to_string(),
            proxy_service_sid: "KS1".to_string(),
            workflow_sid: "WW1".to_string(),
            workspace_sid: "WS1".to_string(),
            sms_channel_sid: "TC1".to_string(),
            from_number: Some("+15550000000".to_string()),
            flow_policy: FlowCreationPolicy::LastWriteWins,
        }
    }

    fn jane() -> Value {
        json!({"toName": "Jane", "toNumber": "+15551234567"})
    }

    #[tokio::test]
    async fn creates_flow_channel_and_session_for_new_conversation() {
        let platform = RecordingPlatform::new();

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            platform.operations(),
            vec![
                Operation::ListFlexFlows,
                Operation::CreateFlexFlow,
                Operation::CreateFlexChannel,
                Operation::FetchProxySession,
                Operation::CreateProxySession,
            ]
        );

        let calls = platform.calls();
        let PlatformCall::CreateFlexChannel(channel_spec) = &calls[2] else {
            panic!("expected channel creation, got {:?}", calls[2]);
        };
        assert_eq!(channel_spec.flex_flow_sid, CREATED_FLOW_SID);
        assert_eq!(channel_spec.chat_friendly_name, "Outbound Chat with +15551234567");
        assert_eq!(channel_spec.identity, "SMS+15551234567");
        assert!(channel_spec.chat_unique_name.parse::<i64>().is_ok());

        let PlatformCall::CreateProxySession(session_spec) = &calls[4] else {
            panic!("expected session creation, got {:?}", calls[4]);
        };
        assert_eq!(session_spec.unique_name, CREATED_CHANNEL_SID);
        assert_eq!(session_spec.participants.len(), 2);
        assert!(session_spec
            .participants
            .iter()
            .all(|participant| participant.proxy_identifier == "+15550000000"));

        let body = response.body_json().expect("json body");
        assert_eq!(body["chatChannel"]["sid"], json!(CREATED_CHANNEL_SID));
        assert_eq!(body["chatChannel"]["taskSid"], json!("WT1"));
        let identity = body["chatChannel"]["identity"].as_str().expect("identity");
        assert!(Uuid::parse_str(identity).is_ok());
        assert_eq!(body["proxySession"]["sid"], json!(CREATED_SESSION_SID));
        assert_eq!(body["proxySession"]["uniqueName"], json!(CREATED_CHANNEL_SID));
        assert_eq!(body["proxySession"]["mode"], json!("message-only"));
    }

    #[tokio::test]
    async fn existing_flow_is_refetched_and_reused() {
        let platform =
            RecordingPlatform::new().with_flow("FO1", "OutboundSMS", "2024-01-01T00:00:00Z");

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 200);
        let calls = platform.calls();
        assert_eq!(
            calls[1],
            PlatformCall::FetchFlexFlow {
                flex_flow_sid: "FO1".to_string()
            }
        );
        assert!(!platform.operations().contains(&Operation::CreateFlexFlow));
    }

    #[tokio::test]
    async fn missing_to_number_makes_no_remote_calls() {
        let platform = RecordingPlatform::new();

        let response = handle_create_sms_chat_event(
            json!({"body": "{\"toName\":\"Jane\"}"}),
            &settings(),
            &platform,
        )
        .await;

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.body_json(),
            Some(json!({"status": 400, "message": "Missing 'toNumber' in request body"}))
        );
        assert!(platform.calls().is_empty());
        assert_eq!(response.headers["Content-Type"], "application/json");
    }

    #[tokio::test]
    async fn missing_origin_number_is_reported_first() {
        let platform = RecordingPlatform::new();
        let mut settings = settings();
        settings.from_number = None;

        let response = handle_create_sms_chat_event(json!({}), &settings, &platform).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(
            response.body_json(),
            Some(json!({"status": 400, "message": "Missing 'fromNumber' in request body"}))
        );
        assert!(platform.calls().is_empty());
    }

    #[tokio::test]
    async fn unresolvable_flow_returns_500() {
        let platform = RecordingPlatform::new().failing(
            Operation::CreateFlexFlow,
            400,
            20001,
            "Invalid ChatServiceSid",
        );

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 500);
        assert_eq!(
            response.body_json(),
            Some(json!({"message": "Unable to find matching Flex Flow"}))
        );
        assert!(!platform.operations().contains(&Operation::CreateFlexChannel));
    }

    #[tokio::test]
    async fn channel_rejection_propagates_remote_error() {
        let platform = RecordingPlatform::new().failing(
            Operation::CreateFlexChannel,
            400,
            20001,
            "Target is not a valid phone number",
        );

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 400);
        let body = response.body_json().expect("json body");
        assert_eq!(body["code"], json!(20001));
        assert_eq!(body["message"], json!("Target is not a valid phone number"));
        assert!(!platform.operations().contains(&Operation::CreateProxySession));
    }

    #[tokio::test]
    async fn channel_without_sid_is_a_logical_failure() {
        let platform = RecordingPlatform::new().returning_without_sid(Operation::CreateFlexChannel);

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 500);
        let body = response.body_json().expect("json body");
        assert_eq!(body["flex_flow_sid"], json!(CREATED_FLOW_SID));
        assert!(!platform.operations().contains(&Operation::FetchProxySession));
    }

    #[tokio::test]
    async fn existing_session_for_channel_is_a_conflict() {
        let platform = RecordingPlatform::new().with_session("KC_OLD", CREATED_CHANNEL_SID);

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 409);
        assert!(!platform.operations().contains(&Operation::CreateProxySession));
    }

    #[tokio::test]
    async fn session_rejection_propagates_remote_error() {
        let platform = RecordingPlatform::new().failing(
            Operation::CreateProxySession,
            400,
            80603,
            "Session unique name already in use",
        );

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 400);
        assert_eq!(response.body_json().expect("json")["code"], json!(80603));
    }

    #[tokio::test]
    async fn session_without_sid_is_a_logical_failure() {
        let platform =
            RecordingPlatform::new().returning_without_sid(Operation::CreateProxySession);

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 500);
        let body = response.body_json().expect("json body");
        assert_eq!(body["unique_name"], json!(CREATED_CHANNEL_SID));
    }

    #[tokio::test]
    async fn channel_without_sid_answers_with_its_own_status() {
        let platform = RecordingPlatform::new()
            .returning_status_without_sid(Operation::CreateFlexChannel, 422);

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 422);
        let body = response.body_json().expect("json body");
        assert_eq!(body["status"], json!(422));
        assert_eq!(body["flex_flow_sid"], json!(CREATED_FLOW_SID));
        assert!(!platform.operations().contains(&Operation::CreateProxySession));
    }

    #[tokio::test]
    async fn session_without_sid_answers_with_its_own_status() {
        let platform = RecordingPlatform::new()
            .returning_status_without_sid(Operation::CreateProxySession, 422);

        let response = handle_create_sms_chat_event(jane(), &settings(), &platform).await;

        assert_eq!(response.status_code, 422);
        let body = response.body_json().expect("json body");
        assert_eq!(body["status"], json!(422));
        assert_eq!(body["unique_name"], json!(CREATED_CHANNEL_SID));
    }
}
