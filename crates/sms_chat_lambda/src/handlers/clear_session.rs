use serde_json::Value;
use sms_chat_core::attributes::mark_channel_inactive;
use sms_chat_core::contract::{
    is_empty_request, ClearSessionRequest, TeardownResponseBody, NO_BODY_MESSAGE,
};
use sms_chat_core::error::{HandlerError, VALIDATION_ERROR_CODE};
use tracing::{error, info};

use crate::adapters::platform::CommsPlatform;
use crate::config::TeardownSettings;
use crate::handlers::gateway::{json_response, normalize_apigw_event, ApiGatewayResponse};

const COMPONENT: &str = "clear_chat_session";

/// Ends a chat: marks the channel `INACTIVE`, then removes its proxy session.
///
/// Not a transaction. If the session removal fails after the channel update
/// succeeded, the channel stays inactive.
pub async fn handle_clear_session_event(
    event: Value,
    settings: &TeardownSettings,
    platform: &impl CommsPlatform,
) -> ApiGatewayResponse {
    let payload = match normalize_apigw_event(event) {
        Ok(value) => value,
        Err(message) => return failure_response(HandlerError::validation(message)),
    };
    info!(component = COMPONENT, event = "request_received", request = %payload);

    if is_empty_request(&payload) {
        info!(
            component = COMPONENT,
            event = "empty_request",
            code = VALIDATION_ERROR_CODE,
            reason = NO_BODY_MESSAGE
        );
        return json_response(200, &TeardownResponseBody::no_body());
    }

    let request: ClearSessionRequest = match serde_json::from_value(payload) {
        Ok(value) => value,
        Err(error) => {
            return failure_response(HandlerError::validation(format!(
                "Malformed request: {error}"
            )));
        }
    };

    match end_chat(&request, settings, platform).await {
        Ok(()) => {
            let body = TeardownResponseBody::ended();
            info!(component = COMPONENT, event = "chat_ended", response = ?body);
            json_response(200, &body)
        }
        Err(error) => failure_response(error),
    }
}

async fn end_chat(
    request: &ClearSessionRequest,
    settings: &TeardownSettings,
    platform: &impl CommsPlatform,
) -> Result<(), HandlerError> {
    let channel_sid = request.require_channel_sid()?;

    let channel = platform
        .fetch_chat_channel(&settings.chat_service_sid, channel_sid)
        .await?;
    let attributes = mark_channel_inactive(channel.attributes.as_deref())?;
    platform
        .update_chat_channel_attributes(&settings.chat_service_sid, channel_sid, &attributes)
        .await?;
    info!(
        component = COMPONENT,
        event = "channel_deactivated",
        channel_sid = channel_sid
    );

    let session_sid = request.require_session_sid()?;
    platform
        .remove_proxy_session(&settings.proxy_service_sid, session_sid)
        .await?;
    info!(
        component = COMPONENT,
        event = "proxy_session_removed",
        session_sid = session_sid
    );

    Ok(())
}

fn failure_response(failure: HandlerError) -> ApiGatewayResponse {
    error!(
        component = COMPONENT,
        event = "teardown_failed",
        kind = failure.kind.as_str(),
        status = failure.http_status,
        code = failure.code,
        error = %failure.message
    );
    json_response(
        failure.http_status,
        &TeardownResponseBody::failed(vec![failure.error_entry()]),
    )
}
