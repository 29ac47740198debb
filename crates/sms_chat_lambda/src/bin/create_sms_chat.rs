use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use sms_chat_lambda::adapters::twilio::TwilioRestClient;
use sms_chat_lambda::config::{Credentials, OutboundSettings};
use sms_chat_lambda::handlers::create_sms_chat::handle_create_sms_chat_event;
use sms_chat_lambda::handlers::gateway::ApiGatewayResponse;
use sms_chat_lambda::logging::init_logging;

struct RuntimeDependencies {
    settings: OutboundSettings,
    platform: TwilioRestClient,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_create_sms_chat_event(event.payload, &deps.settings, &deps.platform).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let credentials = Credentials::from_env()?;
    let deps = RuntimeDependencies {
        settings: OutboundSettings::from_env()?,
        platform: TwilioRestClient::new(&credentials)?,
    };
    tracing::info!(
        component = "create_sms_chat",
        event = "cold_start",
        flow_policy = deps.settings.flow_policy.as_str(),
        from_number_configured = deps.settings.from_number.is_some()
    );

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
