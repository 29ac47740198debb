use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use sms_chat_lambda::adapters::twilio::TwilioRestClient;
use sms_chat_lambda::config::{Credentials, TeardownSettings};
use sms_chat_lambda::handlers::clear_session::handle_clear_session_event;
use sms_chat_lambda::handlers::gateway::ApiGatewayResponse;
use sms_chat_lambda::logging::init_logging;

struct RuntimeDependencies {
    settings: TeardownSettings,
    platform: TwilioRestClient,
}

async fn handle_request(
    event: LambdaEvent<Value>,
    deps: &RuntimeDependencies,
) -> Result<ApiGatewayResponse, Error> {
    Ok(handle_clear_session_event(event.payload, &deps.settings, &deps.platform).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    let credentials = Credentials::from_env()?;
    let deps = RuntimeDependencies {
        settings: TeardownSettings::from_env()?,
        platform: TwilioRestClient::new(&credentials)?,
    };

    let deps = &deps;
    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(event, deps).await
    }))
    .await
}
