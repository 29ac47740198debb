use serde_json::{Map, Value};

use crate::contract::INACTIVE_CHANNEL_STATUS;
use crate::error::HandlerError;

/// Rewrites channel attributes with `status` set to `INACTIVE`, leaving every
/// other key untouched and in place.
pub fn mark_channel_inactive(raw_attributes: Option<&str>) -> Result<String, HandlerError> {
    let Some(raw_attributes) = raw_attributes else {
        return Err(HandlerError::parse("Channel has no attributes to update"));
    };

    let mut attributes: Map<String, Value> = match serde_json::from_str(raw_attributes) {
        Ok(Value::Object(map)) => map,
        Ok(other) => {
            return Err(HandlerError::parse(format!(
                "Channel attributes must be a JSON object, found {}",
                json_type_name(&other)
            )));
        }
        Err(error) => {
            return Err(HandlerError::parse(format!("Unable to parse channel attributes: {error}")));
        }
    };

    attributes.insert(
        "status".to_string(),
        Value::String(INACTIVE_CHANNEL_STATUS.to_string()),
    );

    serde_json::to_string(&attributes).map_err(|error| {
        HandlerError::parse(format!("Unable to encode channel attributes: {error}"))
    })
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
