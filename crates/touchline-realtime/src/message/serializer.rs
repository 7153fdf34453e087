//! JSON encode/decode at the socket boundary.

use serde_json::Value;

use touchline_core::{AppError, AppResult};

use super::inbound::InboundMessage;
use super::outbound::OutboundMessage;
use super::validator::validate_frame;

/// Decode and validate one inbound text frame.
///
/// A missing or `null` payload reads as `{}` so payload-less requests may
/// omit it. Unknown tags, payloads of the wrong shape and failed field
/// validation are all errors.
pub fn decode_inbound(raw: &str, max_size: usize) -> AppResult<InboundMessage> {
    validate_frame(raw, max_size)?;

    let mut value: Value = serde_json::from_str(raw)?;
    let Some(object) = value.as_object_mut() else {
        return Err(AppError::validation("Message must be a JSON object"));
    };
    match object.get("payload") {
        None | Some(Value::Null) => {
            object.insert("payload".to_string(), Value::Object(Default::default()));
        }
        Some(_) => {}
    }

    let message: InboundMessage = serde_json::from_value(value)?;
    message
        .validate()
        .map_err(|e| AppError::validation(format!("Invalid {} payload: {e}", message.tag())))?;
    Ok(message)
}

/// Encode an outbound message as a text frame.
pub fn encode_outbound(message: &OutboundMessage) -> AppResult<String> {
    Ok(serde_json::to_string(message)?)
}
