use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ProtocolError;

pub const PHX_JOIN: &str = "phx_join";
pub const PHX_REPLY: &str = "phx_reply";
pub const PHX_ERROR: &str = "phx_error";
pub const PHX_CLOSE: &str = "phx_close";
pub const HEARTBEAT_TOPIC: &str = "phoenix";
pub const HEARTBEAT_EVENT: &str = "heartbeat";

/// Event name the explorer uses to push a verification outcome.
pub const VERIFICATION_EVENT: &str = "verification";

/// Value of `verificationResult` that marks a successful verification.
pub const VERIFICATION_OK: &str = "ok";

/// One Phoenix channels (serializer v2) frame:
/// `[join_ref, ref, topic, event, payload]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFrame", into = "RawFrame")]
pub struct PhoenixFrame {
    pub join_ref: Option<String>,
    pub msg_ref: Option<String>,
    pub topic: String,
    pub event: String,
    pub payload: Value,
}

#[derive(Clone, Serialize, Deserialize)]
struct RawFrame(Option<String>, Option<String>, String, String, Value);

impl From<RawFrame> for PhoenixFrame {
    fn from(RawFrame(join_ref, msg_ref, topic, event, payload): RawFrame) -> Self {
        Self {
            join_ref,
            msg_ref,
            topic,
            event,
            payload,
        }
    }
}

impl From<PhoenixFrame> for RawFrame {
    fn from(frame: PhoenixFrame) -> Self {
        RawFrame(
            frame.join_ref,
            frame.msg_ref,
            frame.topic,
            frame.event,
            frame.payload,
        )
    }
}

impl PhoenixFrame {
    pub fn join(topic: &str, msg_ref: u64) -> Self {
        let msg_ref = msg_ref.to_string();
        Self {
            join_ref: Some(msg_ref.clone()),
            msg_ref: Some(msg_ref),
            topic: topic.to_string(),
            event: PHX_JOIN.to_string(),
            payload: Value::Object(Map::new()),
        }
    }

    pub fn heartbeat(msg_ref: u64) -> Self {
        Self {
            join_ref: None,
            msg_ref: Some(msg_ref.to_string()),
            topic: HEARTBEAT_TOPIC.to_string(),
            event: HEARTBEAT_EVENT.to_string(),
            payload: Value::Object(Map::new()),
        }
    }

    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Frame)
    }

    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Frame)
    }

    /// `phx_reply` frames carry `{"status": "ok" | "error", "response": ..}`.
    pub fn is_error_reply(&self) -> bool {
        self.event == PHX_REPLY
            && self.payload.get("status").and_then(Value::as_str) == Some("error")
    }
}

/// What the server decided about a submitted contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VerificationOutcome {
    Verified,
    /// Re-rendered form markup carrying inline error annotations.
    Rejected(String),
}

impl From<String> for VerificationOutcome {
    fn from(raw: String) -> Self {
        if raw == VERIFICATION_OK {
            Self::Verified
        } else {
            Self::Rejected(raw)
        }
    }
}

impl From<VerificationOutcome> for String {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Verified => VERIFICATION_OK.to_string(),
            VerificationOutcome::Rejected(markup) => markup,
        }
    }
}

/// Body of a `verification` push, after key normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationMessage {
    pub verification_result: VerificationOutcome,
}

impl VerificationMessage {
    pub fn from_payload(payload: Value) -> Result<Self, ProtocolError> {
        serde_json::from_value(payload).map_err(ProtocolError::Payload)
    }
}

/// Converts `snake_case`, `kebab-case` and space separated keys to
/// `camelCase`. Purely numeric keys are left alone.
pub fn camelize(key: &str) -> String {
    if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
        return key.to_string();
    }

    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for ch in key.chars() {
        if matches!(ch, '_' | '-' | ' ') {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(ch.to_uppercase());
            upper_next = false;
        } else if out.is_empty() {
            out.extend(ch.to_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Recursively camelizes every object key in `value`.
pub fn camelize_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, inner)| (camelize(&key), camelize_keys(inner)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(camelize_keys).collect()),
        other => other,
    }
}
