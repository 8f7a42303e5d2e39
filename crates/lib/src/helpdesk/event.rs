//! Chatwoot webhook payloads: parsed defensively into a tagged event.
//!
//! Chatwoot sends the message fields at the top level (`message_type`, `private`, `content`, `sender`)
//! and sometimes nests them under `message` instead; top-level values win, nested ones fill gaps.

use serde_json::{json, Value};

/// The only event type that is relayed.
pub const MESSAGE_CREATED: &str = "message_created";

/// Direction/kind of a Chatwoot message. Webhooks use names; the API's numeric encoding is also accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Incoming,
    Outgoing,
    Activity,
    Template,
}

impl MessageType {
    fn from_value(v: &Value) -> Option<Self> {
        match v {
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "incoming" => Some(Self::Incoming),
                "outgoing" => Some(Self::Outgoing),
                "activity" => Some(Self::Activity),
                "template" => Some(Self::Template),
                _ => None,
            },
            Value::Number(n) => match n.as_u64()? {
                0 => Some(Self::Incoming),
                1 => Some(Self::Outgoing),
                2 => Some(Self::Activity),
                3 => Some(Self::Template),
                _ => None,
            },
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub name: Option<String>,
    /// e.g. "contact", "user", "agent_bot".
    pub kind: Option<String>,
}

/// One conversation message as seen by the filter. Read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub conversation_id: i64,
    /// `None` when absent or not a known value.
    pub message_type: Option<MessageType>,
    pub is_private: bool,
    pub content: String,
    pub sender: Option<Sender>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    MessageCreated,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEvent {
    pub kind: EventKind,
    pub event: InboundEvent,
}

/// A webhook delivery: either a conversation event or something we do not understand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    Recognized(RecognizedEvent),
    Unrecognized,
}

impl Sender {
    fn from_value(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        Some(Sender {
            name: obj.get("name").and_then(Value::as_str).map(str::to_string),
            kind: obj.get("type").and_then(Value::as_str).map(str::to_string),
        })
    }
}

/// First of `keys` at the top level, then under `message`, that `read` accepts.
/// A field of the wrong type counts as missing.
fn lookup<'a, T>(
    top: &'a Value,
    nested: Option<&'a Value>,
    key: &str,
    read: impl Fn(&'a Value) -> Option<T>,
) -> Option<T> {
    top.get(key)
        .and_then(&read)
        .or_else(|| nested.and_then(|m| m.get(key)).and_then(&read))
}

impl WebhookEvent {
    /// Parse a raw request body. Anything that is not JSON or lacks `conversation.id` is `Unrecognized`.
    pub fn from_slice(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(v) => Self::from_value(v),
            Err(e) => {
                log::debug!("webhook body is not JSON: {}", e);
                WebhookEvent::Unrecognized
            }
        }
    }

    /// Only `conversation.id` is required; every other field is read on its own and ignored when mistyped.
    pub fn from_value(value: Value) -> Self {
        let Some(conversation_id) = value
            .get("conversation")
            .and_then(|c| c.get("id"))
            .and_then(Value::as_i64)
        else {
            return WebhookEvent::Unrecognized;
        };
        let kind = match value.get("event").and_then(Value::as_str) {
            Some(MESSAGE_CREATED) => EventKind::MessageCreated,
            Some(other) => EventKind::Other(other.to_string()),
            None => EventKind::Other(String::new()),
        };
        let nested = value.get("message").filter(|m| m.is_object());
        let event = InboundEvent {
            conversation_id,
            message_type: lookup(&value, nested, "message_type", MessageType::from_value),
            is_private: lookup(&value, nested, "private", Value::as_bool).unwrap_or(false),
            content: lookup(&value, nested, "content", Value::as_str)
                .unwrap_or_default()
                .to_string(),
            sender: lookup(&value, nested, "sender", Sender::from_value),
        };
        WebhookEvent::Recognized(RecognizedEvent { kind, event })
    }
}

/// A `message_created` payload shaped like a real Chatwoot web-widget delivery.
/// Used by the `send-test-event` command and tests.
pub fn sample_message_created(conversation_id: i64, content: &str) -> Value {
    let sender = json!({
        "id": 400615803,
        "name": "Test User",
        "email": "user@example.com",
        "type": "contact"
    });
    json!({
        "event": MESSAGE_CREATED,
        "account": { "id": 1, "name": "Test Account" },
        "content": content,
        "content_type": "text",
        "message_type": "incoming",
        "private": false,
        "conversation": {
            "id": conversation_id,
            "inbox_id": 70310,
            "channel": "Channel::WebWidget",
            "status": "open",
            "can_reply": true
        },
        "message": {
            "id": 67890,
            "content": content,
            "content_type": "text",
            "private": false,
            "source": "web",
            "message_type": 0,
            "sender": sender.clone()
        },
        "sender": sender
    })
}
