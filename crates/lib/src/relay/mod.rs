//! Relay pipeline: webhook event -> filter -> model -> reply into the same conversation.
//!
//! Every delivery is independent. Failures never escape [`Relay::handle`]; they come back as a
//! [`RelayOutcome`] so the HTTP layer can log them and still acknowledge the webhook.

mod filter;

pub use filter::{evaluate, should_reply, FilterDecision, SkipReason};

use crate::helpdesk::{EventKind, HelpdeskClient, ReplyRequest, WebhookEvent};
use crate::llm::ModelClient;
use std::fmt;
use std::sync::Arc;

/// System instruction sent ahead of every customer message.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant. Provide clear, concise, and helpful responses.";

/// Which outbound call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayStage {
    Model,
    Reply,
}

impl fmt::Display for RelayStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayStage::Model => write!(f, "model"),
            RelayStage::Reply => write!(f, "reply"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Skipped(SkipReason),
    Relayed {
        conversation_id: i64,
        message_id: Option<u64>,
    },
    Failed {
        stage: RelayStage,
        cause: String,
    },
}

/// Model and helpdesk clients, built once at startup and shared by every request.
#[derive(Clone)]
pub struct Relay {
    model: Arc<dyn ModelClient>,
    helpdesk: Arc<dyn HelpdeskClient>,
}

impl Relay {
    pub fn new(model: Arc<dyn ModelClient>, helpdesk: Arc<dyn HelpdeskClient>) -> Self {
        Self { model, helpdesk }
    }

    /// Parse a raw webhook body and relay it.
    pub async fn handle_payload(&self, body: &[u8]) -> RelayOutcome {
        self.handle(WebhookEvent::from_slice(body)).await
    }

    /// Run one event through the pipeline. The model is called at most once, then the reply client at most once.
    pub async fn handle(&self, event: WebhookEvent) -> RelayOutcome {
        let recognized = match event {
            WebhookEvent::Recognized(r) => r,
            WebhookEvent::Unrecognized => return RelayOutcome::Skipped(SkipReason::Unrecognized),
        };
        if let EventKind::Other(name) = recognized.kind {
            return RelayOutcome::Skipped(SkipReason::OtherEvent(name));
        }
        let event = recognized.event;
        if let FilterDecision::Skip(reason) = evaluate(&event) {
            return RelayOutcome::Skipped(reason);
        }

        log::info!(
            "relay: answering conversation {} ({} chars)",
            event.conversation_id,
            event.content.len()
        );
        let answer = match self.model.invoke(SYSTEM_PROMPT, &event.content).await {
            Ok(text) if text.trim().is_empty() => {
                return RelayOutcome::Failed {
                    stage: RelayStage::Model,
                    cause: "empty reply".to_string(),
                }
            }
            Ok(text) => text,
            Err(e) => {
                return RelayOutcome::Failed {
                    stage: RelayStage::Model,
                    cause: e.to_string(),
                }
            }
        };

        let request = ReplyRequest::new(event.conversation_id, answer);
        match self.helpdesk.post_reply(&request).await {
            Ok(message_id) => RelayOutcome::Relayed {
                conversation_id: event.conversation_id,
                message_id,
            },
            Err(e) => RelayOutcome::Failed {
                stage: RelayStage::Reply,
                cause: e.to_string(),
            },
        }
    }
}
