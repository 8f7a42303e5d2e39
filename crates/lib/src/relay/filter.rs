//! Reply filter: decides whether an inbound message should get a model reply.
//!
//! Only public, non-empty, incoming customer messages qualify. Senders whose name looks like a bot
//! are skipped so the relay never answers itself (or another bot) in a loop.

use crate::helpdesk::{InboundEvent, MessageType};
use std::fmt;

/// Case-insensitive substrings that mark a sender as a bot.
const BOT_NAME_MARKERS: [&str; 3] = ["bot", "ai", "assistant"];

/// Why an event was not relayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Payload had no conversation structure.
    Unrecognized,
    /// Conversation event other than message_created.
    OtherEvent(String),
    NotIncoming,
    Private,
    EmptyContent,
    /// Sender name matched a bot marker.
    BotSender(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unrecognized => write!(f, "not a conversation event"),
            SkipReason::OtherEvent(e) => write!(f, "event type {:?} is not relayed", e),
            SkipReason::NotIncoming => write!(f, "message is not incoming"),
            SkipReason::Private => write!(f, "message is a private note"),
            SkipReason::EmptyContent => write!(f, "message has no content"),
            SkipReason::BotSender(name) => write!(f, "sender {:?} looks like a bot", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    Reply,
    Skip(SkipReason),
}

/// Evaluate every filter rule in order; the first failing rule decides the skip reason.
pub fn evaluate(event: &InboundEvent) -> FilterDecision {
    let decision = if event.message_type != Some(MessageType::Incoming) {
        FilterDecision::Skip(SkipReason::NotIncoming)
    } else if event.is_private {
        FilterDecision::Skip(SkipReason::Private)
    } else if event.content.trim().is_empty() {
        FilterDecision::Skip(SkipReason::EmptyContent)
    } else if let Some(name) = bot_like_sender(event) {
        FilterDecision::Skip(SkipReason::BotSender(name.to_string()))
    } else {
        FilterDecision::Reply
    };
    log::debug!(
        "filter: conversation {} type={:?} private={} sender={:?} -> {:?}",
        event.conversation_id,
        event.message_type,
        event.is_private,
        event.sender.as_ref().and_then(|s| s.name.as_deref()),
        decision
    );
    decision
}

/// True when the event should get a reply.
pub fn should_reply(event: &InboundEvent) -> bool {
    evaluate(event) == FilterDecision::Reply
}

fn bot_like_sender(event: &InboundEvent) -> Option<&str> {
    let name = event.sender.as_ref()?.name.as_deref()?;
    let lower = name.to_lowercase();
    BOT_NAME_MARKERS
        .iter()
        .any(|m| lower.contains(m))
        .then_some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpdesk::Sender;

    fn customer_message() -> InboundEvent {
        InboundEvent {
            conversation_id: 1,
            message_type: Some(MessageType::Incoming),
            is_private: false,
            content: "where is my order?".to_string(),
            sender: Some(Sender {
                name: Some("Customer".to_string()),
                kind: Some("contact".to_string()),
            }),
        }
    }

    fn with_sender(name: &str) -> InboundEvent {
        InboundEvent {
            sender: Some(Sender {
                name: Some(name.to_string()),
                kind: None,
            }),
            ..customer_message()
        }
    }

    #[test]
    fn customer_message_qualifies() {
        assert!(should_reply(&customer_message()));
    }

    #[test]
    fn outgoing_never_qualifies() {
        for private in [false, true] {
            let e = InboundEvent {
                message_type: Some(MessageType::Outgoing),
                is_private: private,
                ..customer_message()
            };
            assert_eq!(evaluate(&e), FilterDecision::Skip(SkipReason::NotIncoming));
        }
    }

    #[test]
    fn activity_template_and_unknown_types_are_skipped() {
        for t in [Some(MessageType::Activity), Some(MessageType::Template), None] {
            let e = InboundEvent {
                message_type: t,
                ..customer_message()
            };
            assert!(!should_reply(&e));
        }
    }

    #[test]
    fn private_note_is_skipped() {
        let e = InboundEvent {
            is_private: true,
            ..customer_message()
        };
        assert_eq!(evaluate(&e), FilterDecision::Skip(SkipReason::Private));
    }

    #[test]
    fn blank_content_is_skipped() {
        for content in ["", "   ", "\n\t "] {
            let e = InboundEvent {
                content: content.to_string(),
                ..customer_message()
            };
            assert_eq!(evaluate(&e), FilterDecision::Skip(SkipReason::EmptyContent));
        }
    }

    #[test]
    fn bot_like_names_are_skipped() {
        for name in ["bot", "Support Bot", "AI", "OpenAI Helper", "ASSISTANT", "My assistant", "Chatbot"] {
            assert!(
                matches!(evaluate(&with_sender(name)), FilterDecision::Skip(SkipReason::BotSender(_))),
                "{} should be treated as a bot",
                name
            );
        }
    }

    // Plain substring match: "ai" also hits ordinary names.
    #[test]
    fn names_containing_ai_are_skipped() {
        assert!(!should_reply(&with_sender("Aiden")));
        assert!(!should_reply(&with_sender("Blaire")));
    }

    #[test]
    fn missing_sender_or_name_is_not_a_bot() {
        let e = InboundEvent {
            sender: None,
            ..customer_message()
        };
        assert!(should_reply(&e));
        let e = InboundEvent {
            sender: Some(Sender::default()),
            ..customer_message()
        };
        assert!(should_reply(&e));
    }
}
