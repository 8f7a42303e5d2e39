//! Helpdesk side of the relay (Chatwoot).
//!
//! Webhook event parsing for inbound deliveries and a reply client for posting answers back.

mod chatwoot;
mod client;
mod event;

pub use chatwoot::ChatwootClient;
pub use client::{HelpdeskClient, HelpdeskError, ReplyRequest};
pub use event::{
    sample_message_created, EventKind, InboundEvent, MessageType, RecognizedEvent, Sender,
    WebhookEvent, MESSAGE_CREATED,
};
