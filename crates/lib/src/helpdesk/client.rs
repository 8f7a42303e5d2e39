//! Reply client trait: how the relay writes a message back into a conversation.

use async_trait::async_trait;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum HelpdeskError {
    #[error("helpdesk request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("helpdesk api error: {0}")]
    Api(String),
    #[error("helpdesk api token not configured")]
    MissingToken,
    #[error("helpdesk account id not configured")]
    MissingAccount,
}

/// A reply to post into one conversation. Always public and outgoing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRequest {
    pub conversation_id: i64,
    pub content: String,
}

/// Wire body for Chatwoot's create-message endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ReplyBody<'a> {
    pub content: &'a str,
    pub message_type: &'static str,
    pub private: bool,
}

impl ReplyRequest {
    pub fn new(conversation_id: i64, content: impl Into<String>) -> Self {
        Self {
            conversation_id,
            content: content.into(),
        }
    }

    pub(crate) fn body(&self) -> ReplyBody<'_> {
        ReplyBody {
            content: &self.content,
            message_type: "outgoing",
            private: false,
        }
    }
}

/// Posts replies to the helpdesk. Returns the id of the created message when the helpdesk reports one.
#[async_trait]
pub trait HelpdeskClient: Send + Sync {
    async fn post_reply(&self, request: &ReplyRequest) -> Result<Option<u64>, HelpdeskError>;
}
