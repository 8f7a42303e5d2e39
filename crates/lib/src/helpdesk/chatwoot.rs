//! Chatwoot application API: create a message in a conversation.

use crate::config::HelpdeskConfig;
use crate::helpdesk::client::{HelpdeskClient, HelpdeskError, ReplyRequest};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Header Chatwoot uses for user and agent-bot access tokens.
const ACCESS_TOKEN_HEADER: &str = "api_access_token";

#[derive(Debug, Deserialize)]
struct CreateMessageResponse {
    #[serde(default)]
    id: Option<u64>,
}

/// Message id from a successful create response. The message is already posted, so an odd body is not an error.
fn created_message_id(body: &str) -> Option<u64> {
    match serde_json::from_str::<CreateMessageResponse>(body) {
        Ok(CreateMessageResponse { id: Some(id) }) => Some(id),
        Ok(_) => {
            log::warn!("helpdesk accepted the reply but returned no message id");
            None
        }
        Err(e) => {
            log::warn!("helpdesk accepted the reply but the response was not readable: {}", e);
            None
        }
    }
}

/// Chatwoot client bound to one account.
#[derive(Clone)]
pub struct ChatwootClient {
    base_url: String,
    api_token: Option<String>,
    account_id: Option<u64>,
    client: reqwest::Client,
}

impl ChatwootClient {
    pub fn new(config: &HelpdeskConfig, timeout: Duration) -> Result<Self, HelpdeskError> {
        let api_token = config
            .api_token
            .as_ref()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
            api_token,
            account_id: config.account_id,
            client,
        })
    }

    pub fn has_token(&self) -> bool {
        self.api_token.is_some()
    }

    pub fn has_account(&self) -> bool {
        self.account_id.is_some()
    }

    fn messages_url(&self, account_id: u64, conversation_id: i64) -> String {
        format!(
            "{}/api/v1/accounts/{}/conversations/{}/messages",
            self.base_url, account_id, conversation_id
        )
    }

    /// POST /api/v1/accounts/{account}/conversations/{id}/messages as an outgoing, public message.
    pub async fn create_message(&self, request: &ReplyRequest) -> Result<Option<u64>, HelpdeskError> {
        let token = self.api_token.as_deref().ok_or(HelpdeskError::MissingToken)?;
        let account_id = self.account_id.ok_or(HelpdeskError::MissingAccount)?;
        let url = self.messages_url(account_id, request.conversation_id);
        let res = self
            .client
            .post(&url)
            .header(ACCESS_TOKEN_HEADER, token)
            .json(&request.body())
            .send()
            .await?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(HelpdeskError::Api(format!("{} {}", status, body)));
        }
        let body = res.text().await?;
        Ok(created_message_id(&body))
    }
}

#[async_trait]
impl HelpdeskClient for ChatwootClient {
    async fn post_reply(&self, request: &ReplyRequest) -> Result<Option<u64>, HelpdeskError> {
        self.create_message(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(account_id: Option<u64>, token: Option<&str>) -> ChatwootClient {
        let config = HelpdeskConfig {
            base_url: "https://chat.example.com/".to_string(),
            api_token: token.map(str::to_string),
            account_id,
        };
        ChatwootClient::new(&config, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn messages_url_layout() {
        let c = client(Some(1), Some("t"));
        assert_eq!(
            c.messages_url(1, 12345),
            "https://chat.example.com/api/v1/accounts/1/conversations/12345/messages"
        );
    }

    #[test]
    fn message_id_is_read_when_present() {
        assert_eq!(created_message_id(r#"{"id": 98765, "message_type": 1}"#), Some(98765));
        assert_eq!(created_message_id(r#"{"id": "98765"}"#), None);
        assert_eq!(created_message_id("{}"), None);
        assert_eq!(created_message_id(""), None);
    }

    #[tokio::test]
    async fn success_without_id_is_still_posted() {
        use axum::{routing::post, Json, Router};

        let app = Router::new().route(
            "/api/v1/accounts/:account_id/conversations/:conversation_id/messages",
            post(|| async { Json(serde_json::json!({ "status": "created" })) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let config = HelpdeskConfig {
            base_url: format!("http://{}", addr),
            api_token: Some("t".to_string()),
            account_id: Some(1),
        };
        let c = ChatwootClient::new(&config, Duration::from_secs(5)).unwrap();
        let id = c.post_reply(&ReplyRequest::new(12345, "hi")).await.unwrap();
        assert_eq!(id, None);
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_request() {
        let req = ReplyRequest::new(1, "hi");
        let err = client(Some(1), None).post_reply(&req).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::MissingToken));
        let err = client(None, Some("t")).post_reply(&req).await.unwrap_err();
        assert!(matches!(err, HelpdeskError::MissingAccount));
    }
}
