use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ChatError;
use crate::state::Message;

/// Chat endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "http://10.0.146.98:5000/chat";

/// Deadline for a whole exchange: connect, send and read the body.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const PRIMING_MESSAGE: &str = "Initialize business context";
const PRIMING_CONTEXT: &str = "initial_setup";

/// Body of a POST to the chat endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Message>>,
}

impl ChatRequest {
    /// The fixed request sent once at startup to fetch an initial context.
    pub fn priming() -> Self {
        Self {
            message: PRIMING_MESSAGE.to_string(),
            context: PRIMING_CONTEXT.to_string(),
            history: None,
        }
    }
}

/// What the endpoint sends back. Both fields are optional and unknown
/// fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

impl ChatReply {
    /// The context token, treating an empty string as absent.
    pub fn context_token(&self) -> Option<&str> {
        self.context.as_deref().filter(|c| !c.is_empty())
    }
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl ChatClient {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request. No retries: the first failure is the outcome.
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let started = Instant::now();
        debug!(
            endpoint = %self.endpoint,
            context = %request.context,
            history = request.history.as_ref().map_or(0, Vec::len),
            "dispatching chat request"
        );

        let result = match tokio::time::timeout(self.timeout, self.post(request)).await {
            Ok(result) => result,
            Err(_) => Err(ChatError::Timeout(self.timeout)),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(elapsed_ms, "chat request succeeded"),
            Err(error) => warn!(elapsed_ms, %error, "chat request failed"),
        }
        result
    }

    /// Fire the startup priming request and return the context it hands back.
    pub async fn prime(&self) -> Result<Option<String>, ChatError> {
        let reply = self.send(&ChatRequest::priming()).await?;
        Ok(reply.context_token().map(str::to_string))
    }

    async fn post(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Server(status.as_u16()));
        }

        let reply: ChatReply = response.json().await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Sender;
    use serde_json::json;

    #[test]
    fn test_priming_body_has_no_history() {
        let body = serde_json::to_value(ChatRequest::priming()).unwrap();
        assert_eq!(
            body,
            json!({"message": "Initialize business context", "context": "initial_setup"})
        );
    }

    #[test]
    fn test_request_serializes_history() {
        let request = ChatRequest {
            message: "hi".to_string(),
            context: "business_assistant".to_string(),
            history: Some(vec![Message {
                id: "a".to_string(),
                text: "earlier".to_string(),
                sender: Sender::User,
            }]),
        };
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body["history"],
            json!([{"id": "a", "text": "earlier", "sender": "user"}])
        );
    }

    #[test]
    fn test_reply_tolerates_missing_and_extra_fields() {
        let reply: ChatReply = serde_json::from_str(r#"{"extra": 1}"#).unwrap();
        assert_eq!(reply, ChatReply::default());

        let reply: ChatReply = serde_json::from_str(r#"{"response": "ok", "context": ""}"#).unwrap();
        assert_eq!(reply.response.as_deref(), Some("ok"));
        assert_eq!(reply.context_token(), None);
    }

    #[test]
    fn test_client_defaults() {
        let client = ChatClient::new(DEFAULT_ENDPOINT);
        assert_eq!(client.timeout(), Duration::from_secs(10));
        assert_eq!(client.endpoint(), "http://10.0.146.98:5000/chat");

        let client = client.with_timeout(Duration::from_millis(50));
        assert_eq!(client.timeout(), Duration::from_millis(50));
    }
}
