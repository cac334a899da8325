//! UI-agnostic conversation state
//!
//! The transcript, the live context token and the small flags a chat widget
//! needs (open, typing, in flight). Every change goes through a method on
//! [`Conversation`] so any front-end (TUI, one-shot CLI, tests) drives the
//! same state machine.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::client::{ChatClient, ChatRequest};
use crate::error::ChatError;
use crate::reply::{self, Outcome};

pub const GREETING: &str = "Hello! I'm your business assistant. How can I help you today?";

/// Context label sent while the endpoint has not handed out a token yet.
pub const DEFAULT_CONTEXT: &str = "business_assistant";

/// How many earlier user messages travel with each request.
pub const HISTORY_LEN: usize = 3;

/// A chat message in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
}

/// Who wrote a message. The endpoint knows the assistant as "bot".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    #[serde(rename = "bot")]
    Assistant,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(text, Sender::User)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(text, Sender::Assistant)
    }

    fn new(text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            text: text.into(),
            sender,
        }
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[derive(Debug, Clone)]
pub struct Conversation {
    messages: Vec<Message>,
    context: Option<String>,
    typing: bool,
    in_flight: bool,
    open: bool,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// A fresh session, seeded with the greeting.
    pub fn new() -> Self {
        Self {
            messages: vec![Message {
                id: "1".to_string(),
                text: GREETING.to_string(),
                sender: Sender::Assistant,
            }],
            context: None,
            typing: false,
            in_flight: false,
            open: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn set_context(&mut self, token: impl Into<String>) {
        self.context = Some(token.into());
    }

    /// The last [`HISTORY_LEN`] user messages, oldest first.
    pub fn history(&self) -> Vec<Message> {
        let users: Vec<&Message> = self.messages.iter().filter(|m| m.is_user()).collect();
        let skip = users.len().saturating_sub(HISTORY_LEN);
        users.into_iter().skip(skip).cloned().collect()
    }

    /// Start a send: record the user's message and build the request for it.
    ///
    /// Returns `None` (and changes nothing) for whitespace-only text or while
    /// another request is still in flight.
    pub fn begin_send(&mut self, text: &str) -> Option<ChatRequest> {
        if text.trim().is_empty() {
            return None;
        }
        if self.in_flight {
            debug!("send rejected, request already in flight");
            return None;
        }

        // History is taken before the new message lands in the transcript
        let history = self.history();
        let context = self
            .context
            .clone()
            .unwrap_or_else(|| DEFAULT_CONTEXT.to_string());

        self.append(Message::user(text));
        self.typing = true;
        self.in_flight = true;

        Some(ChatRequest {
            message: text.to_string(),
            context,
            history: Some(history),
        })
    }

    /// Apply the outcome of a dispatch and return the message it produced.
    pub fn finish(&mut self, outcome: Outcome) -> &Message {
        let interpretation = reply::interpret(outcome);
        if let Some(token) = interpretation.context {
            self.set_context(token);
        }
        self.append(interpretation.message);
        self.typing = false;
        self.in_flight = false;
        &self.messages[self.messages.len() - 1]
    }

    /// Apply the result of the startup priming request. Failures only get
    /// logged; the transcript is never touched.
    pub fn apply_priming(&mut self, result: Result<Option<String>, ChatError>) {
        match result {
            Ok(Some(token)) => {
                info!(context = %token, "business context initialized");
                self.set_context(token);
            }
            Ok(None) => info!("priming reply carried no context"),
            Err(error) => warn!(%error, "context initialization failed"),
        }
    }

    /// Send `text` and wait for the reply in one step.
    pub async fn exchange(&mut self, client: &ChatClient, text: &str) -> Option<&Message> {
        let request = self.begin_send(text)?;
        let outcome = client.send(&request).await;
        Some(self.finish(outcome))
    }
}
