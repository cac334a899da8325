//! Turning the outcome of a dispatch into the next transcript entry.

use crate::client::ChatReply;
use crate::error::ChatError;
use crate::state::Message;

pub const EMPTY_REPLY_TEXT: &str = "I didn't get that. Could you rephrase?";
pub const TIMEOUT_TEXT: &str = "Request timed out. Please try again.";
pub const CONNECTION_TEXT: &str = "Sorry, I'm having trouble connecting.";

/// Result of one dispatch attempt.
pub type Outcome = Result<ChatReply, ChatError>;

/// What an outcome means for the conversation.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpretation {
    pub message: Message,
    /// Replacement context token, if the reply carried one.
    pub context: Option<String>,
}

pub fn interpret(outcome: Outcome) -> Interpretation {
    match outcome {
        Ok(reply) => {
            let context = reply.context_token().map(str::to_string);
            let text = reply
                .response
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| EMPTY_REPLY_TEXT.to_string());
            Interpretation {
                message: Message::assistant(text),
                context,
            }
        }
        Err(error) => Interpretation {
            message: Message::assistant(fallback_text(&error)),
            context: None,
        },
    }
}

pub fn fallback_text(error: &ChatError) -> &'static str {
    if error.is_timeout() {
        TIMEOUT_TEXT
    } else {
        CONNECTION_TEXT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Sender;
    use std::time::Duration;

    fn reply(response: Option<&str>, context: Option<&str>) -> ChatReply {
        ChatReply {
            response: response.map(str::to_string),
            context: context.map(str::to_string),
        }
    }

    #[test]
    fn test_response_becomes_assistant_message() {
        let result = interpret(Ok(reply(Some("Register your MSME first."), Some("msme"))));
        assert_eq!(result.message.text, "Register your MSME first.");
        assert_eq!(result.message.sender, Sender::Assistant);
        assert_eq!(result.context.as_deref(), Some("msme"));
    }

    #[test]
    fn test_missing_or_empty_response_uses_fallback() {
        let result = interpret(Ok(ChatReply::default()));
        assert_eq!(result.message.text, EMPTY_REPLY_TEXT);
        assert_eq!(result.context, None);

        let result = interpret(Ok(reply(Some(""), None)));
        assert_eq!(result.message.text, EMPTY_REPLY_TEXT);
    }

    #[test]
    fn test_failures_map_to_fixed_texts() {
        let timeout = interpret(Err(ChatError::Timeout(Duration::from_secs(10))));
        assert_eq!(timeout.message.text, "Request timed out. Please try again.");

        for error in [ChatError::Server(500), ChatError::Transport("refused".into())] {
            let result = interpret(Err(error));
            assert_eq!(result.message.text, "Sorry, I'm having trouble connecting.");
            assert_eq!(result.message.sender, Sender::Assistant);
            assert_eq!(result.context, None);
        }
    }
}
