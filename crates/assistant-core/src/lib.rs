pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod reply;
pub mod state;

// Re-export main types for convenience
pub use client::{ChatClient, ChatReply, ChatRequest, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
pub use config::Config;
pub use error::ChatError;
pub use reply::{interpret, Interpretation, Outcome};
pub use state::{Conversation, Message, Sender};
