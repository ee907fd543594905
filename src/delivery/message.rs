use serde::{Deserialize, Serialize};

/// Identifier of a delivery destination (a chat)
pub type ChatId = i64;

/// Payload staged for the external delivery agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    pub method: String,
    pub caption: String,
    pub chat_id: ChatId,
}

impl OutboundMessage {
    pub const SEND_TEXT: &'static str = "sendText";

    /// Plain text message to `chat_id`
    pub fn send_text(caption: impl Into<String>, chat_id: ChatId) -> Self {
        Self {
            method: Self::SEND_TEXT.to_string(),
            caption: caption.into(),
            chat_id,
        }
    }
}
