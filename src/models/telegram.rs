use serde::{Deserialize, Serialize};

pub const PARSE_MODE_HTML: &str = "HTML";

/// Body of a `sendMessage` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub chat_id: String,
    pub text: String,
    pub parse_mode: String,
}

impl SendMessageRequest {
    pub fn html(chat_id: &str, text: String) -> Self {
        Self {
            chat_id: chat_id.to_string(),
            text,
            parse_mode: PARSE_MODE_HTML.to_string(),
        }
    }
}
