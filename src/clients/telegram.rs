use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{debug, error, info, warn};

use crate::{
    error::RelayError,
    models::{
        notification::NotificationRequest, telegram::SendMessageRequest,
        validation::parse_timestamp,
    },
    utils::{escape_html, format_iso_timestamp},
};

const SEVERITY_MARKERS: [(&str, &str); 4] = [
    ("info", "💡"),
    ("warning", "⚠️"),
    ("error", "❌"),
    ("critical", "🚨"),
];

const FALLBACK_MARKER: &str = "🔔";

/// Marker shown in front of the level label; unknown labels get a bell.
pub fn severity_marker(level: &str) -> &'static str {
    SEVERITY_MARKERS
        .iter()
        .find(|(label, _)| *label == level)
        .map(|(_, marker)| *marker)
        .unwrap_or(FALLBACK_MARKER)
}

/// Renders a notification as Telegram HTML, stamping it with the current time
/// when the request carried no timestamp.
pub fn format_message(data: &NotificationRequest) -> String {
    format_message_at(data, Utc::now())
}

pub fn format_message_at(data: &NotificationRequest, now: DateTime<Utc>) -> String {
    let instant = match &data.timestamp {
        Some(raw) => parse_timestamp(raw).unwrap_or_else(|| {
            warn!(timestamp = %raw, "Unparseable timestamp, using current time");
            now
        }),
        None => now,
    };
    let timestamp = format_iso_timestamp(&instant);

    let level = data.level.as_str();

    let mut msg = format!(
        "{} <b>[{}]</b> from <b>{}</b>\n\n",
        severity_marker(level),
        escape_html(&level.to_uppercase()),
        escape_html(&data.service)
    );
    msg.push_str(&format!("<b>Error:</b> {}\n", escape_html(&data.error)));
    msg.push_str(&format!("<b>Message:</b> {}\n", escape_html(&data.message)));
    msg.push_str(&format!("<b>Timestamp:</b> {}\n", escape_html(&timestamp)));

    if let Some(payload) = &data.payload {
        let json = format!("{:#}", JsonValue::Object(payload.clone()));
        msg.push_str(&format!("\n<b>Payload:</b>\n<pre>{}</pre>", escape_html(&json)));
    }

    msg
}

pub struct TelegramClient {
    http_client: Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramClient {
    pub fn new(http_client: Client, api_url: &str, bot_token: &str, chat_id: &str) -> Self {
        Self {
            http_client,
            api_url: api_url.trim_end_matches('/').to_string(),
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        }
    }

    /// Formats and delivers one notification. There is no retry.
    pub async fn notify(&self, data: &NotificationRequest) -> Result<(), RelayError> {
        let text = format_message(data);
        self.send_message(text).await
    }

    pub async fn send_message(&self, text: String) -> Result<(), RelayError> {
        debug!(chat_id = %self.chat_id, length = text.len(), "Sending Telegram message");

        // The bot token is part of the path; keep it out of error text.
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);
        let request = SendMessageRequest::html(&self.chat_id, text);

        let response = self
            .http_client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                error!(error = %e, "Telegram request failed");
                RelayError::Delivery(e.to_string())
            })?;

        let status = response.status();

        if status.is_success() {
            info!("Telegram message sent successfully");
            Ok(())
        } else {
            let error_text = response
                .text()
                .await
                .map_err(|e| RelayError::Delivery(e.without_url().to_string()))?;

            error!(status = %status, error = %error_text, "Telegram rejected message");
            Err(RelayError::Delivery(format!(
                "Failed to send Telegram message: {}",
                error_text
            )))
        }
    }
}
