use std::collections::HashMap;

use axum::http::{HeaderMap, StatusCode};
use reqwest::Client;
use serde_json::Value as JsonValue;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::{
    clients::telegram::TelegramClient,
    config::Config,
    error::RelayError,
    models::{response::RelayResponse, validation::validate_notification_request},
};

pub const REQUEST_TOKEN_HEADER: &str = "x-request-token";

/// One inbound invocation: lowercase header names and the raw body bytes.
#[derive(Debug, Clone, Default)]
pub struct RelayEvent {
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RelayEvent {
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Keeps the first value of each header. Values that are not UTF-8 are kept
    /// lossily so a garbled token fails authentication instead of vanishing.
    pub fn from_http(headers: &HeaderMap, body: Vec<u8>) -> Self {
        let headers = headers
            .keys()
            .filter_map(|name| {
                headers.get(name).map(|value| {
                    (
                        name.as_str().to_string(),
                        String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    )
                })
            })
            .collect();

        Self { headers, body }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Runs the configuration, parse, auth, validation and delivery gates in order
/// and maps the outcome to a status and response body.
pub async fn handle_event(
    event: &RelayEvent,
    config: &Config,
    http_client: &Client,
) -> (StatusCode, RelayResponse) {
    let span = info_span!("notification", invocation_id = %Uuid::new_v4());

    match relay(event, config, http_client).instrument(span).await {
        Ok(()) => (StatusCode::OK, RelayResponse::success()),
        Err(e) => e.to_response(),
    }
}

async fn relay(event: &RelayEvent, config: &Config, http_client: &Client) -> Result<(), RelayError> {
    let credentials = config.credentials().inspect_err(|_| {
        error!("Relay is missing required configuration");
    })?;

    let body = parse_body(&event.body).inspect_err(|e| {
        warn!(error = ?e, "Rejected malformed request body");
    })?;

    authenticate(event, &body, &credentials.request_token).inspect_err(|_| {
        warn!("Rejected request with invalid or missing token");
    })?;

    let request = validate_notification_request(&body).inspect_err(|e| {
        warn!(reason = %e, "Notification failed validation");
    })?;

    info!(
        service = %request.service,
        level = %request.level,
        error_code = %request.error,
        "Relaying notification"
    );

    let telegram = TelegramClient::new(
        http_client.clone(),
        &config.telegram_api_url,
        &credentials.bot_token,
        &credentials.chat_id,
    );

    telegram.notify(&request).await.inspect_err(|e| {
        error!(error = %e, "Notification delivery failed");
    })
}

/// An empty body reads as `{}`.
pub fn parse_body(body: &[u8]) -> Result<JsonValue, RelayError> {
    if body.is_empty() {
        return Ok(JsonValue::Object(Default::default()));
    }

    serde_json::from_slice(body).map_err(RelayError::Parse)
}

/// The header token wins; the body's `token` field is only consulted when the
/// header is absent or empty.
pub fn authenticate(event: &RelayEvent, body: &JsonValue, expected: &str) -> Result<(), RelayError> {
    let provided = event
        .header(REQUEST_TOKEN_HEADER)
        .filter(|token| !token.is_empty())
        .or_else(|| body.get("token").and_then(JsonValue::as_str));

    match provided {
        Some(token) if !token.is_empty() && token == expected => Ok(()),
        _ => Err(RelayError::Unauthorized),
    }
}
