use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    pub const ALL: [Level; 4] = [Level::Info, Level::Warning, Level::Error, Level::Critical];

    /// Case-sensitive lookup, `"Critical"` is not a level.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "info" => Some(Level::Info),
            "warning" => Some(Level::Warning),
            "error" => Some(Level::Error),
            "critical" => Some(Level::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Warning => "warning",
            Level::Error => "error",
            Level::Critical => "critical",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.as_str())
    }
}

/// A validated alert, built once per request and consumed by the formatter.
///
/// `timestamp` keeps the raw JSON value the caller sent; it is only coerced
/// to an instant when the message is formatted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRequest {
    pub service: String,
    pub error: String,
    pub message: String,
    pub level: Level,
    pub timestamp: Option<JsonValue>,
    pub payload: Option<Map<String, JsonValue>>,
}

impl NotificationRequest {
    pub fn new(
        service: impl Into<String>,
        error: impl Into<String>,
        message: impl Into<String>,
        level: Level,
    ) -> Self {
        Self {
            service: service.into(),
            error: error.into(),
            message: message.into(),
            level,
            timestamp: None,
            payload: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: JsonValue) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_payload(mut self, payload: Map<String, JsonValue>) -> Self {
        self.payload = Some(payload);
        self
    }
}
