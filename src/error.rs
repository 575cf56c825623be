use axum::http::StatusCode;
use thiserror::Error;

use crate::models::response::RelayResponse;

/// Every way an invocation can end short of a delivered message.
///
/// The `Display` text is exactly what the caller sees in the `error` field.
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Missing required environment variables: BOT_TOKEN, CHAT_ID and/or REQUEST_TOKEN")]
    Configuration,

    #[error("Invalid JSON in request body")]
    Parse(#[source] serde_json::Error),

    #[error("Unauthorized: Invalid or missing request token")]
    Unauthorized,

    #[error("{0}")]
    Validation(String),

    /// Transport failure or a non-success answer from the messaging provider.
    #[error("{0}")]
    Delivery(String),

    #[error("{}", describe_unexpected(.0))]
    Unexpected(#[source] anyhow::Error),
}

impl RelayError {
    pub fn to_response(&self) -> (StatusCode, RelayResponse) {
        (self.status_code(), RelayResponse::failure(self.to_string()))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::Parse(_) | RelayError::Validation(_) => StatusCode::BAD_REQUEST,
            RelayError::Unauthorized => StatusCode::UNAUTHORIZED,
            RelayError::Configuration | RelayError::Delivery(_) | RelayError::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<anyhow::Error> for RelayError {
    fn from(error: anyhow::Error) -> Self {
        RelayError::Unexpected(error)
    }
}

fn describe_unexpected(error: &anyhow::Error) -> String {
    let message = error.to_string();
    if message.is_empty() {
        "Internal server error".to_string()
    } else {
        message
    }
}
