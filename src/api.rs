use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
};
use reqwest::Client;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    config::Config,
    error::RelayError,
    handler::{RelayEvent, handle_event},
};

type ConfigLoader = Box<dyn Fn() -> Result<Config, Error> + Send + Sync>;

pub struct AppState {
    http_client: Client,
    load_config: ConfigLoader,
}

impl AppState {
    /// Re-reads the environment on every request.
    pub fn from_env() -> Self {
        Self::with_loader(Config::load)
    }

    pub fn with_config(config: Config) -> Self {
        Self::with_loader(move || Ok(config.clone()))
    }

    pub fn with_loader<F>(load_config: F) -> Self
    where
        F: Fn() -> Result<Config, Error> + Send + Sync + 'static,
    {
        Self {
            http_client: Client::new(),
            load_config: Box::new(load_config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(notify))
        .route("/notify", post(notify))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

pub async fn run_api_server(port: u16) -> Result<(), Error> {
    let app = router(AppState::from_env());

    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Notification relay started");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn notify(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let config = match (state.load_config)() {
        Ok(config) => config,
        Err(e) => {
            let err = RelayError::from(e);
            error!(error = %err, "Failed to load configuration");
            let (status, response) = err.to_response();
            return (status, Json(response));
        }
    };

    let event = RelayEvent::from_http(&headers, body.to_vec());
    let (status, response) = handle_event(&event, &config, &state.http_client).await;

    (status, Json(response))
}

async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
