use alert_relay::config::Config;
use serde_json::{Value, json};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const BOT_TOKEN: &str = "123456:test-bot";
pub const CHAT_ID: &str = "-1001234567";
pub const REQUEST_TOKEN: &str = "shared-secret";

pub fn config_for(server: &MockServer) -> Config {
    Config {
        bot_token: Some(BOT_TOKEN.to_string()),
        chat_id: Some(CHAT_ID.to_string()),
        request_token: Some(REQUEST_TOKEN.to_string()),
        telegram_api_url: server.uri(),
        ..Config::default()
    }
}

pub fn send_message_path() -> String {
    format!("/bot{}/sendMessage", BOT_TOKEN)
}

/// Mounts a `sendMessage` endpoint that must be hit exactly `calls` times.
pub async fn mount_telegram(server: &MockServer, response: ResponseTemplate, calls: u64) {
    Mock::given(method("POST"))
        .and(path(send_message_path()))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

pub fn telegram_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": { "message_id": 1 } }))
}

pub fn critical_alert() -> Value {
    json!({
        "service": "api",
        "error": "e1",
        "message": "failed",
        "level": "critical"
    })
}

/// JSON bodies of every request the mock provider received.
pub async fn sent_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}
