use std::process::ExitCode;

use anyhow::{Error, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use reqwest::Client;
use serde_json::{Map, json};

use crate::{
    api::run_api_server,
    clients::telegram::{TelegramClient, format_message},
    config::Config,
    models::notification::{Level, NotificationRequest},
};

#[derive(Parser, Debug)]
#[command(name = "alert_relay", version, about = "Relays service alerts to a Telegram chat")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP relay (default)
    Serve {
        /// Overrides SERVER_PORT
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send a sample notification using BOT_TOKEN and CHAT_ID
    SendTest,
    /// Print the formatted message for every level without sending anything
    Preview,
}

pub async fn execute(cli: Cli, config: Config) -> Result<ExitCode, Error> {
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            run_api_server(port.unwrap_or(config.server_port)).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::SendTest => Ok(send_test(&config).await),
        Commands::Preview => {
            preview();
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn send_test(config: &Config) -> ExitCode {
    println!("send-test starting...");

    let (Some(bot_token), Some(chat_id)) = (
        config.bot_token.as_deref().filter(|t| !t.is_empty()),
        config.chat_id.as_deref().filter(|c| !c.is_empty()),
    ) else {
        eprintln!("Missing BOT_TOKEN or CHAT_ID in environment.");
        return ExitCode::from(1);
    };

    let telegram = TelegramClient::new(Client::new(), &config.telegram_api_url, bot_token, chat_id);

    match telegram.notify(&send_test_request()).await {
        Ok(()) => {
            println!("✅ Telegram notification sent (check your chat).");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Failed to send Telegram notification:");
            eprintln!("{}", e);
            ExitCode::from(2)
        }
    }
}

fn send_test_request() -> NotificationRequest {
    let mut payload = Map::new();
    payload.insert("local".to_string(), json!(true));

    NotificationRequest::new(
        "local-test",
        "manual_test",
        "This is a test notification sent from the send-test command",
        Level::Info,
    )
    .with_timestamp(json!(Utc::now().to_rfc3339()))
    .with_payload(payload)
}

fn preview_request(level: Level) -> NotificationRequest {
    let mut payload = Map::new();
    payload.insert("host".to_string(), json!("db1.prod"));
    payload.insert("attempts".to_string(), json!(3));
    payload.insert("lastError".to_string(), json!("Connection timeout after 30s"));

    NotificationRequest::new("payments-api", "db_connection_failed", "Database unreachable", level)
        .with_payload(payload)
}

fn preview() {
    let rule = "=".repeat(50);

    for level in Level::ALL {
        println!("\n--- {} Level ---", level.as_str().to_uppercase());
        println!("{}", rule);
        println!("{}", format_message(&preview_request(level)));
        println!("{}", rule);
    }
}
