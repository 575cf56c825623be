pub mod api;
pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod handler;
pub mod logging;
pub mod models;
pub mod utils;
