mod api;
mod app_context;
mod commands;
mod config;
mod console;
mod dashboard;
mod jobs;
mod panels;
mod transform;

use std::sync::Arc;

use teloxide::prelude::*;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::app_context::AppContext;
use crate::commands::{DashboardCommands, answer};
use crate::config::{Config, RuntimeConfig, load_config};
use crate::dashboard::NotificationSink;
use crate::jobs::{start_background_jobs, start_panel_pollers};
use crate::panels::PanelDeps;

fn init_json_logging() {
    if let Err(error) = tracing_log::LogTracer::init() {
        eprintln!(
            "logging bridge initialization failed (continuing with existing logger): {}",
            error
        );
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .json()
        .with_current_span(false)
        .with_span_list(false)
        .finish();

    if let Err(error) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("global logger initialization failed: {}", error);
    }
}

const CONFIG_PATH: &str = "config.toml";

async fn wait_for_shutdown() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        log::error!("shutdown signal listener failed: {}", error);
    }
}

#[tokio::main]
async fn main() {
    init_json_logging();

    let config: Config = match load_config(CONFIG_PATH) {
        Ok(config) => config,
        Err(error) => {
            log::error!("Configuration error: {}", error);
            return;
        }
    };

    let client = match ApiClient::new(&config.api) {
        Ok(client) => client,
        Err(error) => {
            log::error!("HTTP client initialization failed: {}", error);
            return;
        }
    };

    log::info!(
        "pgpool_watch is starting... api={} telegram_enabled={}",
        client.base_url(),
        config.telegram.enabled
    );

    let (notifications, notifications_rx) = NotificationSink::channel();
    let deps = PanelDeps {
        client,
        runtime: Arc::new(RwLock::new(RuntimeConfig::from_config(&config))),
        notifications,
    };

    let (mut running, handles) = start_panel_pollers(&config, &deps);
    let app_context = AppContext::new(config.clone(), CONFIG_PATH, deps, handles);

    let bot = config
        .telegram
        .enabled
        .then(|| Bot::new(&config.telegram.bot_token));
    start_background_jobs(bot.clone(), app_context.clone(), notifications_rx);

    match bot {
        Some(bot) => {
            DashboardCommands::repl(bot, move |bot, msg, cmd| {
                let app_context = app_context.clone();
                async move { answer(bot, msg, cmd, &app_context).await }
            })
            .await;
        }
        None => wait_for_shutdown().await,
    }

    log::info!("pgpool_watch is shutting down panels={:?}", running.names());
    running.stop_all().await;
}
