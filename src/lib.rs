mod commands;
mod error;
mod models;
mod services;
mod widget;

pub use commands::*;
pub use error::{WidgetError, WidgetResult};
pub use models::*;
pub use services::{chat_client, config_service, cookie_service, history_service, timeline};
pub use widget::*;

/// Start the console chat: load config, replay history, then read stdin
pub fn run() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = services::config_service::load_config()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start runtime: {}", e))?;
    let local = tokio::task::LocalSet::new();

    local
        .block_on(&runtime, commands::run_console(config))
        .map_err(String::from)
}
