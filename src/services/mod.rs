pub mod chat_client;
pub mod config_service;
pub mod cookie_service;
pub mod history_service;
pub mod timeline;
