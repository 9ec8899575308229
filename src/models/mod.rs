mod chat;
mod reply;
mod emotion;

pub use chat::*;
pub use reply::*;
pub use emotion::*;
