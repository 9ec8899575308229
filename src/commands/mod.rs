mod events;
mod console;

pub use events::*;
pub use console::*;
