mod controller;
mod view;

pub use controller::*;
pub use view::*;
