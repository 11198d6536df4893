pub mod app;
pub mod components;
pub mod interop;

pub use app::{load_config, App, AppHandle};
pub use components::*;
pub use interop::*;
