pub mod app;
pub mod event;

pub use app::*;
pub use event::*;
