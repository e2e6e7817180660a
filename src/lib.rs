pub mod config;
pub mod core;
pub mod error;
pub mod platform;
pub mod traits;

pub use crate::config::AppConfig;
pub use crate::core::{exit_code, App, AppState, WindowEvent};
pub use crate::error::{AppError, BootstrapError, BootstrapStep, RequestError};
