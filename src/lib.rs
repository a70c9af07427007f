pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod playback;
pub mod retplay;
pub mod shortcut;
/// Test-support models, shipped for integration tests and downstream model authors.
pub mod testing;
pub mod utils;

pub use config::cli::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::models::builtin_registry;
pub use core::batch::{BatchRunner, BatchSummary};
pub use core::model::{ModelOptions, RetModel};
pub use utils::error::{Result, RetError};
