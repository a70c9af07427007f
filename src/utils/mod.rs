pub mod error;
pub mod logger;
pub mod monitor;
pub mod save;
pub mod validation;
