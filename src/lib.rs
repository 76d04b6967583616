pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod frame;

pub use config::{Config, ConfigError};
pub use error::PresentError;
