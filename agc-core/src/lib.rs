//! Core utilities and types shared across all agc crates

pub mod config;
pub mod error;

// Re-export commonly used types
pub use config::{load_config, save_config, Config};
pub use error::{AgcError, AgcResult};

/// Project metadata from the workspace manifest
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
