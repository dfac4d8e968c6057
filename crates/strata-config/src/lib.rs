//! Settings for Strata, persisted to disk as RON.
//!
//! Missing sections and fields fall back to defaults and unknown fields are
//! ignored, so old config files keep loading. Command-line flags override
//! whatever the file says.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{CONFIG_FILE, Config, DebugConfig, StreamingConfig, WorldConfig, default_config_dir};
pub use error::ConfigError;
