//! Typed startup configuration for the conversation server.
//!
//! ```no_run
//! use convoscope_config::{Config, source::EnvSource};
//!
//! let config = Config::load(&EnvSource::default())?;
//! let profile = config.active_profile();
//! println!("listening on {}", profile.server_port);
//! # Ok::<(), convoscope_config::ConfigError>(())
//! ```

pub mod config;
pub mod secrets;
pub mod source;

pub use config::{Config, ConfigError, ConfigLoader, DeploymentProfile, Environment};
