//! Key/value providers the configuration is read from.
//!
//! Every source yields a flat map of dotted keys (`credentials.maps_key`,
//! `profiles.dev.server_port`) to raw string values. Typing and validation
//! happen later in [`crate::config`].

pub mod duration;
mod env;
mod error;
mod file;
mod layered;
mod memory;
mod retry;

pub use env::EnvSource;
pub use error::SourceError;
pub use file::FileSource;
pub use layered::LayeredSource;
pub use memory::MemorySource;
pub use retry::{RetryPolicy, fetch_with_retry};

use std::collections::BTreeMap;

/// Raw configuration pairs keyed by dotted path.
pub type Pairs = BTreeMap<String, String>;

/// A provider of raw configuration pairs.
pub trait ConfigSource: Send + Sync {
    /// Display name for logging.
    fn name(&self) -> &str;

    /// Read every pair the source currently holds.
    fn fetch(&self) -> Result<Pairs, SourceError>;
}

impl<T: ConfigSource + ?Sized> ConfigSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(&self) -> Result<Pairs, SourceError> {
        (**self).fetch()
    }
}

#[cfg(test)]
mod tests;
