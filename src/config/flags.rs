//! Developer toggles.

use super::ConfigError;
use super::fields::Fields;

/// Startup switches meant for development and testing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DevFlags {
    /// Drop persisted user state when the server starts.
    pub clear_state_on_start: bool,
    /// Drop cached responses when the server starts.
    pub clear_cache_on_start: bool,
    /// Skip request authentication.
    pub bypass_auth: bool,
}

impl DevFlags {
    pub(crate) fn from_fields(fields: &Fields<'_>) -> Result<Self, ConfigError> {
        Ok(Self {
            clear_state_on_start: fields.bool_or("clear_state_on_start", false)?,
            clear_cache_on_start: fields.bool_or("clear_cache_on_start", false)?,
            bypass_auth: fields.bool_or("bypass_auth", false)?,
        })
    }

    pub fn any(&self) -> bool {
        self.clear_state_on_start || self.clear_cache_on_start || self.bypass_auth
    }
}
