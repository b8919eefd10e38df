//! Runtime configuration for [`crate::NotificationFacade`].

use serde::{Deserialize, Serialize};

/// Auto-close delay applied when a request does not specify one.
pub const DEFAULT_TIMEOUT_MS: u32 = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
/// Facade configuration.
pub struct FacadeConfig {
    /// Auto-close delay for requests using [`crate::AutoClose::Default`], and the forced
    /// dismissal delay on hosts without close events.
    pub default_timeout_ms: u32,
}

impl Default for FacadeConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl FacadeConfig {
    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error when `default_timeout_ms` is zero.
    pub fn validate(self) -> Result<Self, String> {
        if self.default_timeout_ms == 0 {
            return Err("default_timeout_ms must be greater than zero".to_string());
        }
        Ok(self)
    }

    /// Parses and validates a JSON configuration. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when `raw` is not valid JSON for this shape or fails validation.
    pub fn from_json_str(raw: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(raw).map_err(|e| e.to_string())?;
        config.validate()
    }
}
