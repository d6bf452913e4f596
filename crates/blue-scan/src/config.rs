//! Registry configuration.
//!
//! ```toml
//! owner = "<base58 address>"
//! # Spender and recipient identity used with the ledger; generated if omitted.
//! # Must differ from the owner.
//! registry_address = "<base58 address>"
//! event_capacity = 1024   # at most 65536
//! max_score_len = 4096
//! ```

use std::path::Path;

use blue_token::Address;
use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Default broadcast buffer for registry events.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Largest accepted broadcast buffer for registry events.
pub const MAX_EVENT_CAPACITY: usize = 1 << 16;

/// Default maximum length of a score payload, in bytes.
pub const DEFAULT_MAX_SCORE_LEN: usize = 4096;

const fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

const fn default_max_score_len() -> usize {
    DEFAULT_MAX_SCORE_LEN
}

/// Configuration for a [`crate::ScanRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Identity allowed to add admins.
    pub owner: Address,
    /// Identity the registry uses as spender and payment recipient on the ledger.
    #[serde(default)]
    pub registry_address: Option<Address>,
    /// Capacity of the event broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Longest accepted score payload, in bytes.
    #[serde(default = "default_max_score_len")]
    pub max_score_len: usize,
}

impl RegistryConfig {
    /// Creates a configuration with defaults for everything but the owner.
    #[must_use]
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            registry_address: None,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            max_score_len: DEFAULT_MAX_SCORE_LEN,
        }
    }

    /// Sets the registry's own ledger identity.
    #[must_use]
    pub fn with_registry_address(mut self, address: Address) -> Self {
        self.registry_address = Some(address);
        self
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ScanError::Config(format!(
                "failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| ScanError::Config(format!("invalid TOML: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.event_capacity == 0 {
            return Err(ScanError::Config(
                "event_capacity must be greater than zero".to_string(),
            ));
        }

        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(ScanError::Config(format!(
                "event_capacity must be at most {MAX_EVENT_CAPACITY}, got {}",
                self.event_capacity
            )));
        }

        if self.max_score_len == 0 {
            return Err(ScanError::Config(
                "max_score_len must be greater than zero".to_string(),
            ));
        }

        if self.registry_address.as_ref() == Some(&self.owner) {
            return Err(ScanError::Config(
                "registry_address cannot be the owner".to_string(),
            ));
        }

        Ok(())
    }
}
