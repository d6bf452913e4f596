//! Catalog of score categories.
//!
//! Workers report free-form score payloads such as `score_1=35;score_2=3443;`.
//! The catalog names the categories a payload is expected to carry, but
//! submissions are not checked against it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScanError};

/// Registered score type names.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreTypes {
    names: BTreeSet<String>,
}

impl ScoreTypes {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a name. Returns false if it was already registered.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidInput`] for an empty or blank name.
    pub fn insert(&mut self, name: impl Into<String>) -> Result<bool> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ScanError::invalid_input("score type name cannot be empty"));
        }
        Ok(self.names.insert(name))
    }

    /// Returns true if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Registered names in lexical order.
    #[must_use]
    pub fn list(&self) -> Vec<String> {
        self.names.iter().cloned().collect()
    }
}
