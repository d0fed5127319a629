//! Case-insensitive identity-name resolution with display-form preservation.

use crate::error::ConfigError;
use crate::names::IdentityName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Maps a lowercased identity name to its original-case display form.
///
/// Exists because some stack-configuration loaders normalize map keys to
/// lowercase before this core ever sees them; the case map lets the facade
/// still print the name the operator actually wrote.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityCaseMap(HashMap<String, String>);

impl IdentityCaseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `name`'s display form under its lowercased key.
    pub fn insert(&mut self, name: &IdentityName) {
        self.0.insert(name.to_lowercase(), name.to_string());
    }

    /// Returns the preserved original-case form for a lowercased name, if known.
    pub fn display_name(&self, lowercase: &str) -> Option<&str> {
        self.0.get(lowercase).map(String::as_str)
    }

    /// Resolution per the identity-resolution contract: try `candidate` as an exact
    /// key first (fast path covers configs that were never lowercased), then fall
    /// back to a lowercase lookup against this map.
    pub fn resolve<'a>(&'a self, candidate: &'a str) -> Option<&'a str> {
        if self.0.values().any(|v| v == candidate) {
            return Some(candidate);
        }
        self.display_name(&candidate.to_lowercase())
    }

    /// Every entry must lowercase back to its own key; a loader that hand-built this
    /// map incorrectly would otherwise silently misresolve names.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (lower, display) in &self.0 {
            if &display.to_lowercase() != lower {
                return Err(ConfigError::InconsistentCaseMap {
                    lower: lower.clone(),
                    display: display.clone(),
                });
            }
        }
        Ok(())
    }
}
