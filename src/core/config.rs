//! Ledger configuration with documented defaults
//!
//! The defaults reproduce the standard character-builder rules. A TOML file
//! may override any subset of them.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{LedgerError, Result};
use crate::core::types::{Origin, ProficiencyType};

/// Configuration for the proficiency ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Language granted to every freshly initialized character
    ///
    /// Only applied when the character knows no languages yet.
    pub default_language: String,

    /// Source label attached to the default language grant
    pub default_language_source: String,

    /// Substring that marks a source label as an optional choice
    ///
    /// Must occur in "Race Choice", "Class Choice" and "Background Choice",
    /// which are always treated as choices. Grants from choice sources never
    /// trigger refunds.
    pub choice_marker: String,

    /// Proficiency types whose optional picks are refunded when the same
    /// proficiency later arrives from a non-choice source
    pub refund_types: Vec<ProficiencyType>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            default_language: "Common".to_string(),
            default_language_source: "Default".to_string(),
            choice_marker: "Choice".to_string(),
            refund_types: vec![ProficiencyType::Skills],
        }
    }
}

impl LedgerConfig {
    /// Does this source label denote an optional choice?
    pub fn is_choice_source(&self, source: &str) -> bool {
        if Origin::ALL.iter().any(|origin| origin.choice_source() == source) {
            return true;
        }
        !self.choice_marker.is_empty() && source.contains(self.choice_marker.as_str())
    }

    /// Should a non-choice grant of this type refund optional picks?
    pub fn refunds(&self, ty: ProficiencyType) -> bool {
        self.refund_types.contains(&ty)
    }

    /// Load configuration from a TOML file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LedgerError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: LedgerConfig = toml::from_str(content)
            .map_err(|e| LedgerError::Config(format!("Invalid TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the ledger cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.default_language.trim().is_empty() {
            return Err(LedgerError::Config("default_language must not be empty".into()));
        }
        if self.default_language_source.trim().is_empty() {
            return Err(LedgerError::Config(
                "default_language_source must not be empty".into(),
            ));
        }
        if self.choice_marker.is_empty() {
            return Err(LedgerError::Config("choice_marker must not be empty".into()));
        }
        for origin in Origin::ALL {
            let label = origin.choice_source();
            if !label.contains(self.choice_marker.as_str()) {
                return Err(LedgerError::Config(format!(
                    "choice_marker '{}' does not occur in '{}'",
                    self.choice_marker, label
                )));
            }
        }
        Ok(())
    }
}
