//! Player character aggregate
//!
//! The character owns its proficiency ledger and optional allocations. All
//! proficiency operations go through `&mut Character` so the refund pass and
//! aggregate rebuild always see one consistent state.

pub mod proficiencies;

use serde::{Deserialize, Serialize};

use crate::core::config::LedgerConfig;
use crate::core::error::Result;
use crate::core::types::{CharacterId, ProficiencyType};
use crate::proficiency::{EventQueue, OptionalAllocationTracker, ProficiencyEvent, ProficiencyLedger};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    #[serde(default)]
    pub id: CharacterId,
    #[serde(default)]
    pub name: String,

    #[serde(flatten)]
    ledger: ProficiencyLedger,

    #[serde(flatten)]
    optional: OptionalAllocationTracker,

    #[serde(skip)]
    config: LedgerConfig,

    #[serde(skip)]
    events: EventQueue,
}

impl Character {
    /// Create a fresh, initialized character with default rules
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, LedgerConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: LedgerConfig) -> Self {
        let mut character = Self {
            id: CharacterId::new(),
            name: name.into(),
            ledger: ProficiencyLedger::new(),
            optional: OptionalAllocationTracker::new(),
            config,
            events: EventQueue::new(),
        };
        character.initialize_structures();
        character
    }

    /// Load a character from JSON, filling in anything older data lacks
    pub fn from_json(json: &str, config: LedgerConfig) -> Result<Self> {
        let mut character: Character = serde_json::from_str(json)?;
        character.config = config;
        character.initialize_structures();
        Ok(character)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Seed every proficiency type and the default language.
    ///
    /// Safe to call repeatedly: present containers are left alone, missing
    /// origins are filled, and the default language is granted only while
    /// the character knows no language at all.
    pub fn initialize_structures(&mut self) {
        let mut seeded = 0;
        for ty in ProficiencyType::ALL {
            let ledger_seeded = self.ledger.ensure_type(ty);
            let optional_seeded = self.optional.ensure_type(ty);
            if ledger_seeded || optional_seeded {
                seeded += 1;
            }
        }

        if self.ledger.listed(ProficiencyType::Languages).is_empty() {
            let language = self.config.default_language.clone();
            let source = self.config.default_language_source.clone();
            self.add_grant(ProficiencyType::Languages, &language, &source);
        }

        tracing::debug!(character = %self.id, seeded, "Initialized proficiency structures");
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn ledger(&self) -> &ProficiencyLedger {
        &self.ledger
    }

    pub fn optional(&self) -> &OptionalAllocationTracker {
        &self.optional
    }

    /// Notifications emitted since the last drain
    pub fn pending_events(&self) -> &[ProficiencyEvent] {
        self.events.pending()
    }

    pub fn drain_events(&mut self) -> Vec<ProficiencyEvent> {
        self.events.drain()
    }
}
