//! Change notifications observed by the UI

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::types::{CharacterId, Origin, ProficiencyType};

/// A single proficiency change
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProficiencyEvent {
    pub id: u32,
    pub character: CharacterId,
    pub kind: ProficiencyEventKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProficiencyEventKind {
    // Ledger
    GrantAdded { ty: ProficiencyType, name: String, source: String, newly_listed: bool },
    GrantsRemovedBySource { source: String, removed: BTreeMap<ProficiencyType, Vec<String>> },

    // Optional allocations
    OptionalConfigured { ty: ProficiencyType, origin: Origin, allowed: u32 },
    OptionalCleared { ty: ProficiencyType, origin: Origin },
    OptionalSelected { ty: ProficiencyType, origin: Origin, name: String },
    OptionalDeselected { ty: ProficiencyType, origin: Origin, name: String },

    /// A paid optional pick was returned because `source` now grants it for free
    Refunded { ty: ProficiencyType, origin: Origin, name: String, source: String },
}

/// Pending notifications, drained by the UI after each action
#[derive(Clone, Debug, Default)]
pub struct EventQueue {
    events: Vec<ProficiencyEvent>,
    next_event_id: u32,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, character: CharacterId, kind: ProficiencyEventKind) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        self.events.push(ProficiencyEvent { id, character, kind });
        id
    }

    /// Events emitted since the last drain
    pub fn pending(&self) -> &[ProficiencyEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<ProficiencyEvent> {
        std::mem::take(&mut self.events)
    }
}
