//! Sourced proficiency ledger
//!
//! Every listed proficiency carries the set of rule sources that granted it
//! ("Race", "Class", "Background Choice", ...). Retracting one source never
//! disturbs the others; a proficiency leaves the listing only when its last
//! source is gone.
//!
//! Names match case- and accent-insensitively. The casing seen first is the
//! stored casing and is never rewritten.

use ahash::AHashMap;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::normalize::normalize;
use crate::core::types::ProficiencyType;

/// Insertion-ordered set of source labels
pub type SourceSet = IndexSet<String>;

/// What a successful grant changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrantOutcome {
    /// Stored casing of the granted proficiency
    pub name: String,
    /// The listing gained a brand-new entry
    pub newly_listed: bool,
    /// The source was not attached before
    pub source_added: bool,
}

/// Per-type listings plus source attribution
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LedgerData")]
pub struct ProficiencyLedger {
    proficiencies: AHashMap<ProficiencyType, Vec<String>>,
    proficiency_sources: AHashMap<ProficiencyType, IndexMap<String, SourceSet>>,
    /// Normalized key -> stored casing
    #[serde(skip)]
    keys: AHashMap<ProficiencyType, AHashMap<String, String>>,
}

/// Raw serialized shape, possibly from older character files
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct LedgerData {
    proficiencies: AHashMap<ProficiencyType, Vec<String>>,
    proficiency_sources: AHashMap<ProficiencyType, IndexMap<String, SourceSet>>,
}

impl From<LedgerData> for ProficiencyLedger {
    fn from(data: LedgerData) -> Self {
        let mut ledger = Self::default();

        // Listed names win the casing; later case-variants are duplicates.
        for (ty, names) in data.proficiencies {
            let listed = ledger.proficiencies.entry(ty).or_default();
            let keys = ledger.keys.entry(ty).or_default();
            for name in names {
                let key = normalize(&name);
                if key.is_empty() || keys.contains_key(&key) {
                    continue;
                }
                keys.insert(key, name.clone());
                listed.push(name);
            }
        }

        for (ty, entries) in data.proficiency_sources {
            let listed = ledger.proficiencies.entry(ty).or_default();
            let keys = ledger.keys.entry(ty).or_default();
            let sources = ledger.proficiency_sources.entry(ty).or_default();
            for (name, set) in entries {
                let key = normalize(&name);
                if key.is_empty() || set.is_empty() {
                    continue;
                }
                let canonical = keys.entry(key).or_insert(name).clone();
                if !listed.contains(&canonical) {
                    listed.push(canonical.clone());
                }
                sources.entry(canonical).or_default().extend(set);
            }
        }

        ledger
    }
}

impl ProficiencyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed empty containers for a type. Returns true if anything was missing.
    pub fn ensure_type(&mut self, ty: ProficiencyType) -> bool {
        let mut created = false;
        if !self.proficiencies.contains_key(&ty) {
            self.proficiencies.insert(ty, Vec::new());
            created = true;
        }
        if !self.proficiency_sources.contains_key(&ty) {
            self.proficiency_sources.insert(ty, IndexMap::new());
            created = true;
        }
        self.keys.entry(ty).or_default();
        created
    }

    /// Are both containers for this type present?
    pub fn has_type(&self, ty: ProficiencyType) -> bool {
        self.proficiencies.contains_key(&ty) && self.proficiency_sources.contains_key(&ty)
    }

    /// Stored casing for a name, if the ledger knows it
    pub fn canonical_name(&self, ty: ProficiencyType, name: &str) -> Option<&str> {
        self.keys.get(&ty)?.get(&normalize(name)).map(String::as_str)
    }

    /// Attach `source` to `name`, listing it if new.
    ///
    /// Returns `None` for an empty name or source.
    pub fn grant(&mut self, ty: ProficiencyType, name: &str, source: &str) -> Option<GrantOutcome> {
        let name = name.trim();
        let key = normalize(name);
        if key.is_empty() {
            tracing::warn!(%ty, source, "Ignoring grant with empty name");
            return None;
        }
        if source.trim().is_empty() {
            tracing::warn!(%ty, name, "Ignoring grant with empty source");
            return None;
        }

        let canonical = self
            .keys
            .entry(ty)
            .or_default()
            .entry(key)
            .or_insert_with(|| name.to_string())
            .clone();

        let listed = self.proficiencies.entry(ty).or_default();
        let newly_listed = !listed.contains(&canonical);
        if newly_listed {
            listed.push(canonical.clone());
        }

        let source_added = self
            .proficiency_sources
            .entry(ty)
            .or_default()
            .entry(canonical.clone())
            .or_default()
            .insert(source.to_string());

        tracing::debug!(%ty, name = %canonical, source, newly_listed, "Granted proficiency");

        Some(GrantOutcome {
            name: canonical,
            newly_listed,
            source_added,
        })
    }

    /// Detach one source from one name. Returns true if it was attached.
    pub fn retract(&mut self, ty: ProficiencyType, name: &str, source: &str) -> bool {
        let Some(canonical) = self.canonical_name(ty, name).map(str::to_string) else {
            return false;
        };
        let Some(entries) = self.proficiency_sources.get_mut(&ty) else {
            return false;
        };
        let Some(set) = entries.get_mut(&canonical) else {
            return false;
        };
        if !set.shift_remove(source) {
            return false;
        }

        if set.is_empty() {
            entries.shift_remove(&canonical);
            self.drop_listing(ty, &canonical);
            tracing::debug!(%ty, name = %canonical, source, "Retracted last source");
        } else {
            tracing::debug!(%ty, name = %canonical, source, "Retracted source");
        }
        true
    }

    /// Detach `source` everywhere.
    ///
    /// Reports every name that lost the source, grouped by type, whether or
    /// not other sources keep it listed.
    pub fn remove_by_source(&mut self, source: &str) -> BTreeMap<ProficiencyType, Vec<String>> {
        let mut removed = BTreeMap::new();
        if source.trim().is_empty() {
            tracing::warn!("Ignoring removal with empty source");
            return removed;
        }

        for ty in ProficiencyType::ALL {
            let names: Vec<String> = self
                .proficiency_sources
                .get(&ty)
                .map(|entries| {
                    entries
                        .iter()
                        .filter(|(_, set)| set.contains(source))
                        .map(|(name, _)| name.clone())
                        .collect()
                })
                .unwrap_or_default();
            if names.is_empty() {
                continue;
            }
            for name in &names {
                self.retract(ty, name, source);
            }
            removed.insert(ty, names);
        }

        removed
    }

    /// Case-insensitive membership in the listing
    pub fn has(&self, ty: ProficiencyType, name: &str) -> bool {
        let Some(canonical) = self.canonical_name(ty, name) else {
            return false;
        };
        self.proficiencies
            .get(&ty)
            .is_some_and(|listed| listed.iter().any(|n| n == canonical))
    }

    /// Sources attached to a name; empty if absent
    pub fn sources(&self, ty: ProficiencyType, name: &str) -> SourceSet {
        self.canonical_name(ty, name)
            .and_then(|canonical| self.proficiency_sources.get(&ty)?.get(canonical))
            .cloned()
            .unwrap_or_default()
    }

    /// Insertion-ordered listing for a type
    pub fn listed(&self, ty: ProficiencyType) -> &[String] {
        self.proficiencies.get(&ty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Does any source other than an optional choice grant this name?
    pub fn granted_outside_choices(
        &self,
        ty: ProficiencyType,
        name: &str,
        is_choice: impl Fn(&str) -> bool,
    ) -> bool {
        self.canonical_name(ty, name)
            .and_then(|canonical| self.proficiency_sources.get(&ty)?.get(canonical))
            .is_some_and(|set| set.iter().any(|source| !is_choice(source)))
    }

    fn drop_listing(&mut self, ty: ProficiencyType, canonical: &str) {
        if let Some(listed) = self.proficiencies.get_mut(&ty) {
            listed.retain(|n| n != canonical);
        }
        if let Some(keys) = self.keys.get_mut(&ty) {
            keys.remove(&normalize(canonical));
        }
    }
}
