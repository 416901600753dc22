//! Optional proficiency slots per origin
//!
//! Race, class and background may each offer "choose N from this list" slots
//! for a proficiency type. Each origin keeps its own allocation; the combined
//! view across origins is derived and rebuilt after every change.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::core::error::{LedgerError, Result};
use crate::core::normalize::normalize;
use crate::core::types::{Origin, ProficiencyType};

/// Slots offered by one origin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    pub allowed: u32,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

impl AllocationConfig {
    pub fn is_selected(&self, name: &str) -> bool {
        let key = normalize(name);
        self.selected.iter().any(|s| normalize(s) == key)
    }

    /// Option entry matching `name`, in its stored casing
    pub fn find_option(&self, name: &str) -> Option<&str> {
        let key = normalize(name);
        self.options
            .iter()
            .find(|o| normalize(o) == key)
            .map(String::as_str)
    }

    pub fn remaining(&self) -> u32 {
        self.allowed.saturating_sub(self.selected.len() as u32)
    }

    /// Remove `name` from the selection, returning the stored casing
    fn take_selected(&mut self, name: &str) -> Option<String> {
        let key = normalize(name);
        let idx = self.selected.iter().position(|s| normalize(s) == key)?;
        Some(self.selected.remove(idx))
    }
}

/// Sum/union view across all origins
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateAllocation {
    pub allowed: u64,
    pub options: Vec<String>,
    pub selected: Vec<String>,
}

/// Everything tracked for one proficiency type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionalProficiencies {
    #[serde(flatten)]
    pub aggregate: AggregateAllocation,
    pub race: Option<AllocationConfig>,
    pub class: Option<AllocationConfig>,
    pub background: Option<AllocationConfig>,
}

impl OptionalProficiencies {
    pub fn origin(&self, origin: Origin) -> Option<&AllocationConfig> {
        match origin {
            Origin::Race => self.race.as_ref(),
            Origin::Class => self.class.as_ref(),
            Origin::Background => self.background.as_ref(),
        }
    }

    pub fn origin_mut(&mut self, origin: Origin) -> &mut Option<AllocationConfig> {
        match origin {
            Origin::Race => &mut self.race,
            Origin::Class => &mut self.class,
            Origin::Background => &mut self.background,
        }
    }

    /// Rebuild the aggregate from the three origins
    pub fn recompute(&mut self) {
        let mut aggregate = AggregateAllocation::default();
        let mut seen_options = AHashSet::new();
        let mut seen_selected = AHashSet::new();

        for origin in Origin::ALL {
            let Some(config) = self.origin(origin) else {
                continue;
            };
            aggregate.allowed += u64::from(config.allowed);
            for name in &config.options {
                if seen_options.insert(normalize(name)) {
                    aggregate.options.push(name.clone());
                }
            }
            for name in &config.selected {
                if seen_selected.insert(normalize(name)) {
                    aggregate.selected.push(name.clone());
                }
            }
        }

        self.aggregate = aggregate;
    }
}

/// Optional allocations for every proficiency type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionalAllocationTracker {
    optional_proficiencies: AHashMap<ProficiencyType, OptionalProficiencies>,
}

impl OptionalAllocationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the type and fill any missing origin. Returns true if anything changed.
    pub fn ensure_type(&mut self, ty: ProficiencyType) -> bool {
        let mut changed = false;
        let entry = self.optional_proficiencies.entry(ty).or_insert_with(|| {
            changed = true;
            OptionalProficiencies::default()
        });
        for origin in Origin::ALL {
            let slot = entry.origin_mut(origin);
            if slot.is_none() {
                *slot = Some(AllocationConfig::default());
                changed = true;
            }
        }
        entry.recompute();
        changed
    }

    pub fn has_type(&self, ty: ProficiencyType) -> bool {
        self.optional_proficiencies.contains_key(&ty)
    }

    pub fn get(&self, ty: ProficiencyType) -> Option<&OptionalProficiencies> {
        self.optional_proficiencies.get(&ty)
    }

    pub fn config(&self, ty: ProficiencyType, origin: Origin) -> Option<&AllocationConfig> {
        self.optional_proficiencies.get(&ty)?.origin(origin)
    }

    /// Combined view for a type; empty if the type was never seeded
    pub fn aggregate(&self, ty: ProficiencyType) -> AggregateAllocation {
        self.optional_proficiencies
            .get(&ty)
            .map(|optional| optional.aggregate.clone())
            .unwrap_or_default()
    }

    pub fn recompute(&mut self, ty: ProficiencyType) {
        if let Some(optional) = self.optional_proficiencies.get_mut(&ty) {
            optional.recompute();
        }
    }

    /// Replace an origin's slot count and options.
    ///
    /// Existing selections are kept even when they drop out of the new
    /// options. Selections beyond the new slot count are trimmed from the end
    /// and returned so their grants can be retracted.
    pub fn configure(
        &mut self,
        ty: ProficiencyType,
        origin: Origin,
        allowed: u32,
        options: &[String],
    ) -> Result<Vec<String>> {
        let mut unique = Vec::with_capacity(options.len());
        let mut seen = AHashSet::new();
        for option in options {
            let key = normalize(option);
            if key.is_empty() {
                return Err(LedgerError::Validation(format!(
                    "empty option in {origin} {ty} allocation"
                )));
            }
            if seen.insert(key) {
                unique.push(option.trim().to_string());
            }
        }

        let optional = self.optional_proficiencies.entry(ty).or_default();
        let config = optional.origin_mut(origin).get_or_insert_with(AllocationConfig::default);
        config.allowed = allowed;
        config.options = unique;
        let trimmed = if config.selected.len() > allowed as usize {
            config.selected.split_off(allowed as usize)
        } else {
            Vec::new()
        };
        optional.recompute();
        Ok(trimmed)
    }

    /// Reset an origin to zero slots, returning what had been selected
    pub fn clear(&mut self, ty: ProficiencyType, origin: Origin) -> Result<Vec<String>> {
        let optional = self
            .optional_proficiencies
            .get_mut(&ty)
            .ok_or(LedgerError::NotConfigured { ty, origin })?;
        let config = optional
            .origin_mut(origin)
            .as_mut()
            .ok_or(LedgerError::NotConfigured { ty, origin })?;
        let selected = std::mem::take(&mut config.selected);
        *config = AllocationConfig::default();
        optional.recompute();
        Ok(selected)
    }

    /// Record a selection after checking every precondition.
    ///
    /// Returns the option's stored casing.
    pub fn select(&mut self, ty: ProficiencyType, origin: Origin, name: &str) -> Result<String> {
        if normalize(name).is_empty() {
            return Err(LedgerError::Validation(format!(
                "empty name selected for {origin} {ty}"
            )));
        }
        let optional = self
            .optional_proficiencies
            .get_mut(&ty)
            .ok_or(LedgerError::NotConfigured { ty, origin })?;
        let config = optional
            .origin_mut(origin)
            .as_mut()
            .ok_or(LedgerError::NotConfigured { ty, origin })?;

        if config.is_selected(name) {
            return Err(LedgerError::NotAvailable {
                ty,
                origin,
                name: name.to_string(),
                reason: "already selected",
            });
        }
        if config.selected.len() >= config.allowed as usize {
            return Err(LedgerError::LimitExceeded {
                ty,
                origin,
                allowed: config.allowed,
            });
        }
        let Some(option) = config.find_option(name).map(str::to_string) else {
            return Err(LedgerError::NotAvailable {
                ty,
                origin,
                name: name.to_string(),
                reason: "not one of the options",
            });
        };

        config.selected.push(option.clone());
        optional.recompute();
        Ok(option)
    }

    /// Drop a selection, returning its stored casing
    pub fn deselect(&mut self, ty: ProficiencyType, origin: Origin, name: &str) -> Result<String> {
        if normalize(name).is_empty() {
            return Err(LedgerError::Validation(format!(
                "empty name deselected for {origin} {ty}"
            )));
        }
        let optional = self
            .optional_proficiencies
            .get_mut(&ty)
            .ok_or(LedgerError::NotConfigured { ty, origin })?;
        let config = optional
            .origin_mut(origin)
            .as_mut()
            .ok_or(LedgerError::NotConfigured { ty, origin })?;

        let removed = config
            .take_selected(name)
            .ok_or_else(|| LedgerError::NotAvailable {
                ty,
                origin,
                name: name.to_string(),
                reason: "not selected",
            })?;
        optional.recompute();
        Ok(removed)
    }

    /// Remove `name` from every origin's selection except `skip`.
    ///
    /// Returns the origins that gave it up, with the stored casing.
    pub fn take_from_other_origins(
        &mut self,
        ty: ProficiencyType,
        name: &str,
        skip: Option<Origin>,
    ) -> Vec<(Origin, String)> {
        let Some(optional) = self.optional_proficiencies.get_mut(&ty) else {
            return Vec::new();
        };

        let mut taken = Vec::new();
        for origin in Origin::ALL {
            if Some(origin) == skip {
                continue;
            }
            if let Some(config) = optional.origin_mut(origin).as_mut() {
                if let Some(removed) = config.take_selected(name) {
                    taken.push((origin, removed));
                }
            }
        }

        if !taken.is_empty() {
            optional.recompute();
        }
        taken
    }

    /// Options an origin still offers, minus selections and anything in `exclude`
    pub fn available(
        &self,
        ty: ProficiencyType,
        origin: Origin,
        exclude: impl Fn(&str) -> bool,
    ) -> Vec<String> {
        let Some(config) = self.config(ty, origin) else {
            return Vec::new();
        };
        config
            .options
            .iter()
            .filter(|option| !config.is_selected(option) && !exclude(option))
            .cloned()
            .collect()
    }
}
