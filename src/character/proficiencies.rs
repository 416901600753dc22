//! Proficiency operations on a character
//!
//! Ledger operations never fail loudly: bad input is logged and answered with
//! `false` or an empty map. Allocation operations return `Err` only for
//! malformed identifiers; ordinary rejections such as a full slot are logged
//! and reported as `Ok(false)`.

use std::collections::BTreeMap;

use crate::character::Character;
use crate::core::error::{LedgerError, Result};
use crate::core::types::{Origin, ProficiencyType};
use crate::proficiency::refund::reconcile;
use crate::proficiency::{AggregateAllocation, ProficiencyEventKind, SourceSet};

impl Character {
    // ========================================================================
    // Ledger
    // ========================================================================

    /// Grant `name` from `source`. Returns true only if the proficiency is
    /// newly listed.
    ///
    /// A non-choice grant also refunds any optional pick of the same name.
    pub fn add_grant(&mut self, ty: ProficiencyType, name: &str, source: &str) -> bool {
        let Some(outcome) = self.ledger.grant(ty, name, source) else {
            return false;
        };

        if outcome.source_added {
            self.events.push(
                self.id,
                ProficiencyEventKind::GrantAdded {
                    ty,
                    name: outcome.name.clone(),
                    source: source.to_string(),
                    newly_listed: outcome.newly_listed,
                },
            );
        }

        let refunds = reconcile(
            &mut self.ledger,
            &mut self.optional,
            &self.config,
            ty,
            &outcome.name,
            source,
        );
        for refund in refunds {
            self.events.push(
                self.id,
                ProficiencyEventKind::Refunded {
                    ty,
                    origin: refund.origin,
                    name: refund.name,
                    source: source.to_string(),
                },
            );
        }

        outcome.newly_listed
    }

    /// Retract `source` from every proficiency it granted
    pub fn remove_grants_by_source(&mut self, source: &str) -> BTreeMap<ProficiencyType, Vec<String>> {
        let removed = self.ledger.remove_by_source(source);
        if !removed.is_empty() {
            let count: usize = removed.values().map(Vec::len).sum();
            tracing::debug!(character = %self.id, source, count, "Removed grants by source");
            self.events.push(
                self.id,
                ProficiencyEventKind::GrantsRemovedBySource {
                    source: source.to_string(),
                    removed: removed.clone(),
                },
            );
        }
        removed
    }

    /// Retract one source from one proficiency
    pub fn retract_grant(&mut self, ty: ProficiencyType, name: &str, source: &str) -> bool {
        let stored = self.stored_name(ty, name);
        let retracted = self.ledger.retract(ty, name, source);
        if retracted {
            let mut removed = BTreeMap::new();
            removed.insert(ty, vec![stored]);
            self.events.push(
                self.id,
                ProficiencyEventKind::GrantsRemovedBySource {
                    source: source.to_string(),
                    removed,
                },
            );
        }
        retracted
    }

    pub fn has_grant(&self, ty: ProficiencyType, name: &str) -> bool {
        self.ledger.has(ty, name)
    }

    pub fn grant_sources(&self, ty: ProficiencyType, name: &str) -> SourceSet {
        self.ledger.sources(ty, name)
    }

    pub fn proficiencies(&self, ty: ProficiencyType) -> &[String] {
        self.ledger.listed(ty)
    }

    // ========================================================================
    // Optional allocations
    // ========================================================================

    /// Replace an origin's slot count and options.
    ///
    /// Earlier selections stay selected even if the new options omit them.
    /// When the slot count shrinks below the selection, the latest picks are
    /// dropped and their grants retracted.
    pub fn set_allocation(
        &mut self,
        ty: ProficiencyType,
        origin: Origin,
        allowed: u32,
        options: &[String],
    ) -> Result<()> {
        let trimmed = self.optional.configure(ty, origin, allowed, options)?;
        let source = origin.choice_source();
        for name in &trimmed {
            self.ledger.retract(ty, name, &source);
            tracing::warn!(character = %self.id, %ty, %origin, name = %name, "Dropped pick beyond new slot count");
            self.events.push(
                self.id,
                ProficiencyEventKind::OptionalDeselected {
                    ty,
                    origin,
                    name: name.clone(),
                },
            );
        }

        tracing::debug!(character = %self.id, %ty, %origin, allowed, options = options.len(), "Configured optional slots");
        self.events.push(self.id, ProficiencyEventKind::OptionalConfigured { ty, origin, allowed });
        Ok(())
    }

    /// Retract every pick made through an origin and reset it to zero slots.
    ///
    /// Returns false if the origin was never configured.
    pub fn clear_allocation(&mut self, ty: ProficiencyType, origin: Origin) -> Result<bool> {
        let selected = match self.optional.clear(ty, origin) {
            Ok(selected) => selected,
            Err(err) => return self.rejected(err),
        };

        let source = origin.choice_source();
        for name in &selected {
            self.ledger.retract(ty, name, &source);
        }

        tracing::debug!(character = %self.id, %ty, %origin, retracted = selected.len(), "Cleared optional slots");
        self.events.push(self.id, ProficiencyEventKind::OptionalCleared { ty, origin });
        Ok(true)
    }

    /// Spend one of an origin's slots on `name`
    pub fn select_optional(&mut self, ty: ProficiencyType, origin: Origin, name: &str) -> Result<bool> {
        match self.try_select_optional(ty, origin, name) {
            Ok(()) => Ok(true),
            Err(err) => self.rejected(err),
        }
    }

    /// Like [`Character::select_optional`] but reports why a pick was refused
    pub fn try_select_optional(&mut self, ty: ProficiencyType, origin: Origin, name: &str) -> Result<()> {
        let chosen = self.optional.select(ty, origin, name)?;
        self.add_grant(ty, &chosen, &origin.choice_source());

        tracing::debug!(character = %self.id, %ty, %origin, name = %chosen, "Selected optional proficiency");
        self.events.push(
            self.id,
            ProficiencyEventKind::OptionalSelected { ty, origin, name: chosen },
        );
        Ok(())
    }

    /// Give back a slot, retracting only that origin's choice grant
    pub fn deselect_optional(&mut self, ty: ProficiencyType, origin: Origin, name: &str) -> Result<bool> {
        match self.try_deselect_optional(ty, origin, name) {
            Ok(()) => Ok(true),
            Err(err) => self.rejected(err),
        }
    }

    pub fn try_deselect_optional(&mut self, ty: ProficiencyType, origin: Origin, name: &str) -> Result<()> {
        let removed = self.optional.deselect(ty, origin, name)?;
        self.ledger.retract(ty, &removed, &origin.choice_source());

        tracing::debug!(character = %self.id, %ty, %origin, name = %removed, "Deselected optional proficiency");
        self.events.push(
            self.id,
            ProficiencyEventKind::OptionalDeselected { ty, origin, name: removed },
        );
        Ok(())
    }

    /// Options still worth offering: not yet picked and not already granted
    /// by some non-choice source
    pub fn available_options(&self, ty: ProficiencyType, origin: Origin) -> Vec<String> {
        let config = &self.config;
        self.optional.available(ty, origin, |name| {
            self.ledger
                .granted_outside_choices(ty, name, |source| config.is_choice_source(source))
        })
    }

    /// Unspent slots for an origin; zero if unconfigured
    pub fn remaining_slots(&self, ty: ProficiencyType, origin: Origin) -> u32 {
        self.optional
            .config(ty, origin)
            .map(|config| config.remaining())
            .unwrap_or(0)
    }

    pub fn aggregate(&self, ty: ProficiencyType) -> AggregateAllocation {
        self.optional.aggregate(ty)
    }

    fn stored_name(&self, ty: ProficiencyType, name: &str) -> String {
        self.ledger
            .canonical_name(ty, name)
            .unwrap_or(name.trim())
            .to_string()
    }

    /// Log a refused allocation request; only malformed input becomes an error
    fn rejected(&self, err: LedgerError) -> Result<bool> {
        if err.is_business_rejection() {
            tracing::info!(character = %self.id, reason = %err, "Optional allocation refused");
            Ok(false)
        } else {
            tracing::warn!(character = %self.id, error = %err, "Invalid optional allocation request");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use ProficiencyType::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select_grants_choice_source() {
        let mut character = Character::new("Rook");
        character
            .set_allocation(Skills, Origin::Background, 1, &names(&["Insight", "Religion"]))
            .unwrap();

        assert!(character.select_optional(Skills, Origin::Background, "insight").unwrap());
        assert!(character.has_grant(Skills, "Insight"));
        assert!(character.grant_sources(Skills, "Insight").contains("Background Choice"));
        assert_eq!(character.remaining_slots(Skills, Origin::Background), 0);
    }

    #[test]
    fn test_select_survives_custom_choice_marker() {
        let config = crate::core::LedgerConfig {
            choice_marker: "Pick".to_string(),
            ..crate::core::LedgerConfig::default()
        };
        let mut character = Character::with_config("Rook", config);
        character.set_allocation(Skills, Origin::Race, 1, &names(&["Stealth"])).unwrap();

        assert!(character.select_optional(Skills, Origin::Race, "Stealth").unwrap());
        let race = character.optional().config(Skills, Origin::Race).unwrap();
        assert_eq!(race.selected, ["Stealth"]);
        assert!(character.grant_sources(Skills, "Stealth").contains("Race Choice"));
    }

    #[test]
    fn test_deselect_keeps_other_sources() {
        let mut character = Character::new("Rook");
        character.add_grant(Skills, "Insight", "Feat");
        character
            .set_allocation(Skills, Origin::Class, 1, &names(&["Insight"]))
            .unwrap();
        assert!(character.select_optional(Skills, Origin::Class, "Insight").unwrap());

        assert!(character.deselect_optional(Skills, Origin::Class, "INSIGHT").unwrap());
        let sources = character.grant_sources(Skills, "Insight");
        assert_eq!(sources.iter().collect::<Vec<_>>(), ["Feat"]);
        assert!(!character.deselect_optional(Skills, Origin::Class, "Insight").unwrap());
    }

    #[test]
    fn test_rejections_are_sentinels_but_bad_input_errors() {
        let mut character = Character::new("Rook");
        assert!(!character.select_optional(Tools, Origin::Race, "Tinker's Tools").unwrap());

        character.set_allocation(Tools, Origin::Race, 0, &names(&["Tinker's Tools"])).unwrap();
        assert!(!character.select_optional(Tools, Origin::Race, "Tinker's Tools").unwrap());
        assert!(matches!(
            character.try_select_optional(Tools, Origin::Race, "Tinker's Tools"),
            Err(LedgerError::LimitExceeded { .. })
        ));
        assert!(matches!(
            character.select_optional(Tools, Origin::Race, ""),
            Err(LedgerError::Validation(_))
        ));
        assert!(character.set_allocation(Tools, Origin::Race, 1, &names(&[""])).is_err());
    }

    #[test]
    fn test_clear_allocation_retracts_choices() {
        let mut character = Character::new("Rook");
        character
            .set_allocation(Languages, Origin::Race, 2, &names(&["Elvish", "Dwarvish", "Giant"]))
            .unwrap();
        character.select_optional(Languages, Origin::Race, "Elvish").unwrap();
        character.select_optional(Languages, Origin::Race, "Giant").unwrap();
        character.add_grant(Languages, "Giant", "Background");

        assert!(character.clear_allocation(Languages, Origin::Race).unwrap());
        assert!(!character.has_grant(Languages, "Elvish"));
        assert!(character.has_grant(Languages, "Giant"));
        assert_eq!(character.aggregate(Languages).allowed, 0);
        assert!(character.available_options(Languages, Origin::Race).is_empty());
    }

    #[test]
    fn test_shrinking_allocation_retracts_dropped_pick() {
        let mut character = Character::new("Rook");
        let options = names(&["Athletics", "Acrobatics"]);
        character.set_allocation(Skills, Origin::Class, 2, &options).unwrap();
        character.select_optional(Skills, Origin::Class, "Athletics").unwrap();
        character.select_optional(Skills, Origin::Class, "Acrobatics").unwrap();

        character.set_allocation(Skills, Origin::Class, 1, &options).unwrap();
        assert!(character.has_grant(Skills, "Athletics"));
        assert!(!character.has_grant(Skills, "Acrobatics"));
        assert_eq!(character.aggregate(Skills).selected, ["Athletics"]);
    }

    #[test]
    fn test_choice_grants_do_not_hide_options() {
        let mut character = Character::new("Rook");
        character.set_allocation(Skills, Origin::Race, 1, &names(&["Perception"])).unwrap();
        character.set_allocation(Skills, Origin::Class, 1, &names(&["Perception", "Survival"])).unwrap();
        character.select_optional(Skills, Origin::Race, "Perception").unwrap();

        // Picked through race, still offered by class
        assert_eq!(
            character.available_options(Skills, Origin::Class),
            ["Perception", "Survival"]
        );
    }

    #[test]
    fn test_refund_emits_event() {
        let mut character = Character::new("Rook");
        character.set_allocation(Skills, Origin::Race, 1, &names(&["Stealth"])).unwrap();
        character.select_optional(Skills, Origin::Race, "Stealth").unwrap();
        character.drain_events();

        assert!(!character.add_grant(Skills, "Stealth", "Class"));
        let events = character.drain_events();
        assert!(events.iter().any(|event| matches!(
            &event.kind,
            ProficiencyEventKind::Refunded { origin: Origin::Race, name, .. } if name == "Stealth"
        )));
        assert!(events.iter().all(|event| event.character == character.id));
        assert_eq!(character.remaining_slots(Skills, Origin::Race), 1);
    }

    #[test]
    fn test_retract_grant_reports_stored_name() {
        let mut character = Character::new("Rook");
        character.add_grant(Armor, "Medium Armor", "Class");
        character.drain_events();

        assert!(character.retract_grant(Armor, "medium armor", "Class"));
        let events = character.drain_events();
        match &events[0].kind {
            ProficiencyEventKind::GrantsRemovedBySource { removed, .. } => {
                assert_eq!(removed[&Armor], ["Medium Armor"]);
            }
            other => panic!("unexpected event {:?}", other),
        }
    }
}
