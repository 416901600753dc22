//! Integration tests for sourced proficiencies and optional picks

use proficiency_ledger::proficiency::ProficiencyEventKind;
use proficiency_ledger::{Character, LedgerConfig, Origin, ProficiencyType};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Scenario A: a fresh character speaks Common by default
#[test]
fn test_fresh_character_defaults() {
    let character = Character::new("Brannoc");

    assert_eq!(character.proficiencies(ProficiencyType::Languages), ["Common"]);
    let sources = character.grant_sources(ProficiencyType::Languages, "Common");
    assert_eq!(sources.len(), 1);
    assert!(sources.contains("Default"));

    for ty in ProficiencyType::ALL {
        if ty != ProficiencyType::Languages {
            assert!(character.proficiencies(ty).is_empty());
        }
        assert_eq!(character.aggregate(ty).allowed, 0);
    }
}

/// Scenario B: a full origin refuses further picks
#[test]
fn test_capacity_scenario() {
    let mut character = Character::new("Brannoc");
    character
        .set_allocation(
            ProficiencyType::Skills,
            Origin::Class,
            2,
            &names(&["Athletics", "Stealth", "Perception"]),
        )
        .unwrap();

    assert!(character.select_optional(ProficiencyType::Skills, Origin::Class, "Athletics").unwrap());
    assert!(character.select_optional(ProficiencyType::Skills, Origin::Class, "Stealth").unwrap());
    assert!(!character.select_optional(ProficiencyType::Skills, Origin::Class, "Perception").unwrap());

    assert_eq!(character.aggregate(ProficiencyType::Skills).selected, ["Athletics", "Stealth"]);
    assert!(!character.has_grant(ProficiencyType::Skills, "Perception"));
}

/// Scenario C: options already granted for free are not offered
#[test]
fn test_already_free_filter() {
    let mut character = Character::new("Brannoc");
    character
        .set_allocation(
            ProficiencyType::Skills,
            Origin::Class,
            2,
            &names(&["Athletics", "Stealth", "Perception"]),
        )
        .unwrap();
    character.add_grant(ProficiencyType::Skills, "Athletics", "Race");

    let available = character.available_options(ProficiencyType::Skills, Origin::Class);
    assert_eq!(available, ["Stealth", "Perception"]);
}

/// Scenario D: removing a source reports every affected type
#[test]
fn test_multi_type_retraction() {
    let mut character = Character::new("Brannoc");
    character.add_grant(ProficiencyType::Armor, "Light Armor", "Race");
    character.add_grant(ProficiencyType::Armor, "Medium Armor", "Race");
    character.add_grant(ProficiencyType::Weapons, "Battleaxe", "Race");
    character.add_grant(ProficiencyType::Skills, "Perception", "Race");
    character.add_grant(ProficiencyType::Skills, "Perception", "Background");
    character.add_grant(ProficiencyType::Tools, "Smith's Tools", "Background");

    let removed = character.remove_grants_by_source("Race");
    assert_eq!(removed.len(), 3);
    assert_eq!(removed[&ProficiencyType::Armor], ["Light Armor", "Medium Armor"]);
    assert_eq!(removed[&ProficiencyType::Weapons], ["Battleaxe"]);
    assert_eq!(removed[&ProficiencyType::Skills], ["Perception"]);

    assert!(character.proficiencies(ProficiencyType::Armor).is_empty());
    assert!(character.has_grant(ProficiencyType::Skills, "Perception"));
    assert!(character.has_grant(ProficiencyType::Tools, "Smith's Tools"));

    assert!(character.remove_grants_by_source("Race").is_empty());
}

/// A later free grant hands back the slot spent on the same skill
#[test]
fn test_refund_on_class_grant() {
    let mut character = Character::new("Brannoc");
    character
        .set_allocation(ProficiencyType::Skills, Origin::Race, 1, &names(&["Stealth", "Perception"]))
        .unwrap();
    assert!(character.select_optional(ProficiencyType::Skills, Origin::Race, "Stealth").unwrap());

    character.add_grant(ProficiencyType::Skills, "Stealth", "Class");

    let race = character.optional().config(ProficiencyType::Skills, Origin::Race).unwrap();
    assert!(race.selected.is_empty());
    let sources = character.grant_sources(ProficiencyType::Skills, "Stealth");
    assert!(sources.contains("Class"));
    assert!(!sources.contains("Race Choice"));
    assert!(character.has_grant(ProficiencyType::Skills, "Stealth"));

    // The freed slot can be spent again, but not on the now-free skill
    assert_eq!(
        character.available_options(ProficiencyType::Skills, Origin::Race),
        ["Perception"]
    );
    assert!(character.select_optional(ProficiencyType::Skills, Origin::Race, "Perception").unwrap());
}

/// A "Subrace" grant is not recognised as the race origin and refunds it
#[test]
fn test_subrace_grant_refunds_race_pick() {
    let mut character = Character::new("Brannoc");
    character
        .set_allocation(ProficiencyType::Skills, Origin::Race, 1, &names(&["Perception"]))
        .unwrap();
    character.select_optional(ProficiencyType::Skills, Origin::Race, "Perception").unwrap();

    character.add_grant(ProficiencyType::Skills, "Perception", "Subrace");
    assert!(character.aggregate(ProficiencyType::Skills).selected.is_empty());

    // A grant labelled exactly "Race" leaves the race pick alone
    character.select_optional(ProficiencyType::Skills, Origin::Race, "Perception").unwrap();
    character.add_grant(ProficiencyType::Skills, "Perception", "Race");
    assert_eq!(character.aggregate(ProficiencyType::Skills).selected, ["Perception"]);
}

/// Switching class: clear the old class picks and grants, then rebuild
#[test]
fn test_class_switch_flow() {
    let mut character = Character::new("Brannoc");
    character.add_grant(ProficiencyType::SavingThrows, "Strength", "Class");
    character.add_grant(ProficiencyType::SavingThrows, "Constitution", "Class");
    character
        .set_allocation(ProficiencyType::Skills, Origin::Class, 2, &names(&["Athletics", "Intimidation", "Survival"]))
        .unwrap();
    character.select_optional(ProficiencyType::Skills, Origin::Class, "Athletics").unwrap();
    character.select_optional(ProficiencyType::Skills, Origin::Class, "Survival").unwrap();

    character.remove_grants_by_source("Class");
    assert!(character.clear_allocation(ProficiencyType::Skills, Origin::Class).unwrap());

    assert!(character.proficiencies(ProficiencyType::SavingThrows).is_empty());
    assert!(character.proficiencies(ProficiencyType::Skills).is_empty());
    assert_eq!(character.aggregate(ProficiencyType::Skills).allowed, 0);

    character.add_grant(ProficiencyType::SavingThrows, "Intelligence", "Class");
    character
        .set_allocation(ProficiencyType::Skills, Origin::Class, 2, &names(&["Arcana", "History"]))
        .unwrap();
    assert_eq!(character.remaining_slots(ProficiencyType::Skills, Origin::Class), 2);
}

/// Every change reaches the event queue before the call returns
#[test]
fn test_events_follow_operations() {
    let mut character = Character::new("Brannoc");
    character.drain_events();

    character
        .set_allocation(ProficiencyType::Tools, Origin::Background, 1, &names(&["Disguise Kit"]))
        .unwrap();
    character.select_optional(ProficiencyType::Tools, Origin::Background, "Disguise Kit").unwrap();
    character.deselect_optional(ProficiencyType::Tools, Origin::Background, "Disguise Kit").unwrap();
    character.clear_allocation(ProficiencyType::Tools, Origin::Background).unwrap();

    let kinds: Vec<ProficiencyEventKind> = character.drain_events().into_iter().map(|e| e.kind).collect();
    assert!(matches!(kinds[0], ProficiencyEventKind::OptionalConfigured { allowed: 1, .. }));
    assert!(matches!(kinds[1], ProficiencyEventKind::GrantAdded { newly_listed: true, .. }));
    assert!(matches!(kinds[2], ProficiencyEventKind::OptionalSelected { .. }));
    assert!(matches!(kinds[3], ProficiencyEventKind::OptionalDeselected { .. }));
    assert!(matches!(kinds[4], ProficiencyEventKind::OptionalCleared { .. }));
    assert_eq!(kinds.len(), 5);
}

/// Older saves without origin sub-objects are filled in on load
#[test]
fn test_legacy_character_is_deep_filled() {
    let json = r#"{
        "name": "Legacy",
        "proficiencies": { "skills": ["stealth"], "languages": ["Common", "Elvish"] },
        "proficiencySources": {
            "skills": { "Stealth": ["Race Choice"] },
            "languages": { "Common": ["Default"], "Elvish": ["Race"] }
        },
        "optionalProficiencies": {
            "skills": { "allowed": 1, "options": ["Stealth"], "selected": ["Stealth"],
                        "race": { "allowed": 1, "options": ["Stealth"], "selected": ["Stealth"] } }
        }
    }"#;
    let mut character = Character::from_json(json, LedgerConfig::default()).unwrap();

    assert_eq!(character.proficiencies(ProficiencyType::Languages), ["Common", "Elvish"]);
    assert!(character.optional().config(ProficiencyType::Skills, Origin::Class).is_some());
    assert!(character.optional().config(ProficiencyType::Armor, Origin::Race).is_some());

    // Legacy casing stays authoritative and refunds still work
    character.add_grant(ProficiencyType::Skills, "STEALTH", "Background");
    assert_eq!(character.proficiencies(ProficiencyType::Skills), ["stealth"]);
    assert!(character.aggregate(ProficiencyType::Skills).selected.is_empty());
    let sources = character.grant_sources(ProficiencyType::Skills, "Stealth");
    assert_eq!(sources.iter().collect::<Vec<_>>(), ["Background"]);
}
