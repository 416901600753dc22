//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::core::error::LedgerError;

/// Unique identifier for characters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The six families of proficiency a character can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProficiencyType {
    Armor,
    Weapons,
    Tools,
    Skills,
    Languages,
    SavingThrows,
}

impl ProficiencyType {
    pub const ALL: [ProficiencyType; 6] = [
        ProficiencyType::Armor,
        ProficiencyType::Weapons,
        ProficiencyType::Tools,
        ProficiencyType::Skills,
        ProficiencyType::Languages,
        ProficiencyType::SavingThrows,
    ];

    /// Field label used in serialized character data
    pub fn as_str(&self) -> &'static str {
        match self {
            ProficiencyType::Armor => "armor",
            ProficiencyType::Weapons => "weapons",
            ProficiencyType::Tools => "tools",
            ProficiencyType::Skills => "skills",
            ProficiencyType::Languages => "languages",
            ProficiencyType::SavingThrows => "savingThrows",
        }
    }
}

impl fmt::Display for ProficiencyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProficiencyType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | ' ' | '-'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "armor" | "armour" => Ok(ProficiencyType::Armor),
            "weapons" | "weapon" => Ok(ProficiencyType::Weapons),
            "tools" | "tool" => Ok(ProficiencyType::Tools),
            "skills" | "skill" => Ok(ProficiencyType::Skills),
            "languages" | "language" => Ok(ProficiencyType::Languages),
            "savingthrows" | "savingthrow" | "saves" => Ok(ProficiencyType::SavingThrows),
            "" => Err(LedgerError::Validation("proficiency type is empty".into())),
            _ => Err(LedgerError::Validation(format!(
                "unknown proficiency type '{}'",
                s.trim()
            ))),
        }
    }
}

/// Channel through which optional proficiency slots are granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Race,
    Class,
    Background,
}

impl Origin {
    /// Fixed aggregation order
    pub const ALL: [Origin; 3] = [Origin::Race, Origin::Class, Origin::Background];

    /// Source label used when this origin grants a proficiency outright
    pub fn label(&self) -> &'static str {
        match self {
            Origin::Race => "Race",
            Origin::Class => "Class",
            Origin::Background => "Background",
        }
    }

    /// Source label attached to proficiencies picked from this origin's options
    pub fn choice_source(&self) -> String {
        format!("{} Choice", self.label())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Race => f.write_str("race"),
            Origin::Class => f.write_str("class"),
            Origin::Background => f.write_str("background"),
        }
    }
}

impl FromStr for Origin {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "race" => Ok(Origin::Race),
            "class" => Ok(Origin::Class),
            "background" => Ok(Origin::Background),
            "" => Err(LedgerError::Validation("origin is empty".into())),
            _ => Err(LedgerError::Validation(format!("unknown origin '{}'", s.trim()))),
        }
    }
}
