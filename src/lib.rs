//! Proficiency Ledger - sourced character proficiencies with optional picks

pub mod character;
pub mod core;
pub mod proficiency;

pub use character::Character;
pub use crate::core::{LedgerConfig, LedgerError, Origin, ProficiencyType};
