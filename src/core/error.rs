use thiserror::Error;

use crate::core::types::{Origin, ProficiencyType};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("No {origin} allocation configured for {ty}")]
    NotConfigured { ty: ProficiencyType, origin: Origin },

    #[error("{origin} allocation for {ty} is full ({allowed} allowed)")]
    LimitExceeded {
        ty: ProficiencyType,
        origin: Origin,
        allowed: u32,
    },

    #[error("'{name}' is not available for {origin} {ty}: {reason}")]
    NotAvailable {
        ty: ProficiencyType,
        origin: Origin,
        name: String,
        reason: &'static str,
    },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl LedgerError {
    /// True for rejections that are routine UI feedback rather than bad input
    pub fn is_business_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::NotConfigured { .. }
                | LedgerError::LimitExceeded { .. }
                | LedgerError::NotAvailable { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
