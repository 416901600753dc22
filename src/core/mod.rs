pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use normalize::normalize;
pub use types::{CharacterId, Origin, ProficiencyType};
