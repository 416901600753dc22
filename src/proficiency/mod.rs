//! Proficiency bookkeeping
//!
//! A character's proficiencies come from several independent rule sources.
//! The ledger records who granted what, the tracker records optional picks
//! per origin, and the reconciler hands picks back when a rule later grants
//! the same proficiency for free.

pub mod allocation;
pub mod events;
pub mod ledger;
pub mod refund;

pub use allocation::{AggregateAllocation, AllocationConfig, OptionalAllocationTracker, OptionalProficiencies};
pub use events::{EventQueue, ProficiencyEvent, ProficiencyEventKind};
pub use ledger::{GrantOutcome, ProficiencyLedger, SourceSet};
pub use refund::{reconcile, Refund};
