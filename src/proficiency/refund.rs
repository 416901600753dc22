//! Refunds for optional picks that became free

use crate::core::config::LedgerConfig;
use crate::core::types::{Origin, ProficiencyType};
use crate::proficiency::allocation::OptionalAllocationTracker;
use crate::proficiency::ledger::ProficiencyLedger;

/// An optional pick handed back to its origin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Refund {
    pub origin: Origin,
    pub name: String,
}

/// Return optional picks of `name` now that `source` grants it outright.
///
/// The origin whose label equals `source` exactly keeps its pick; a grant
/// labelled "Subrace" is not recognised as the race origin. Runs after the
/// grant has been recorded and rebuilds the aggregate before returning.
pub fn reconcile(
    ledger: &mut ProficiencyLedger,
    tracker: &mut OptionalAllocationTracker,
    config: &LedgerConfig,
    ty: ProficiencyType,
    name: &str,
    source: &str,
) -> Vec<Refund> {
    if !config.refunds(ty) || config.is_choice_source(source) {
        return Vec::new();
    }

    let skip = Origin::ALL.into_iter().find(|origin| origin.label() == source);
    let taken = tracker.take_from_other_origins(ty, name, skip);

    taken
        .into_iter()
        .map(|(origin, chosen)| {
            ledger.retract(ty, &chosen, &origin.choice_source());
            tracing::info!(%ty, %origin, name = %chosen, source, "Refunded optional pick");
            Refund {
                origin,
                name: chosen,
            }
        })
        .collect()
}
