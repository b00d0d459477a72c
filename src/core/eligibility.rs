use crate::domain::model::{Professional, ProfessionalId, ServiceId};
use std::collections::BTreeSet;

/// Selects the professionals whose skillset is a superset of the request.
pub struct EligibilityFilter;

impl EligibilityFilter {
    /// Pure set containment over an explicit roster snapshot. The result is
    /// ordered by professional id so a seeded draw is reproducible no matter
    /// how the roster was listed.
    pub fn filter(requested: &BTreeSet<ServiceId>, roster: &[Professional]) -> Vec<Professional> {
        let mut eligible: Vec<Professional> = roster
            .iter()
            .filter(|p| p.covers(requested))
            .cloned()
            .collect();
        eligible.sort_by(|a, b| a.id.cmp(&b.id));
        eligible.dedup_by(|a, b| a.id == b.id);
        eligible
    }

    /// Drops professionals already holding a booking at the requested time.
    pub fn without_busy(candidates: Vec<Professional>, busy: &BTreeSet<ProfessionalId>) -> Vec<Professional> {
        if busy.is_empty() {
            return candidates;
        }
        candidates
            .into_iter()
            .filter(|p| !busy.contains(&p.id))
            .collect()
    }

    /// First requested service the professional cannot perform, if any.
    pub fn missing_skill<'a>(
        professional: &Professional,
        requested: &'a BTreeSet<ServiceId>,
    ) -> Option<&'a ServiceId> {
        requested.iter().find(|s| !professional.skillset.contains(*s))
    }
}
