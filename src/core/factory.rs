use crate::core::assigner::Assigner;
use crate::core::conflict_guard::ConflictGuard;
use crate::core::eligibility::EligibilityFilter;
use crate::core::slot_validator::SlotValidator;
use crate::core::{Catalog, CommitPolicy, ReservationStore};
use crate::domain::model::{
    Event, Professional, ProfessionalId, Reservation, ReservationId, ReservationStatus,
};
use crate::utils::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Everything produced by one successful pass of the pipeline.
#[derive(Debug, Clone)]
pub struct Booked {
    pub reservation: Reservation,
    pub event: Event,
    pub professional: Professional,
}

/// Runs slot validation, conflict check, eligibility, assignment and the
/// commit for one draft. The only component that writes.
pub struct ReservationFactory<'a, C: Catalog + ?Sized, S: ReservationStore + ?Sized> {
    catalog: &'a C,
    store: &'a S,
    assigner: &'a Assigner,
    enforce_availability: bool,
}

impl<'a, C: Catalog + ?Sized, S: ReservationStore + ?Sized> ReservationFactory<'a, C, S> {
    pub fn new(catalog: &'a C, store: &'a S, assigner: &'a Assigner, enforce_availability: bool) -> Self {
        Self {
            catalog,
            store,
            assigner,
            enforce_availability,
        }
    }

    /// Finalizes `draft` and commits it against `expected_version`
    /// (0 for a new reservation). Nothing is written unless every check
    /// passes.
    pub async fn finalize(
        &self,
        mut draft: Reservation,
        expected_version: u64,
        professional_override: Option<&ProfessionalId>,
        now: DateTime<Utc>,
    ) -> Result<Booked> {
        let event = SlotValidator::validate(
            self.catalog,
            &draft.event,
            draft.timestamp,
            &draft.service_selection,
        )
        .await?;
        draft.transition(ReservationStatus::Validated)?;
        tracing::debug!(reservation = %draft.id, event = %event.id, "slot validated");

        let exclude = (expected_version > 0).then_some(draft.id);
        ConflictGuard::check(self.store, &draft.user, draft.timestamp, exclude).await?;

        let professional = match professional_override {
            Some(id) => self.resolve_override(id, &draft, exclude).await?,
            None => {
                let roster = self.catalog.list_professionals().await?;
                let mut eligible = EligibilityFilter::filter(&draft.service_selection, &roster);
                if self.enforce_availability {
                    let busy = self.busy_among(&eligible, draft.timestamp, exclude).await?;
                    eligible = EligibilityFilter::without_busy(eligible, &busy);
                }
                tracing::debug!(
                    reservation = %draft.id,
                    roster = roster.len(),
                    eligible = eligible.len(),
                    "eligibility computed"
                );
                self.assigner.assign(eligible)?
            }
        };

        draft.professional = Some(professional.id.clone());
        draft.transition(ReservationStatus::Assigned)?;
        draft.transition(ReservationStatus::Confirmed)?;
        draft.updated_at = now;

        let reservation = self
            .store
            .commit(draft, expected_version, CommitPolicy::new(self.enforce_availability))
            .await?;
        tracing::info!(
            reservation = %reservation.id,
            user = %reservation.user,
            professional = %professional.id,
            version = reservation.version,
            "reservation confirmed"
        );

        Ok(Booked {
            reservation,
            event,
            professional,
        })
    }

    async fn busy_among(
        &self,
        candidates: &[Professional],
        timestamp: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> Result<BTreeSet<ProfessionalId>> {
        let mut busy = BTreeSet::new();
        for candidate in candidates {
            let bookings = self
                .store
                .find_professional_bookings(&candidate.id, timestamp, exclude)
                .await?;
            if bookings.iter().any(Reservation::is_active) {
                busy.insert(candidate.id.clone());
            }
        }
        Ok(busy)
    }

    async fn resolve_override(
        &self,
        id: &ProfessionalId,
        draft: &Reservation,
        exclude: Option<ReservationId>,
    ) -> Result<Professional> {
        let professional = self
            .catalog
            .get_professional(id)
            .await?
            .ok_or_else(|| EngineError::ProfessionalNotFound {
                professional_id: id.clone(),
            })?;

        if let Some(missing) = EligibilityFilter::missing_skill(&professional, &draft.service_selection) {
            return Err(EngineError::ProfessionalNotQualified {
                professional_id: id.clone(),
                service_id: missing.clone(),
            });
        }

        if self.enforce_availability {
            let bookings = self
                .store
                .find_professional_bookings(id, draft.timestamp, exclude)
                .await?;
            if bookings.iter().any(Reservation::is_active) {
                return Err(EngineError::ProfessionalUnavailable {
                    professional_id: id.clone(),
                    timestamp: draft.timestamp,
                });
            }
        }

        tracing::debug!(reservation = %draft.id, professional = %id, "professional override accepted");
        Ok(professional)
    }
}
