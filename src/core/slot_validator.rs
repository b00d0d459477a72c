use crate::core::Catalog;
use crate::domain::model::{Event, EventId, ServiceId};
use crate::utils::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// Checks a requested slot against the owning event. Read-only.
pub struct SlotValidator;

impl SlotValidator {
    /// Loads the event and runs [`SlotValidator::check`] against it.
    pub async fn validate<C: Catalog + ?Sized>(
        catalog: &C,
        event_id: &EventId,
        timestamp: DateTime<Utc>,
        services: &BTreeSet<ServiceId>,
    ) -> Result<Event> {
        let event = catalog
            .get_event(event_id)
            .await?
            .ok_or_else(|| EngineError::EventNotFound {
                event_id: event_id.clone(),
            })?;

        Self::check(&event, timestamp, services)?;
        Ok(event)
    }

    pub fn check(event: &Event, timestamp: DateTime<Utc>, services: &BTreeSet<ServiceId>) -> Result<()> {
        if !event.contains(timestamp) {
            return Err(EngineError::InvalidSlot {
                timestamp,
                window_start: event.start,
                window_end: event.end,
            });
        }

        if services.is_empty() {
            return Err(EngineError::EmptySelection);
        }

        // BTreeSet iteration is ordered, so the smallest offending id is reported.
        if let Some(missing) = services.iter().find(|s| !event.offers(s)) {
            return Err(EngineError::ServiceNotOffered {
                event_id: event.id.clone(),
                service_id: missing.clone(),
            });
        }

        Ok(())
    }
}
