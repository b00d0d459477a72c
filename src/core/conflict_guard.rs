use crate::core::ReservationStore;
use crate::domain::model::{ReservationId, UserId};
use crate::utils::error::{EngineError, Result};
use chrono::{DateTime, Utc};

/// Rejects a second active reservation for the same user at the identical
/// timestamp. Overlapping but different timestamps do not collide.
pub struct ConflictGuard;

impl ConflictGuard {
    pub async fn check<S: ReservationStore + ?Sized>(
        store: &S,
        user: &UserId,
        timestamp: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> Result<()> {
        let clashes = store.find_reservations(user, timestamp, exclude).await?;

        // The store already filters, but cancelled rows must never block a booking.
        let clash = clashes
            .iter()
            .find(|r| r.is_active() && Some(r.id) != exclude && r.timestamp == timestamp);

        if let Some(existing) = clash {
            tracing::debug!(
                user = %user,
                existing = %existing.id,
                "duplicate booking rejected"
            );
            return Err(EngineError::DuplicateBooking {
                user: user.clone(),
                timestamp,
            });
        }

        Ok(())
    }
}
