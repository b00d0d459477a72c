use crate::core::assigner::Assigner;
use crate::core::factory::{Booked, ReservationFactory};
use crate::core::notification::NotificationDispatcher;
use crate::core::{Catalog, Clock, CommitPolicy, ReservationStore, SystemClock};
use crate::domain::model::{
    Caller, CreateReservation, Reservation, ReservationConfirmed, ReservationId, ReservationStatus,
    UpdateReservation,
};
use crate::utils::error::{EngineError, Result};
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Upper bound on full pipeline re-runs after a commit conflict.
    pub max_commit_attempts: u32,
    pub enforce_professional_availability: bool,
    pub rng_seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_commit_attempts: 3,
            enforce_professional_availability: true,
            rng_seed: None,
        }
    }
}

/// Entry point for booking operations.
pub struct BookingEngine<C: Catalog, S: ReservationStore> {
    catalog: Arc<C>,
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    assigner: Assigner,
    dispatcher: NotificationDispatcher,
    settings: EngineSettings,
}

impl<C: Catalog, S: ReservationStore> BookingEngine<C, S> {
    pub fn new(catalog: Arc<C>, store: Arc<S>, settings: EngineSettings) -> Self {
        Self {
            catalog,
            store,
            clock: Arc::new(SystemClock),
            assigner: Assigner::from_seed_option(settings.rng_seed),
            dispatcher: NotificationDispatcher::disabled(),
            settings,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_assigner(mut self, assigner: Assigner) -> Self {
        self.assigner = assigner;
        self
    }

    pub fn with_dispatcher(mut self, dispatcher: NotificationDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<C> {
        &self.catalog
    }

    pub async fn create_reservation(&self, caller: &Caller, request: CreateReservation) -> Result<Reservation> {
        let request = &request;
        let booked = self
            .with_retries("create", move || async move {
                let draft = Reservation::draft(
                    caller.user.clone(),
                    request.event_id.clone(),
                    request.services.clone(),
                    request.timestamp,
                    self.clock.now(),
                );
                self.factory().finalize(draft, 0, None, self.clock.now()).await
            })
            .await?;

        self.announce(&booked).await;
        Ok(booked.reservation)
    }

    /// Re-validates an existing reservation with new parameters. The
    /// reservation is excluded from its own conflict check.
    pub async fn update_reservation(
        &self,
        caller: &Caller,
        reservation_id: ReservationId,
        request: UpdateReservation,
    ) -> Result<Reservation> {
        if request.professional_override.is_some() && !caller.privileged {
            return Err(EngineError::NotPermitted {
                message: "only privileged callers may choose a professional".to_string(),
            });
        }

        let request = &request;
        let booked = self
            .with_retries("update", move || async move {
                let existing = self.load_for(caller, reservation_id).await?;
                if !existing.is_active() {
                    return Err(EngineError::InvalidTransition {
                        reservation_id,
                        from: existing.status,
                        to: ReservationStatus::Validated,
                    });
                }

                let draft = Reservation {
                    event: request.event_id.clone(),
                    service_selection: request.services.clone(),
                    timestamp: request.timestamp,
                    professional: None,
                    status: ReservationStatus::Draft,
                    ..existing.clone()
                };
                self.factory()
                    .finalize(
                        draft,
                        existing.version,
                        request.professional_override.as_ref(),
                        self.clock.now(),
                    )
                    .await
            })
            .await?;

        self.announce(&booked).await;
        Ok(booked.reservation)
    }

    /// Cancelled reservations are kept for history and stop blocking the slot.
    pub async fn cancel_reservation(&self, caller: &Caller, reservation_id: ReservationId) -> Result<Reservation> {
        let cancelled = self
            .with_retries("cancel", move || async move {
                let mut reservation = self.load_for(caller, reservation_id).await?;
                let expected_version = reservation.version;
                reservation.transition(ReservationStatus::Cancelled)?;
                reservation.updated_at = self.clock.now();
                self.store
                    .commit(reservation, expected_version, self.commit_policy())
                    .await
            })
            .await?;

        tracing::info!(reservation = %cancelled.id, user = %cancelled.user, "reservation cancelled");
        Ok(cancelled)
    }

    pub async fn get_reservation(&self, caller: &Caller, reservation_id: ReservationId) -> Result<Reservation> {
        self.load_for(caller, reservation_id).await
    }

    /// The caller's own reservations, earliest first, cancelled ones included.
    pub async fn list_user_reservations(&self, caller: &Caller) -> Result<Vec<Reservation>> {
        let mut reservations = self.store.list_for_user(&caller.user).await?;
        reservations.sort_by_key(|r| (r.timestamp, r.id));
        Ok(reservations)
    }

    pub async fn list_all_reservations(&self, caller: &Caller) -> Result<Vec<Reservation>> {
        if !caller.privileged {
            return Err(EngineError::NotPermitted {
                message: "listing every reservation requires a privileged caller".to_string(),
            });
        }
        let mut reservations = self.store.list_all().await?;
        reservations.sort_by_key(|r| (r.timestamp, r.id));
        Ok(reservations)
    }

    /// Flushes pending notifications.
    pub async fn shutdown(self) {
        self.dispatcher.shutdown().await;
    }

    fn commit_policy(&self) -> CommitPolicy {
        CommitPolicy::new(self.settings.enforce_professional_availability)
    }

    fn factory(&self) -> ReservationFactory<'_, C, S> {
        ReservationFactory::new(
            self.catalog.as_ref(),
            self.store.as_ref(),
            &self.assigner,
            self.settings.enforce_professional_availability,
        )
    }

    async fn load_for(&self, caller: &Caller, reservation_id: ReservationId) -> Result<Reservation> {
        let reservation = self
            .store
            .get(reservation_id)
            .await?
            .ok_or(EngineError::ReservationNotFound { reservation_id })?;

        if !caller.can_act_on(&reservation) {
            return Err(EngineError::NotPermitted {
                message: format!("{} does not own reservation {}", caller.user, reservation_id),
            });
        }
        Ok(reservation)
    }

    async fn with_retries<T, F, Fut>(&self, operation: &str, mut attempt_once: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.settings.max_commit_attempts.max(1);
        let mut attempt = 1;
        loop {
            match attempt_once().await {
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    tracing::warn!(operation, attempt, "commit conflict, re-running pipeline: {}", e);
                    attempt += 1;
                }
                Err(e) => {
                    tracing::debug!(operation, attempt, "booking rejected: {}", e);
                    return Err(e);
                }
                Ok(value) => return Ok(value),
            }
        }
    }

    async fn announce(&self, booked: &Booked) {
        let mut services = Vec::with_capacity(booked.reservation.service_selection.len());
        for id in &booked.reservation.service_selection {
            let name = match self.catalog.get_service(id).await {
                Ok(Some(service)) => service.name,
                Ok(None) => id.to_string(),
                Err(e) => {
                    tracing::warn!(service = %id, "service lookup failed for notification: {}", e);
                    id.to_string()
                }
            };
            services.push(name);
        }

        let professional_id = booked.reservation.professional.clone();
        let professional = if professional_id.is_some() {
            booked.professional.name.clone()
        } else {
            ReservationConfirmed::UNASSIGNED.to_string()
        };

        self.dispatcher.dispatch(ReservationConfirmed {
            reservation_id: booked.reservation.id,
            version: booked.reservation.version,
            user: booked.reservation.user.clone(),
            event_id: booked.event.id.clone(),
            event_name: booked.event.name.clone(),
            services,
            timestamp: booked.reservation.timestamp,
            professional_id,
            professional,
        });
    }
}
