use crate::core::{Catalog, CommitPolicy, ReservationStore};
use crate::domain::model::{
    Event, EventId, Professional, ProfessionalId, Reservation, ReservationId, Service, ServiceId,
    UserId,
};
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Catalog snapshot held in memory. Writes stand in for the admin CRUD
/// surface and are never made by the engine.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    services: RwLock<HashMap<ServiceId, Service>>,
    professionals: RwLock<HashMap<ProfessionalId, Professional>>,
    events: RwLock<HashMap<EventId, Event>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_service(&self, service: Service) {
        self.services.write().await.insert(service.id.clone(), service);
    }

    pub async fn insert_professional(&self, professional: Professional) {
        self.professionals
            .write()
            .await
            .insert(professional.id.clone(), professional);
    }

    pub async fn insert_event(&self, event: Event) -> Result<()> {
        event.check_window()?;
        self.events.write().await.insert(event.id.clone(), event);
        Ok(())
    }

    pub async fn list_events(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.events.read().await.values().cloned().collect();
        events.sort_by_key(|e| e.start);
        events
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>> {
        Ok(self.events.read().await.get(id).cloned())
    }

    async fn list_professionals(&self) -> Result<Vec<Professional>> {
        Ok(self.professionals.read().await.values().cloned().collect())
    }

    async fn get_professional(&self, id: &ProfessionalId) -> Result<Option<Professional>> {
        Ok(self.professionals.read().await.get(id).cloned())
    }

    async fn get_service(&self, id: &ServiceId) -> Result<Option<Service>> {
        Ok(self.services.read().await.get(id).cloned())
    }
}

/// Reservation store with version-checked, uniqueness-checked commits.
///
/// `commit` holds the write lock for the whole check-and-write, so
/// `(user, timestamp)` and, when the commit policy asks for it,
/// `(professional, timestamp)` stay unique among active reservations however
/// requests interleave.
#[derive(Debug, Default)]
pub struct InMemoryReservationStore {
    reservations: RwLock<HashMap<ReservationId, Reservation>>,
}

impl InMemoryReservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a record as-is, bypassing the engine. Used for fixtures.
    pub async fn seed(&self, reservation: Reservation) {
        self.reservations
            .write()
            .await
            .insert(reservation.id, reservation);
    }

    pub async fn len(&self) -> usize {
        self.reservations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reservations.read().await.is_empty()
    }

    fn collision<'a>(
        existing: &'a HashMap<ReservationId, Reservation>,
        candidate: &Reservation,
        policy: CommitPolicy,
    ) -> Option<&'a Reservation> {
        existing.values().find(|other| {
            if other.id == candidate.id || !other.is_active() || other.timestamp != candidate.timestamp {
                return false;
            }
            let same_user = other.user == candidate.user;
            let same_professional = policy.exclusive_professionals
                && candidate.professional.is_some()
                && other.professional == candidate.professional;
            same_user || same_professional
        })
    }
}

#[async_trait]
impl ReservationStore for InMemoryReservationStore {
    async fn find_reservations(
        &self,
        user: &UserId,
        timestamp: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<Reservation>> {
        let reservations = self.reservations.read().await;
        Ok(reservations
            .values()
            .filter(|r| r.is_active() && &r.user == user && r.timestamp == timestamp && Some(r.id) != exclude)
            .cloned()
            .collect())
    }

    async fn find_professional_bookings(
        &self,
        professional: &ProfessionalId,
        timestamp: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<Reservation>> {
        let reservations = self.reservations.read().await;
        Ok(reservations
            .values()
            .filter(|r| {
                r.is_active()
                    && r.professional.as_ref() == Some(professional)
                    && r.timestamp == timestamp
                    && Some(r.id) != exclude
            })
            .cloned()
            .collect())
    }

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>> {
        Ok(self.reservations.read().await.get(&id).cloned())
    }

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Reservation>> {
        let reservations = self.reservations.read().await;
        Ok(reservations.values().filter(|r| &r.user == user).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Reservation>> {
        Ok(self.reservations.read().await.values().cloned().collect())
    }

    async fn commit(
        &self,
        mut reservation: Reservation,
        expected_version: u64,
        policy: CommitPolicy,
    ) -> Result<Reservation> {
        let mut reservations = self.reservations.write().await;

        let current_version = reservations.get(&reservation.id).map(|r| r.version).unwrap_or(0);
        if current_version != expected_version {
            return Err(EngineError::ConflictError {
                message: format!(
                    "reservation {} is at version {}, expected {}",
                    reservation.id, current_version, expected_version
                ),
            });
        }

        if reservation.is_active() {
            if let Some(other) = Self::collision(&reservations, &reservation, policy) {
                return Err(EngineError::ConflictError {
                    message: format!(
                        "slot {} already taken by reservation {}",
                        reservation.timestamp, other.id
                    ),
                });
            }
        }

        reservation.version = expected_version + 1;
        reservations.insert(reservation.id, reservation.clone());
        Ok(reservation)
    }
}
