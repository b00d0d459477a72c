use crate::domain::model::{
    Event, EventId, Professional, ProfessionalId, Reservation, ReservationConfirmed, ReservationId,
    Service, ServiceId, UserId,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Read model over events, services and the professional roster.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_event(&self, id: &EventId) -> Result<Option<Event>>;
    async fn list_professionals(&self) -> Result<Vec<Professional>>;
    async fn get_professional(&self, id: &ProfessionalId) -> Result<Option<Professional>>;
    async fn get_service(&self, id: &ServiceId) -> Result<Option<Service>>;
}

/// The only mutable collaborator. `commit` must be atomic.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Active reservations for `user` at exactly `timestamp`.
    async fn find_reservations(
        &self,
        user: &UserId,
        timestamp: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<Reservation>>;

    /// Active reservations held by `professional` at exactly `timestamp`.
    async fn find_professional_bookings(
        &self,
        professional: &ProfessionalId,
        timestamp: DateTime<Utc>,
        exclude: Option<ReservationId>,
    ) -> Result<Vec<Reservation>>;

    async fn get(&self, id: ReservationId) -> Result<Option<Reservation>>;

    async fn list_for_user(&self, user: &UserId) -> Result<Vec<Reservation>>;

    async fn list_all(&self) -> Result<Vec<Reservation>>;

    /// Writes `reservation` if the stored version still equals
    /// `expected_version` (0 for a create) and no uniqueness key named by
    /// `policy` is taken. Returns the stored copy with its bumped version,
    /// or `EngineError::ConflictError`.
    async fn commit(
        &self,
        reservation: Reservation,
        expected_version: u64,
        policy: CommitPolicy,
    ) -> Result<Reservation>;
}

/// Uniqueness keys a commit enforces among active reservations. `(user,
/// timestamp)` is always unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitPolicy {
    /// Also keep `(professional, timestamp)` unique.
    pub exclusive_professionals: bool,
}

impl CommitPolicy {
    pub fn new(exclusive_professionals: bool) -> Self {
        Self { exclusive_professionals }
    }
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &ReservationConfirmed) -> Result<()>;
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
