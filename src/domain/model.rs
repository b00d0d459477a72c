use crate::utils::error::{EngineError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

macro_rules! slug_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

slug_id!(
    /// Identity of a bookable service (e.g. `haircut`).
    ServiceId
);
slug_id!(
    /// Identity of a service professional.
    ProfessionalId
);
slug_id!(EventId);
slug_id!(
    /// Identity of the authenticated user owning a reservation.
    UserId
);

/// Unique identifier for a reservation
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReservationId(Uuid);

impl ReservationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReservationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub id: ProfessionalId,
    pub name: String,
    /// Tenure label such as "3 months".
    #[serde(default)]
    pub class_period: String,
    pub skillset: BTreeSet<ServiceId>,
}

impl Professional {
    /// True when this professional can perform every requested service.
    pub fn covers(&self, requested: &BTreeSet<ServiceId>) -> bool {
        requested.is_subset(&self.skillset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    pub service_catalog: BTreeSet<ServiceId>,
}

impl Event {
    /// Builds an event, rejecting windows where `start >= end`.
    pub fn new(
        id: EventId,
        name: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        service_catalog: BTreeSet<ServiceId>,
    ) -> Result<Self> {
        let event = Self {
            id,
            name: name.into(),
            description: String::new(),
            start,
            end,
            location: String::new(),
            service_catalog,
        };
        event.check_window()?;
        Ok(event)
    }

    pub fn with_details(mut self, description: impl Into<String>, location: impl Into<String>) -> Self {
        self.description = description.into();
        self.location = location.into();
        self
    }

    pub fn check_window(&self) -> Result<()> {
        if self.start >= self.end {
            return Err(EngineError::InvalidEventWindow {
                event_id: self.id.clone(),
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Inclusive on both ends.
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }

    pub fn offers(&self, service: &ServiceId) -> bool {
        self.service_catalog.contains(service)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Draft,
    Validated,
    Assigned,
    Confirmed,
    Cancelled,
}

impl ReservationStatus {
    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, next),
            (Draft, Validated)
                | (Validated, Assigned)
                | (Assigned, Confirmed)
                | (Validated, Cancelled)
                | (Confirmed, Cancelled)
        )
    }

    pub fn is_active(self) -> bool {
        self != ReservationStatus::Cancelled
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ReservationStatus::Draft => "draft",
            ReservationStatus::Validated => "validated",
            ReservationStatus::Assigned => "assigned",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub user: UserId,
    pub timestamp: DateTime<Utc>,
    pub event: EventId,
    pub service_selection: BTreeSet<ServiceId>,
    pub professional: Option<ProfessionalId>,
    pub status: ReservationStatus,
    /// 0 until the first successful commit; bumped by the store on every write.
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn draft(
        user: UserId,
        event: EventId,
        service_selection: BTreeSet<ServiceId>,
        timestamp: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ReservationId::new(),
            user,
            timestamp,
            event,
            service_selection,
            professional: None,
            status: ReservationStatus::Draft,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves to `next`, failing on any edge outside the lifecycle graph.
    pub fn transition(&mut self, next: ReservationStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                reservation_id: self.id,
                from: self.status,
                to: next,
            });
        }
        if next == ReservationStatus::Confirmed && self.professional.is_none() {
            return Err(EngineError::InvalidTransition {
                reservation_id: self.id,
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }
}

/// Trusted identity of whoever is invoking the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user: UserId,
    pub privileged: bool,
}

impl Caller {
    pub fn user(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            privileged: false,
        }
    }

    pub fn admin(user: impl Into<UserId>) -> Self {
        Self {
            user: user.into(),
            privileged: true,
        }
    }

    pub fn can_act_on(&self, reservation: &Reservation) -> bool {
        self.privileged || self.user == reservation.user
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone)]
pub struct CreateReservation {
    pub event_id: EventId,
    pub services: BTreeSet<ServiceId>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UpdateReservation {
    pub event_id: EventId,
    pub services: BTreeSet<ServiceId>,
    pub timestamp: DateTime<Utc>,
    /// Only honoured for privileged callers.
    pub professional_override: Option<ProfessionalId>,
}

/// Emitted after a reservation is committed as confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationConfirmed {
    pub reservation_id: ReservationId,
    pub version: u64,
    pub user: UserId,
    pub event_id: EventId,
    pub event_name: String,
    pub services: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub professional_id: Option<ProfessionalId>,
    /// Display name, or [`Self::UNASSIGNED`].
    pub professional: String,
}

impl ReservationConfirmed {
    pub const UNASSIGNED: &'static str = "unassigned";

    /// Stable per committed write; consumers dedupe on it.
    pub fn dedupe_key(&self) -> String {
        format!("{}:{}", self.reservation_id, self.version)
    }
}
