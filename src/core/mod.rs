pub mod assigner;
pub mod conflict_guard;
pub mod eligibility;
pub mod engine;
pub mod factory;
pub mod notification;
pub mod slot_validator;

pub use crate::domain::model::{Event, Professional, Reservation, ReservationConfirmed, Service};
pub use crate::domain::ports::{Catalog, Clock, CommitPolicy, FixedClock, Notifier, ReservationStore, SystemClock};
pub use crate::utils::error::Result;
