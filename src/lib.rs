pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{InMemoryCatalog, InMemoryReservationStore, RecordingNotifier, TracingNotifier};
pub use config::{catalog::CatalogFile, toml_config::TomlConfig};
pub use core::{
    assigner::Assigner,
    engine::{BookingEngine, EngineSettings},
    notification::{NotificationDispatcher, NotificationSettings},
};
pub use domain::model::{
    Caller, CreateReservation, Event, EventId, Professional, ProfessionalId, Reservation,
    ReservationConfirmed, ReservationId, ReservationStatus, Service, ServiceId, UpdateReservation,
    UserId,
};
pub use utils::error::{EngineError, Result};
