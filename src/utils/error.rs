use crate::domain::model::{
    EventId, ProfessionalId, ReservationId, ReservationStatus, ServiceId, UserId,
};
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: EventId },

    #[error("Invalid slot: {timestamp} is outside the event window {window_start} - {window_end}")]
    InvalidSlot {
        timestamp: DateTime<Utc>,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },

    #[error("Service not offered at event {event_id}: {service_id}")]
    ServiceNotOffered {
        event_id: EventId,
        service_id: ServiceId,
    },

    #[error("At least one service must be selected")]
    EmptySelection,

    #[error("User {user} already has a reservation at {timestamp}")]
    DuplicateBooking {
        user: UserId,
        timestamp: DateTime<Utc>,
    },

    #[error("No professional is qualified for the requested services")]
    NoEligibleProfessional,

    #[error("Concurrent write detected: {message}")]
    ConflictError { message: String },

    #[error("Event {event_id} has an invalid window: {start} is not before {end}")]
    InvalidEventWindow {
        event_id: EventId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Reservation not found: {reservation_id}")]
    ReservationNotFound { reservation_id: ReservationId },

    #[error("Professional not found: {professional_id}")]
    ProfessionalNotFound { professional_id: ProfessionalId },

    #[error("Professional {professional_id} cannot perform service {service_id}")]
    ProfessionalNotQualified {
        professional_id: ProfessionalId,
        service_id: ServiceId,
    },

    #[error("Professional {professional_id} is already booked at {timestamp}")]
    ProfessionalUnavailable {
        professional_id: ProfessionalId,
        timestamp: DateTime<Utc>,
    },

    #[error("Reservation {reservation_id} cannot move from {from} to {to}")]
    InvalidTransition {
        reservation_id: ReservationId,
        from: ReservationStatus,
        to: ReservationStatus,
    },

    #[error("Not permitted: {message}")]
    NotPermitted { message: String },

    #[error("Notification delivery failed: {message}")]
    NotificationError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid configuration value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The request itself is wrong and can be corrected by the caller.
    Validation,
    /// The request collides with existing bookings.
    Conflict,
    Authorization,
    Infrastructure,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EngineError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EngineError::EventNotFound { .. }
            | EngineError::InvalidSlot { .. }
            | EngineError::ServiceNotOffered { .. }
            | EngineError::EmptySelection
            | EngineError::InvalidEventWindow { .. }
            | EngineError::ReservationNotFound { .. }
            | EngineError::ProfessionalNotFound { .. }
            | EngineError::ProfessionalNotQualified { .. }
            | EngineError::InvalidTransition { .. } => ErrorCategory::Validation,
            EngineError::DuplicateBooking { .. }
            | EngineError::NoEligibleProfessional
            | EngineError::ProfessionalUnavailable { .. }
            | EngineError::ConflictError { .. } => ErrorCategory::Conflict,
            EngineError::NotPermitted { .. } => ErrorCategory::Authorization,
            EngineError::NotificationError { .. }
            | EngineError::IoError(_)
            | EngineError::SerializationError(_) => ErrorCategory::Infrastructure,
            EngineError::ConfigValidationError { .. }
            | EngineError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Validation | ErrorCategory::Authorization => ErrorSeverity::High,
            ErrorCategory::Conflict => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Infrastructure => match self {
                EngineError::NotificationError { .. } => ErrorSeverity::Low,
                _ => ErrorSeverity::Critical,
            },
        }
    }

    /// Only write conflicts are retried, and only by the engine itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::ConflictError { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EngineError::EventNotFound { event_id } => {
                format!("The event '{}' does not exist.", event_id)
            }
            EngineError::InvalidSlot {
                timestamp,
                window_start,
                window_end,
            } => format!(
                "{} is outside the event hours ({} to {}).",
                timestamp.format("%Y-%m-%d %H:%M"),
                window_start.format("%Y-%m-%d %H:%M"),
                window_end.format("%Y-%m-%d %H:%M")
            ),
            EngineError::ServiceNotOffered { service_id, .. } => {
                format!("The service '{}' is not offered at this event.", service_id)
            }
            EngineError::EmptySelection => "Please choose at least one service.".to_string(),
            EngineError::DuplicateBooking { timestamp, .. } => format!(
                "You already have an appointment at {}.",
                timestamp.format("%Y-%m-%d %H:%M")
            ),
            EngineError::NoEligibleProfessional => {
                "No professional can perform all of the selected services at that time.".to_string()
            }
            EngineError::ConflictError { .. } => {
                "Someone else booked at the same moment. Please try again.".to_string()
            }
            EngineError::NotPermitted { .. } => {
                "You are not allowed to perform this action.".to_string()
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EngineError::EventNotFound { .. } => "Pick an event from the current event list",
            EngineError::InvalidSlot { .. } => "Choose a time inside the event window",
            EngineError::ServiceNotOffered { .. } => {
                "Remove the service or choose an event that offers it"
            }
            EngineError::EmptySelection => "Select one or more services",
            EngineError::DuplicateBooking { .. } => {
                "Choose another time or update the existing reservation"
            }
            EngineError::NoEligibleProfessional | EngineError::ProfessionalUnavailable { .. } => {
                "Split the services into separate appointments or choose another time"
            }
            EngineError::ConflictError { .. } => "Retry the request",
            EngineError::ReservationNotFound { .. } => "Check the reservation identifier",
            EngineError::ProfessionalNotFound { .. }
            | EngineError::ProfessionalNotQualified { .. } => {
                "Choose a professional whose skillset covers the selection"
            }
            EngineError::InvalidTransition { .. } => "Create a new reservation instead",
            EngineError::NotPermitted { .. } => "Sign in with an account that owns the reservation",
            EngineError::InvalidEventWindow { .. } => "Fix the event so that it starts before it ends",
            EngineError::ConfigValidationError { .. }
            | EngineError::InvalidConfigValueError { .. } => "Check the configuration file",
            EngineError::NotificationError { .. }
            | EngineError::IoError(_)
            | EngineError::SerializationError(_) => "Check the logs and try again later",
        }
    }
}
