use crate::adapters::{InMemoryCatalog, InMemoryReservationStore};
use crate::core::eligibility::EligibilityFilter;
use crate::core::slot_validator::SlotValidator;
use crate::domain::model::{
    Event, EventId, Professional, ProfessionalId, Reservation, ReservationStatus, Service,
    ServiceId, UserId,
};
use crate::utils::error::{EngineError, Result};
use crate::utils::validation::{self, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::Path;

/// Fixture data standing in for the admin-managed catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub professionals: Vec<Professional>,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub reservations: Vec<ReservationFixture>,
}

/// An already-confirmed booking loaded alongside the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationFixture {
    pub user: UserId,
    pub event: EventId,
    pub services: BTreeSet<ServiceId>,
    pub timestamp: DateTime<Utc>,
    pub professional: ProfessionalId,
}

impl CatalogFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = super::toml_config::substitute_env_vars(content)?;
        toml::from_str(&processed).map_err(|e| EngineError::ConfigValidationError {
            field: "catalog".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Populates the in-memory adapters. Runs [`Validate::validate`] first.
    pub async fn load_into(&self, catalog: &InMemoryCatalog, store: &InMemoryReservationStore) -> Result<()> {
        self.validate()?;

        for service in &self.services {
            catalog.insert_service(service.clone()).await;
        }
        for professional in &self.professionals {
            catalog.insert_professional(professional.clone()).await;
        }
        for event in &self.events {
            catalog.insert_event(event.clone()).await?;
        }

        for fixture in &self.reservations {
            let mut reservation = Reservation::draft(
                fixture.user.clone(),
                fixture.event.clone(),
                fixture.services.clone(),
                fixture.timestamp,
                fixture.timestamp,
            );
            reservation.professional = Some(fixture.professional.clone());
            reservation.status = ReservationStatus::Confirmed;
            reservation.version = 1;
            store.seed(reservation).await;
        }

        tracing::info!(
            services = self.services.len(),
            professionals = self.professionals.len(),
            events = self.events.len(),
            reservations = self.reservations.len(),
            "catalog loaded"
        );
        Ok(())
    }

    fn check_service_refs<'a>(
        field: &str,
        refs: impl IntoIterator<Item = &'a ServiceId>,
        known: &HashSet<&ServiceId>,
    ) -> Result<()> {
        for id in refs {
            if !known.contains(id) {
                return Err(EngineError::InvalidConfigValueError {
                    field: field.to_string(),
                    value: id.to_string(),
                    reason: "unknown service".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Validate for CatalogFile {
    fn validate(&self) -> Result<()> {
        let known_services: HashSet<&ServiceId> = self.services.iter().map(|s| &s.id).collect();

        for service in &self.services {
            validation::validate_non_empty_string("services.name", &service.name)?;
        }

        for professional in &self.professionals {
            validation::validate_non_empty_string("professionals.name", &professional.name)?;
            Self::check_service_refs("professionals.skillset", &professional.skillset, &known_services)?;
        }

        let mut events: HashMap<&EventId, &Event> = HashMap::new();
        for event in &self.events {
            event.check_window()?;
            Self::check_service_refs("events.service_catalog", &event.service_catalog, &known_services)?;
            events.insert(&event.id, event);
        }

        let professionals: HashMap<&ProfessionalId, &Professional> =
            self.professionals.iter().map(|p| (&p.id, p)).collect();
        let mut taken: HashSet<(&UserId, DateTime<Utc>)> = HashSet::new();
        let mut assigned: HashSet<(&ProfessionalId, DateTime<Utc>)> = HashSet::new();

        for fixture in &self.reservations {
            let event = events
                .get(&fixture.event)
                .ok_or_else(|| EngineError::EventNotFound {
                    event_id: fixture.event.clone(),
                })?;
            SlotValidator::check(event, fixture.timestamp, &fixture.services)?;

            let professional = professionals.get(&fixture.professional).ok_or_else(|| {
                EngineError::ProfessionalNotFound {
                    professional_id: fixture.professional.clone(),
                }
            })?;
            if let Some(missing) = EligibilityFilter::missing_skill(professional, &fixture.services) {
                return Err(EngineError::ProfessionalNotQualified {
                    professional_id: fixture.professional.clone(),
                    service_id: missing.clone(),
                });
            }

            if !taken.insert((&fixture.user, fixture.timestamp)) {
                return Err(EngineError::DuplicateBooking {
                    user: fixture.user.clone(),
                    timestamp: fixture.timestamp,
                });
            }
            if !assigned.insert((&fixture.professional, fixture.timestamp)) {
                return Err(EngineError::ProfessionalUnavailable {
                    professional_id: fixture.professional.clone(),
                    timestamp: fixture.timestamp,
                });
            }
        }

        Ok(())
    }
}
