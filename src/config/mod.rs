pub mod catalog;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::model::{EventId, ServiceId};
#[cfg(feature = "cli")]
use crate::utils::error::{EngineError, Result};
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use chrono::{DateTime, Utc};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::collections::BTreeSet;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "booking-engine")]
#[command(about = "Book an appointment against an event catalog")]
pub struct CliConfig {
    #[arg(long, help = "Catalog fixture (services, professionals, events, reservations)")]
    pub catalog: String,

    #[arg(long, help = "Engine settings file")]
    pub config: Option<String>,

    #[arg(long, help = "User making the reservation")]
    pub user: String,

    #[arg(long)]
    pub event: String,

    #[arg(long, value_delimiter = ',', required = true)]
    pub services: Vec<String>,

    #[arg(long, help = "Requested time, RFC 3339 (e.g. 2025-03-14T11:00:00Z)")]
    pub at: String,

    #[arg(long, help = "Seed for the professional draw")]
    pub seed: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit JSON logs")]
    pub json_logs: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn event_id(&self) -> EventId {
        EventId::new(self.event.trim())
    }

    pub fn service_ids(&self) -> BTreeSet<ServiceId> {
        self.services
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(ServiceId::from)
            .collect()
    }

    pub fn timestamp(&self) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.at)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| EngineError::InvalidConfigValueError {
                field: "at".to_string(),
                value: self.at.clone(),
                reason: format!("expected an RFC 3339 timestamp: {}", e),
            })
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("catalog", &self.catalog)?;
        if let Some(config) = &self.config {
            validation::validate_path("config", config)?;
        }
        validation::validate_non_empty_string("user", &self.user)?;
        validation::validate_non_empty_string("event", &self.event)?;
        validation::validate_file_extensions("catalog", std::slice::from_ref(&self.catalog), &["toml"])?;
        self.timestamp()?;
        Ok(())
    }
}
