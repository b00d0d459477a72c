use crate::core::Notifier;
use crate::domain::model::ReservationConfirmed;
use crate::utils::error::{EngineError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Writes each confirmation to the log. Default collaborator for the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, event: &ReservationConfirmed) -> Result<()> {
        tracing::info!(
            key = %event.dedupe_key(),
            user = %event.user,
            event = %event.event_name,
            professional = %event.professional,
            professional_id = ?event.professional_id,
            at = %event.timestamp,
            services = ?event.services,
            "reservation confirmed notification"
        );
        Ok(())
    }
}

/// Keeps every delivered event in memory, optionally failing the first
/// `fail_first` calls.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<ReservationConfirmed>>,
    calls: AtomicUsize,
    fail_first: usize,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_first(fail_first: usize) -> Self {
        Self {
            fail_first,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<ReservationConfirmed> {
        self.delivered
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, event: &ReservationConfirmed) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.fail_first {
            return Err(EngineError::NotificationError {
                message: format!("simulated failure #{}", call + 1),
            });
        }

        let mut delivered = self
            .delivered
            .lock()
            .map_err(|_| EngineError::NotificationError {
                message: "recording notifier poisoned".to_string(),
            })?;
        delivered.push(event.clone());
        Ok(())
    }
}
