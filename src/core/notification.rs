use crate::core::Notifier;
use crate::domain::model::ReservationConfirmed;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub max_delivery_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_delivery_attempts: 3,
            retry_delay: Duration::from_millis(200),
        }
    }
}

/// Post-commit, fire-and-forget delivery of confirmation events.
///
/// Events are queued on an unbounded channel and drained by a background
/// task that retries each delivery a bounded number of times. Consumers must
/// be idempotent on [`ReservationConfirmed::dedupe_key`]. Nothing here can
/// fail a booking.
pub struct NotificationDispatcher {
    sender: Option<mpsc::UnboundedSender<ReservationConfirmed>>,
    worker: Option<JoinHandle<()>>,
}

impl NotificationDispatcher {
    pub fn disabled() -> Self {
        Self {
            sender: None,
            worker: None,
        }
    }

    /// Must be called from within a tokio runtime.
    pub fn spawn(notifier: Arc<dyn Notifier>, settings: NotificationSettings) -> Self {
        if !settings.enabled {
            tracing::info!("Notifications disabled");
            return Self::disabled();
        }

        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(receiver, notifier, settings));

        Self {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    pub fn dispatch(&self, event: ReservationConfirmed) {
        let Some(sender) = &self.sender else {
            tracing::debug!(key = %event.dedupe_key(), "notification skipped, dispatcher disabled");
            return;
        };

        if let Err(e) = sender.send(event) {
            tracing::warn!(key = %e.0.dedupe_key(), "notification worker stopped, event dropped");
        }
    }

    /// Closes the queue and waits for queued events to be delivered.
    pub async fn shutdown(mut self) {
        drop(self.sender.take());
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                tracing::warn!("notification worker ended abnormally: {}", e);
            }
        }
    }
}

async fn run_worker(
    mut receiver: mpsc::UnboundedReceiver<ReservationConfirmed>,
    notifier: Arc<dyn Notifier>,
    settings: NotificationSettings,
) {
    let mut delivered = 0usize;
    let mut abandoned = 0usize;
    while let Some(event) = receiver.recv().await {
        if deliver(notifier.as_ref(), &event, &settings).await {
            delivered += 1;
        } else {
            abandoned += 1;
        }
    }
    tracing::info!(delivered, abandoned, "notification worker drained");
}

async fn deliver(notifier: &dyn Notifier, event: &ReservationConfirmed, settings: &NotificationSettings) -> bool {
    let attempts = settings.max_delivery_attempts.max(1);

    for attempt in 1..=attempts {
        match notifier.notify(event).await {
            Ok(()) => {
                tracing::debug!(key = %event.dedupe_key(), attempt, "notification delivered");
                return true;
            }
            Err(e) if attempt < attempts => {
                tracing::warn!(key = %event.dedupe_key(), attempt, "notification failed, retrying: {}", e);
                tokio::time::sleep(settings.retry_delay * attempt).await;
            }
            Err(e) => {
                tracing::error!(
                    key = %event.dedupe_key(),
                    attempts,
                    "notification abandoned: {}",
                    e
                );
            }
        }
    }

    false
}
