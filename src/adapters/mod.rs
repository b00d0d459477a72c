// Adapters layer: concrete implementations of the domain ports.

pub mod memory;
pub mod notify;

pub use memory::{InMemoryCatalog, InMemoryReservationStore};
pub use notify::{RecordingNotifier, TracingNotifier};
