#![allow(dead_code)]

use booking_engine::core::FixedClock;
use booking_engine::{
    BookingEngine, EngineSettings, Event, EventId, InMemoryCatalog, InMemoryReservationStore,
    Professional, ProfessionalId, Service, ServiceId,
};
use chrono::{DateTime, TimeZone, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;

pub type MemoryEngine = BookingEngine<InMemoryCatalog, InMemoryReservationStore>;

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 14, hour, minute, 0).unwrap()
}

pub fn services(ids: &[&str]) -> BTreeSet<ServiceId> {
    ids.iter().map(|s| ServiceId::from(*s)).collect()
}

pub fn professional(id: &str, name: &str, skills: &[&str]) -> Professional {
    Professional {
        id: ProfessionalId::from(id),
        name: name.to_string(),
        class_period: "3 months".to_string(),
        skillset: services(skills),
    }
}

/// Event "salon-day" open 10:00-14:00 offering haircut and manicure, with
/// P1 {haircut} and P2 {haircut, manicure}.
pub async fn salon_catalog() -> Arc<InMemoryCatalog> {
    let catalog = InMemoryCatalog::new();
    for (id, name) in [
        ("haircut", "Haircut"),
        ("manicure", "Manicure"),
        ("pedicure", "Pedicure"),
        ("facial", "Facial"),
    ] {
        catalog
            .insert_service(Service {
                id: ServiceId::from(id),
                name: name.to_string(),
                description: String::new(),
            })
            .await;
    }

    catalog
        .insert_professional(professional("p1", "Robin", &["haircut"]))
        .await;
    catalog
        .insert_professional(professional("p2", "Sam", &["haircut", "manicure"]))
        .await;

    let salon_day = Event::new(
        EventId::from("salon-day"),
        "Salon day",
        at(10, 0),
        at(14, 0),
        services(&["haircut", "manicure"]),
    )
    .unwrap()
    .with_details("Spring pampering", "Main hall");
    catalog.insert_event(salon_day).await.unwrap();

    let spa_day = Event::new(
        EventId::from("spa-day"),
        "Spa day",
        at(10, 0),
        at(14, 0),
        services(&["facial"]),
    )
    .unwrap();
    catalog.insert_event(spa_day).await.unwrap();

    Arc::new(catalog)
}

pub fn seeded_settings(seed: u64) -> EngineSettings {
    EngineSettings {
        rng_seed: Some(seed),
        ..EngineSettings::default()
    }
}

pub async fn salon_engine(seed: u64) -> MemoryEngine {
    salon_engine_with(seeded_settings(seed)).await
}

pub async fn salon_engine_with(settings: EngineSettings) -> MemoryEngine {
    let catalog = salon_catalog().await;
    let store = Arc::new(InMemoryReservationStore::new());
    BookingEngine::new(catalog, store, settings).with_clock(Arc::new(FixedClock(at(8, 0))))
}
