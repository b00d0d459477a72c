use anyhow::Context;
use booking_engine::utils::logger;
use booking_engine::{
    BookingEngine, Caller, CreateReservation, EngineError, EngineSettings, Event, EventId,
    InMemoryCatalog, InMemoryReservationStore, NotificationDispatcher, NotificationSettings,
    Professional, ProfessionalId, Service, ServiceId, TracingNotifier,
};
use chrono::{Duration, DurationRound, Utc};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const BASE_SERVICES: [&str; 5] = ["Haircut", "Manicure", "Pedicure", "Facial", "Massage"];
const FIRST_NAMES: [&str; 8] = ["Robin", "Sam", "Alex", "Jordan", "Casey", "Riley", "Morgan", "Quinn"];
const LOCATIONS: [&str; 4] = ["Main hall", "Studio B", "Riverside annex", "Downtown salon"];

#[derive(Debug, Parser)]
#[command(name = "seed_demo")]
#[command(about = "Populate an in-memory catalog and book demo reservations")]
struct Args {
    #[arg(long, help = "Seed for both data generation and assignment")]
    seed: Option<u64>,

    #[arg(long, default_value = "15")]
    target: usize,

    #[arg(long, default_value = "100")]
    max_attempts: usize,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose, None);

    let seed = args.seed.unwrap_or_else(rand::random);
    let mut rng = StdRng::seed_from_u64(seed);
    tracing::info!(seed, "Seeding demo catalog");

    let catalog = Arc::new(InMemoryCatalog::new());
    let services = seed_services(&catalog).await;
    seed_professionals(&catalog, &services, &mut rng).await;
    let events = seed_events(&catalog, &services, &mut rng)
        .await
        .context("failed to create demo events")?;

    let users: Vec<String> = (1..=5).map(|i| format!("demo-user-{i}")).collect();

    let settings = EngineSettings {
        rng_seed: Some(seed),
        ..EngineSettings::default()
    };
    let store = Arc::new(InMemoryReservationStore::new());
    let dispatcher = NotificationDispatcher::spawn(Arc::new(TracingNotifier), NotificationSettings::default());
    let engine = BookingEngine::new(catalog.clone(), store, settings).with_dispatcher(dispatcher);

    let mut created = 0;
    let mut attempts = 0;
    let mut rejections: BTreeMap<&'static str, usize> = BTreeMap::new();

    while created < args.target && attempts < args.max_attempts {
        attempts += 1;

        let Some(user) = users.choose(&mut rng) else { break };
        let Some(event) = events.choose(&mut rng) else { break };

        let offered: Vec<&ServiceId> = event.service_catalog.iter().collect();
        let count = rng.gen_range(1..=offered.len().min(2));
        let requested: BTreeSet<ServiceId> = offered
            .choose_multiple(&mut rng, count)
            .map(|s| (*s).clone())
            .collect();

        let slots = (event.end - event.start).num_minutes() / 30;
        let timestamp = event.start + Duration::minutes(30 * rng.gen_range(0..=slots));

        let request = CreateReservation {
            event_id: event.id.clone(),
            services: requested,
            timestamp,
        };

        match engine.create_reservation(&Caller::user(user.as_str()), request).await {
            Ok(reservation) => {
                created += 1;
                println!(
                    "✅ {} booked {} at {} with {}",
                    reservation.user,
                    reservation.event,
                    reservation.timestamp.format("%Y-%m-%d %H:%M"),
                    reservation
                        .professional
                        .as_ref()
                        .map(|p| p.to_string())
                        .unwrap_or_default()
                );
            }
            Err(e) => *rejections.entry(rejection_kind(&e)).or_default() += 1,
        }
    }

    let admin = Caller::admin("demo-admin");
    let total = engine.list_all_reservations(&admin).await?.len();
    engine.shutdown().await;

    println!("Created {created} reservations in {attempts} attempts ({total} stored)");
    for (kind, count) in rejections {
        println!("  {kind}: {count}");
    }
    Ok(())
}

async fn seed_services(catalog: &InMemoryCatalog) -> Vec<ServiceId> {
    let mut ids = Vec::new();
    for name in BASE_SERVICES {
        let id = ServiceId::new(name.to_lowercase());
        catalog
            .insert_service(Service {
                id: id.clone(),
                name: name.to_string(),
                description: format!("{name} by a certified professional"),
            })
            .await;
        ids.push(id);
    }
    ids
}

async fn seed_professionals(catalog: &InMemoryCatalog, services: &[ServiceId], rng: &mut StdRng) {
    for i in 0..4 {
        let skill_count = rng.gen_range(1..=3);
        let skillset: BTreeSet<ServiceId> = services.choose_multiple(rng, skill_count).cloned().collect();
        let name = FIRST_NAMES.choose(rng).copied().unwrap_or("Pat");
        catalog
            .insert_professional(Professional {
                id: ProfessionalId::new(format!("pro-{}", i + 1)),
                name: name.to_string(),
                class_period: format!("{} months", rng.gen_range(1..=4)),
                skillset,
            })
            .await;
    }
}

async fn seed_events(
    catalog: &InMemoryCatalog,
    services: &[ServiceId],
    rng: &mut StdRng,
) -> booking_engine::Result<Vec<Event>> {
    let today = Utc::now()
        .duration_trunc(Duration::days(1))
        .unwrap_or_else(|_| Utc::now());

    let mut events = Vec::new();
    for i in 0..5 {
        let start = today + Duration::days(rng.gen_range(-30..=30)) + Duration::hours(rng.gen_range(8..=11));
        let end = start + Duration::hours(*[2, 3, 4].choose(rng).unwrap_or(&2));
        let catalog_size = rng.gen_range(2..=4);
        let offered: BTreeSet<ServiceId> = services.choose_multiple(rng, catalog_size).cloned().collect();

        let event = Event::new(EventId::new(format!("event-{}", i + 1)), format!("Beauty day #{}", i + 1), start, end, offered)?
            .with_details(
                "Walk-in friendly service day",
                LOCATIONS.choose(rng).copied().unwrap_or("Main hall"),
            );
        catalog.insert_event(event.clone()).await?;
        events.push(event);
    }
    Ok(events)
}

fn rejection_kind(e: &EngineError) -> &'static str {
    match e {
        EngineError::DuplicateBooking { .. } => "duplicate booking",
        EngineError::NoEligibleProfessional => "no eligible professional",
        EngineError::InvalidSlot { .. } => "invalid slot",
        EngineError::ServiceNotOffered { .. } => "service not offered",
        EngineError::ConflictError { .. } => "write conflict",
        _ => "other",
    }
}
