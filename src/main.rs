use booking_engine::utils::error::{EngineError, ErrorSeverity};
use booking_engine::utils::{logger, validation::Validate};
use booking_engine::{
    BookingEngine, Caller, CatalogFile, CliConfig, CreateReservation, InMemoryCatalog,
    InMemoryReservationStore, NotificationDispatcher, TomlConfig, TracingNotifier,
};
use clap::Parser;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    let settings = match &cli.config {
        Some(path) => TomlConfig::from_file(path),
        None => Ok(TomlConfig::default()),
    };
    let settings = match settings {
        Ok(settings) => settings,
        Err(e) => fail(&e),
    };

    if cli.json_logs || settings.logging.json {
        logger::init_json_logger(settings.logging.level.as_deref());
    } else {
        logger::init_cli_logger(cli.verbose, settings.logging.level.as_deref());
    }

    tracing::info!("Starting booking-engine CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    if let Err(e) = settings.validate().and_then(|_| cli.validate()) {
        tracing::error!("Configuration validation failed: {}", e);
        fail(&e);
    }

    let mut engine_settings = settings.engine_settings();
    if cli.seed.is_some() {
        engine_settings.rng_seed = cli.seed;
    }

    let catalog = Arc::new(InMemoryCatalog::new());
    let store = Arc::new(InMemoryReservationStore::new());
    if let Err(e) = load_catalog(&cli.catalog, &catalog, &store).await {
        tracing::error!("Failed to load catalog {}: {}", cli.catalog, e);
        fail(&e);
    }

    let dispatcher = NotificationDispatcher::spawn(Arc::new(TracingNotifier), settings.notification_settings());
    let engine = BookingEngine::new(catalog, store, engine_settings).with_dispatcher(dispatcher);

    let caller = Caller::user(cli.user.trim());
    let request = match cli.timestamp() {
        Ok(timestamp) => CreateReservation {
            event_id: cli.event_id(),
            services: cli.service_ids(),
            timestamp,
        },
        Err(e) => fail(&e),
    };

    let outcome = engine.create_reservation(&caller, request).await;
    engine.shutdown().await;

    match outcome {
        Ok(reservation) => {
            tracing::info!("Reservation {} confirmed", reservation.id);
            println!("{}", serde_json::to_string_pretty(&reservation)?);
            Ok(())
        }
        Err(e) => {
            tracing::error!(
                "Reservation rejected: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            fail(&e)
        }
    }
}

async fn load_catalog(
    path: &str,
    catalog: &InMemoryCatalog,
    store: &InMemoryReservationStore,
) -> booking_engine::Result<()> {
    let file = CatalogFile::from_file(path)?;
    file.load_into(catalog, store).await
}

fn fail(e: &EngineError) -> ! {
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}
