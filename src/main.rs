use nav_routing::adapters::outbound::loggers::init_combined_logger;
use nav_routing::adapters::outbound::navigation_data::FilesystemDataSource;
use nav_routing::application::NavigationService;
use nav_routing::common::DomainEvent;
use nav_routing::domains::navigation::NavigationEvent;
use nav_routing::Config;
use std::error::Error;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Offline bake command.
///
/// Reads the configuration (default `config.toml`, overridable through
/// `NAV__SECTION__KEY` variables), bakes the configured scene and writes the
/// routing asset. Ctrl-C cancels a running bake without publishing anything.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.toml".to_string());
    let config = Config::load(&config_path)?;

    // fast_log has to claim the `log` facade before the subscriber does.
    let logger = init_combined_logger(config.logging.file.as_deref(), config.logging.level_filter());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_str()));
    if tracing_subscriber::fmt().with_env_filter(filter).try_init().is_err() {
        warn!("log facade already claimed, `log` records bypass the subscriber");
    }

    println!("🧭 Starting navigation bake for scene {}", config.scene.name);
    info!("Configuration loaded from {}", config_path);

    let data = Arc::new(FilesystemDataSource::new(config.storage.data_dir.clone()));
    info!("Using navigation data directory {}", data.base().display());

    let (event_sender, mut event_receiver) = mpsc::channel::<NavigationEvent>(16);
    tokio::spawn(async move {
        while let Some(event) = event_receiver.recv().await {
            info!("event {} for scene {}", event.event_type(), event.aggregate_id());
        }
    });

    let service = Arc::new(
        NavigationService::new(config, data.clone(), data, logger).with_events(event_sender),
    );

    let worker = service.clone();
    let mut bake = tokio::task::spawn_blocking(move || worker.bake_configured());
    let outcome = tokio::select! {
        joined = &mut bake => joined,
        _ = tokio::signal::ctrl_c() => {
            println!("⏹️  Cancelling bake");
            service.cancel_bake();
            bake.await
        }
    }?;

    match outcome {
        Ok(report) => {
            println!("✅ Baked scene {}", report.scene);
            println!("   waypoints: {}", report.node_count);
            println!("   edges:     {}", report.edge_count);
            println!("   lookups:   {}", report.lookup_count);
            println!("   searches:  {}", report.searches);
            println!("   elapsed:   {} ms", report.elapsed_ms);
            println!("   bake id:   {}", report.bake_id);
            Ok(())
        }
        Err(e) => {
            error!("Bake failed: {}", e);
            println!("❌ Bake failed: {}", e);
            Err(e.into())
        }
    }
}
