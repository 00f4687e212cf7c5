use anyhow::{bail, Context, Result};
use nav_routing::adapters::outbound::loggers::init_console_logger;
use nav_routing::adapters::outbound::navigation_data::FilesystemDataSource;
use nav_routing::application::NavigationService;
use nav_routing::common::{path_length, Point3};
use nav_routing::Config;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Path query command.
///
/// Usage: `navquery <sx> <sy> <sz> <gx> <gy> <gz> [config.toml]`
///
/// Loads the configured scene together with its baked asset and prints the
/// points an agent would walk from start to goal.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 6 {
        bail!("usage: navquery <sx> <sy> <sz> <gx> <gy> <gz> [config.toml]");
    }
    let coords = args[..6]
        .iter()
        .map(|a| a.parse::<f32>().with_context(|| format!("invalid coordinate {:?}", a)))
        .collect::<Result<Vec<f32>>>()?;
    let start = Point3::new(coords[0], coords[1], coords[2]);
    let goal = Point3::new(coords[3], coords[4], coords[5]);

    let config_path = args.get(6).map(String::as_str).unwrap_or("config.toml");
    let config = if Path::new(config_path).exists() {
        Config::from_file(config_path).await?
    } else {
        Config::default()
    };

    let data = Arc::new(FilesystemDataSource::new(config.storage.data_dir.clone()));
    let service = NavigationService::new(config, data.clone(), data, init_console_logger());
    let context = service
        .load_configured()
        .context("no baked navigation asset; run navbake first")?;

    println!(
        "🗺️  Scene {}: {} waypoints, table {}",
        context.scene(),
        context.graph().len(),
        if context.has_table() { "baked" } else { "missing" }
    );

    let path = service.query(start, goal);
    let mut walked = Vec::with_capacity(path.len() + 1);
    walked.push(start);
    walked.extend_from_slice(&path);

    println!("📍 start {:.3} {:.3} {:.3}", start.x, start.y, start.z);
    for p in &path {
        println!("   -> {:.3} {:.3} {:.3}", p.x, p.y, p.z);
    }
    println!("📏 length {:.3}", path_length(&walked));
    Ok(())
}
