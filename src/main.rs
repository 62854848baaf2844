use anyhow::Result;
use bookpro::config::Config;
use bookpro::{server, Args};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    // Load configuration
    let mut cfg = if let Some(config_path) = &args.config {
        Config::load_from(config_path)?
    } else {
        Config::load()?
    };

    // Apply CLI overrides
    if let Some(port) = args.port {
        cfg.server.port = port;
    }
    if let Some(fixtures) = &args.fixtures {
        cfg.store.fixtures_file = Some(fixtures.display().to_string());
    }
    if args.no_seed {
        cfg.store.seed_fixtures = false;
    }
    if let Some(origin) = &args.cors_origin {
        cfg.server.cors_origin = Some(origin.clone());
    }

    server::run(cfg).await
}
