//! Command-line arguments for the server binary.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "bookpro", about = "Book-review catalog service")]
pub struct Args {
    /// Config file path (default: ~/.bookpro/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(long, env = "BOOKPRO_PORT")]
    pub port: Option<u16>,

    /// JSON fixture file to seed from instead of the built-in set
    #[arg(long)]
    pub fixtures: Option<PathBuf>,

    /// Start with an empty store (no fixture seeding)
    #[arg(long)]
    pub no_seed: bool,

    /// Allowed CORS origin (overrides config; default allows any)
    #[arg(long)]
    pub cors_origin: Option<String>,
}
