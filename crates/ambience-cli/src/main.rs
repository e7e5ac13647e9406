//! `ambience`, a line-oriented front end for the ambience playback engine.
//!
//! Commands:
//! - `open <dir>`: scan a library root
//! - `folders`: list scanned folders (leaves marked with `*`)
//! - `use <n>`: load folder number `n` into the playlist
//! - `list`, `play [n]`, `pause`, `resume`, `stop`, `skip`
//! - `shuffle`, `repeat [none|one|all]`, `status`, `quit`

mod shell;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rodio::OutputStream;
use tracing_subscriber::EnvFilter;

use ambience_core::config::{self, AppConfig};
use ambience_core::library::TrackFilter;
use ambience_core::output::RodioOutput;
use ambience_core::player::Player;

#[derive(Parser, Debug)]
#[command(name = "ambience", version)]
struct Args {
    /// Library root directory to scan at startup.
    root: Option<PathBuf>,

    /// Optional config file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let cfg = match args.config.as_ref() {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    let filter = TrackFilter::new(config::extensions_from_config(&cfg));
    let poll_interval = config::poll_interval_from_config(&cfg);
    let root = args.root.or_else(|| config::library_root_from_config(&cfg));
    match root.as_deref() {
        Some(dir) => tracing::info!(root = %dir.display(), "starting ambience"),
        None => tracing::info!("starting ambience without a library root"),
    }

    // The stream must outlive every sink; keep it alive for the whole run.
    let (_stream, handle) = OutputStream::try_default().context("open default audio output")?;
    let (player, events) = Player::new(RodioOutput::new(handle), filter.clone(), poll_interval);

    let player_for_signal = player.clone();
    let _ = ctrlc::set_handler(move || {
        player_for_signal.stop();
        std::process::exit(130);
    });

    shell::run(player, events, filter, root)
}
