mod action;
mod app;
mod app_state;
mod cli;
mod component;
mod components;
mod focus;
mod mpv;
mod player;
mod requests;
mod theme;
mod widgets;
mod workspace;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{info, warn};

use radio_core::config::Config;
use radio_core::directory::DirectoryClient;
use radio_core::library::Library;
use radio_core::platform;
use radio_core::store::{JsonFileStore, MemoryStore};

use crate::app::App;
use crate::app_state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    platform::set_use_system_deps(cli.system_deps);

    let log_dir = platform::data_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("santoplay.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("santoplay log: {}", log_path.display());
    info!("santoplay starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let loaded = match cli.config.as_deref() {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    let config = loaded.unwrap_or_else(|e| {
        warn!("config: {:#}; using defaults", e);
        Config::default()
    });
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(|| config.paths.data_dir.clone());

    // ── Directory client + player task ───────────────────────────────────────
    let directory = DirectoryClient::new(&config.directory)?;
    let (update_tx, update_rx) = mpsc::channel(64);
    let player_tx = player::spawn(&config.mpv, update_tx);

    let state = AppState::new(config.directory.discover_tag.clone(), log_path);
    let limits = config.directory.clone();

    // ── Run TUI ──────────────────────────────────────────────────────────────
    match std::fs::create_dir_all(&data_dir) {
        Ok(()) => {
            info!("library in {}", data_dir.display());
            let library = Library::load(JsonFileStore::new(data_dir));
            App::new(state, library, directory, limits, player_tx, update_rx)
                .run()
                .await
        }
        Err(e) => {
            warn!("cannot create {}: {}; library kept in memory", data_dir.display(), e);
            let library = Library::load(MemoryStore::new());
            App::new(state, library, directory, limits, player_tx, update_rx)
                .with_notice(format!(
                    "cannot write to {}; favorites and playlists will not be saved",
                    data_dir.display()
                ))
                .run()
                .await
        }
    }
}
