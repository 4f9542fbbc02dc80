use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser, Clone)]
#[command(name = "santoplay")]
#[command(about = "Find and play internet radio stations from the terminal")]
#[command(version)]
pub struct Cli {
    /// Read settings from this config.toml instead of the default location.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keep favorites and playlists in this directory.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Only look for mpv on PATH, skipping bundled binaries.
    #[arg(long)]
    pub system_deps: bool,
}
