use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub mpv: MpvConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Station directory (radio-browser) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Interchangeable API hosts; one is picked at random per request.
    #[serde(default = "default_mirrors")]
    pub mirrors: Vec<String>,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Result limit for name searches.
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Tag shown on the Discover tab and used by "top" / "surprise me".
    #[serde(default = "default_discover_tag")]
    pub discover_tag: String,
    #[serde(default = "default_discover_limit")]
    pub discover_limit: u32,
    #[serde(default = "default_top_limit")]
    pub top_limit: u32,
    #[serde(default = "default_random_limit")]
    pub random_limit: u32,
    /// Result limit for the tag listing on the Search tab.
    #[serde(default = "default_tag_limit")]
    pub tag_limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MpvConfig {
    #[serde(default = "default_volume")]
    pub default_volume: f32,
    /// Seconds without audio after a load before the stream is marked failed.
    #[serde(default = "default_start_timeout_secs")]
    pub start_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding favorites.json and playlists.json.
    #[serde(default = "platform::data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            mirrors: default_mirrors(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            search_limit: default_search_limit(),
            discover_tag: default_discover_tag(),
            discover_limit: default_discover_limit(),
            top_limit: default_top_limit(),
            random_limit: default_random_limit(),
            tag_limit: default_tag_limit(),
        }
    }
}

impl Default for MpvConfig {
    fn default() -> Self {
        Self {
            default_volume: default_volume(),
            start_timeout_secs: default_start_timeout_secs(),
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: platform::data_dir(),
        }
    }
}

fn default_mirrors() -> Vec<String> {
    vec![
        "https://de1.api.radio-browser.info".to_string(),
        "https://nl1.api.radio-browser.info".to_string(),
        "https://at1.api.radio-browser.info".to_string(),
    ]
}

fn default_user_agent() -> String {
    format!("santoplay/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_search_limit() -> u32 {
    30
}

fn default_discover_tag() -> String {
    "gospel".to_string()
}

fn default_discover_limit() -> u32 {
    12
}

fn default_top_limit() -> u32 {
    10
}

fn default_random_limit() -> u32 {
    20
}

fn default_tag_limit() -> u32 {
    30
}

fn default_volume() -> f32 {
    0.5
}

fn default_start_timeout_secs() -> u64 {
    15
}

impl Config {
    /// Load the config from its default location, writing defaults on first run.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(config_path: &Path) -> anyhow::Result<Self> {
        if !config_path.exists() {
            let config = Self::default();
            config.save_to(config_path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
