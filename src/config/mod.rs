//! Exporter configuration management

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

use crate::settings::LauncherSettings;
use crate::shell::CacheManifest;

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Origin the shell is served from, used to resolve manifest paths during preflight
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Derive the cache name from a hash of the exported shell
    #[serde(default)]
    pub content_versioned: bool,

    #[serde(default)]
    pub launcher: LauncherSettings,

    #[serde(default)]
    pub shell: CacheManifest,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

fn default_origin() -> String {
    "http://localhost".to_string()
}

/// Get config directory (SRL_CONFIG_DIR, else the working directory)
pub fn get_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SRL_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from(".")
}

pub fn load_config() -> Result<Config> {
    let config_dir = get_config_dir();

    let mut builder = ::config::Config::builder()
        .set_default("out_dir", "dist")?
        .set_default("origin", default_origin())?
        .set_default("content_versioned", false)?
        .add_source(
            ::config::File::with_name(&config_dir.join("config").to_string_lossy()).required(false),
        )
        // SRL_OUT_DIR, SRL_LAUNCHER__PLAY_URL, SRL_SHELL__CACHE_NAME, ...
        .add_source(
            ::config::Environment::with_prefix("SRL")
                .separator("__")
                .try_parsing(true),
        );

    // Legacy PLAY_URL, below SRL_LAUNCHER__PLAY_URL
    if std::env::var("SRL_LAUNCHER__PLAY_URL").is_err() {
        if let Ok(url) = std::env::var("PLAY_URL") {
            if !url.trim().is_empty() {
                builder = builder.set_override("launcher.play_url", url)?;
            }
        }
    }

    let config = builder.build()?;

    Ok(config.try_deserialize()?)
}
