//! Configuration loading and parsing.
//!
//! Defines the app config schema and resolves defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Top-level application configuration loaded from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Root directory of the audio library.
    pub library_root: Option<String>,
    /// Audio file extensions to index (case-insensitive, no leading dot).
    pub extensions: Option<Vec<String>>,
    /// Playback tuning.
    pub playback: Option<PlaybackConfig>,
}

/// Playback section from TOML.
#[derive(Debug, Default, Deserialize)]
pub struct PlaybackConfig {
    /// Session poll interval in milliseconds (default: 100).
    pub poll_interval_ms: Option<u64>,
}

impl AppConfig {
    /// Load configuration from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            std::fs::read_to_string(path).with_context(|| format!("read config {:?}", path))?;
        let cfg = toml::from_str::<AppConfig>(&raw)
            .with_context(|| format!("parse config {:?}", path))?;
        Ok(cfg)
    }
}

/// Extract the optional library root from config.
pub fn library_root_from_config(cfg: &AppConfig) -> Option<std::path::PathBuf> {
    cfg.library_root.as_deref().and_then(|path| {
        let trimmed = path.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(std::path::PathBuf::from(trimmed))
        }
    })
}

/// Resolve the extension allowlist, lowercased, defaulting to mp3 only.
pub fn extensions_from_config(cfg: &AppConfig) -> Vec<String> {
    let exts = cfg
        .extensions
        .as_ref()
        .map(|list| {
            list.iter()
                .map(|ext| ext.trim().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();
    if exts.is_empty() {
        vec!["mp3".to_string()]
    } else {
        exts
    }
}

/// Resolve the session poll interval, defaulting to 100ms.
pub fn poll_interval_from_config(cfg: &AppConfig) -> Duration {
    let ms = cfg
        .playback
        .as_ref()
        .and_then(|p| p.poll_interval_ms)
        .unwrap_or(100);
    Duration::from_millis(ms.max(1))
}
