use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::job::ActiveSet;
use crate::registry::{InsertPosition, VersionPolicy};
use crate::stream::StreamStrategy;

/// Environment variable that overrides `api_base_url`.
pub const API_URL_ENV: &str = "DLSYNC_API_URL";

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Push-connection reconnect policy (optional `[reconnect]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Maximum consecutive attempts per per-job connection (including the
    /// first). The global connection ignores this and retries indefinitely.
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.5 = 500ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            base_delay_secs: 0.5,
            max_delay_secs: 30,
        }
    }
}

/// Client configuration loaded from `~/.config/dlsync/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Origin of the download service, e.g. `http://localhost:8080`.
    pub api_base_url: String,
    /// One push connection per job, or one shared connection for all jobs.
    #[serde(default)]
    pub stream_strategy: StreamStrategy,
    /// Where a job seen for the first time is inserted.
    #[serde(default)]
    pub insert_position: InsertPosition,
    /// Whether out-of-order updates are discarded by version.
    #[serde(default)]
    pub version_policy: VersionPolicy,
    /// Statuses counted as active in the stats header.
    #[serde(default)]
    pub active_statuses: ActiveSet,
    /// Count CANCELLED jobs in the failed bucket.
    #[serde(default)]
    pub failed_includes_cancelled: bool,
    /// TCP connect timeout for every request, in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    /// Optional reconnect policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub reconnect: Option<ReconnectConfig>,
}

fn default_connect_timeout_secs() -> u64 {
    10
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            stream_strategy: StreamStrategy::default(),
            insert_position: InsertPosition::default(),
            version_policy: VersionPolicy::default(),
            active_statuses: ActiveSet::default(),
            failed_includes_cancelled: false,
            connect_timeout_secs: default_connect_timeout_secs(),
            reconnect: None,
        }
    }
}

impl SyncConfig {
    pub fn reconnect(&self) -> ReconnectConfig {
        self.reconnect.clone().unwrap_or_default()
    }

    /// Let `DLSYNC_API_URL` win over the file, so development and production
    /// can point at different services without editing config.
    pub fn apply_env_overrides(&mut self) {
        self.apply_api_url_override(std::env::var(API_URL_ENV).ok());
    }

    fn apply_api_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
            tracing::debug!("api base url overridden by {}: {}", API_URL_ENV, url);
            self.api_base_url = url;
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("dlsync")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists, then
/// apply environment overrides.
pub fn load_or_init() -> Result<SyncConfig> {
    let path = config_path()?;
    let mut cfg = load_or_init_at(&path)?;
    cfg.apply_env_overrides();
    Ok(cfg)
}

/// Like [`load_or_init`] for an explicit path, without environment overrides.
pub fn load_or_init_at(path: &Path) -> Result<SyncConfig> {
    if !path.exists() {
        let default_cfg = SyncConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(path)?;
    let cfg: SyncConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    Ok(cfg)
}
