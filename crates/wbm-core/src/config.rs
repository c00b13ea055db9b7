use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per snapshot (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 1.0 = one second).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay_secs: 1.0,
            max_delay_secs: 30,
        }
    }
}

impl RetryConfig {
    pub fn to_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            base_delay: Duration::from_secs_f64(self.base_delay_secs.max(0.0)),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Global configuration loaded from `~/.config/wbm/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Prefix for raw snapshot URLs (`{wayback_base}/{timestamp}id_/{original}`).
    pub wayback_base: String,
    /// CDX search endpoint used for capture discovery.
    pub cdx_endpoint: String,
    /// User-Agent sent with every request.
    pub user_agent: String,
    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Whole-request timeout in seconds; a timeout is recorded as a transport error.
    pub request_timeout_secs: u64,
    /// Politeness delay after each network fetch, in milliseconds.
    pub delay_ms: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    #[serde(default)]
    pub retry: Option<RetryConfig>,
    /// Remove the WordPress Age Gate overlay from saved HTML.
    #[serde(default = "default_true")]
    pub strip_age_gate: bool,
    /// Keep Age Gate plugin assets and wp-json endpoints in the capture list.
    #[serde(default)]
    pub include_age_gate_resources: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            wayback_base: "https://web.archive.org/web".to_string(),
            cdx_endpoint: "https://web.archive.org/cdx/search/cdx".to_string(),
            user_agent: concat!("wbm/", env!("CARGO_PKG_VERSION")).to_string(),
            connect_timeout_secs: 30,
            request_timeout_secs: 90,
            delay_ms: 200,
            retry: None,
            strip_age_gate: true,
            include_age_gate_resources: false,
        }
    }
}

impl MirrorConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.clone().unwrap_or_default().to_policy()
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("wbm")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<MirrorConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = MirrorConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: MirrorConfig = toml::from_str(&data)?;
    Ok(cfg)
}
