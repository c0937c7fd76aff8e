use crate::core::error::ConfigError;
use crate::core::orchestrator::{ScanOptions, ScanRequest};
use crate::core::price::{DateRange, Interval};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

pub const DEFAULT_FMP_BASE_URL: &str = "https://financialmodelingprep.com";
pub const FMP_API_KEY_ENV: &str = "FMP_API_KEY";

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FmpProviderConfig {
    #[serde(default = "default_fmp_base_url")]
    pub base_url: String,
    pub api_key: Option<String>,
}

fn default_fmp_base_url() -> String {
    DEFAULT_FMP_BASE_URL.to_string()
}

impl Default for FmpProviderConfig {
    fn default() -> Self {
        FmpProviderConfig {
            base_url: default_fmp_base_url(),
            api_key: None,
        }
    }
}

impl FmpProviderConfig {
    /// The configured key, or the `FMP_API_KEY` environment variable.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(FMP_API_KEY_ENV).ok())
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingCredential("FMP API key"))
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub fmp: FmpProviderConfig,
}

fn default_workers() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_retries() -> usize {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub tickers: Vec<String>,
    pub intervals: Vec<Interval>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_workers")]
    pub workers: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_retries")]
    pub retries: usize,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "hurstscan", "hurstscan")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn scan_request(&self) -> Result<ScanRequest, ConfigError> {
        let request = ScanRequest {
            tickers: self.tickers.iter().map(|t| t.trim().to_string()).collect(),
            intervals: self.intervals.clone(),
            range: DateRange {
                start: self.start,
                end: self.end,
            },
        };
        request.validate()?;
        Ok(request)
    }

    pub fn scan_options(&self) -> Result<ScanOptions, ConfigError> {
        let options = ScanOptions {
            workers: self.workers,
            fetch_timeout: Duration::from_secs(self.timeout_secs),
        };
        options.validate()?;
        Ok(options)
    }
}
