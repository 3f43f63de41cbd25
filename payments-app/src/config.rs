//! Configuration loading from environment.

use std::env;
use std::path::PathBuf;

use anyhow::Context;

use payments_types::StatusPolicy;

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub provider_base_url: String,
    pub status_policy: StatusPolicy,
    pub seed_file: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid port number")?;

        let database_url = match var("DB_URI") {
            Some(uri) => uri,
            None => {
                let name = var("DB_NAME").unwrap_or_else(|| "payments".to_string());
                format!("sqlite://{name}.db?mode=rwc")
            }
        };

        let provider_base_url = var("THIRD_PARTY_SERVICE_BASE_URL").ok_or_else(|| {
            anyhow::anyhow!("THIRD_PARTY_SERVICE_BASE_URL environment variable is required")
        })?;

        let status_policy = match var("ERROR_STATUS_POLICY") {
            Some(raw) => raw.parse::<StatusPolicy>().map_err(anyhow::Error::msg)?,
            None => StatusPolicy::default(),
        };

        let log_format = match var("LOG_FORMAT").as_deref().map(str::to_ascii_lowercase) {
            None => LogFormat::Pretty,
            Some(f) if f == "pretty" => LogFormat::Pretty,
            Some(f) if f == "json" => LogFormat::Json,
            Some(other) => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{other}'"),
        };

        Ok(Self {
            port,
            database_url,
            provider_base_url,
            status_policy,
            seed_file: var("SEED_FILE").map(PathBuf::from),
            log_format,
        })
    }
}
