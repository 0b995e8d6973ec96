//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use referendum_governance::{ReferendumParams, TALLY_INTERVAL_SECS};
use referendum_store_lmdb::DEFAULT_MAP_SIZE;
use referendum_types::AccountName;
use referendum_utils::LogFormat;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for the referendum daemon.
///
/// Can be loaded from a TOML file via [`DaemonConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). CLI flags override file values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Data directory for the LMDB environment.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// The referendum's own account. Scheduled recounts run under it.
    #[serde(default = "default_contract_account")]
    pub contract_account: AccountName,

    /// JSON file mapping account names to their current stake.
    #[serde(default)]
    pub stakes_file: Option<PathBuf>,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// LMDB map size in bytes.
    #[serde(default = "default_map_size")]
    pub map_size: usize,

    /// Wall-clock seconds that stand in for one day in the `run` loop.
    /// Lower it to rehearse a whole referendum quickly.
    #[serde(default = "default_seconds_per_day")]
    pub seconds_per_day: u64,

    /// Parameters installed by `init`.
    #[serde(default)]
    pub referendum: ReferendumParams,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_data_dir() -> PathBuf {
    PathBuf::from("./referendum_data")
}

fn default_contract_account() -> AccountName {
    AccountName::new("referendum")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_map_size() -> usize {
    DEFAULT_MAP_SIZE
}

fn default_seconds_per_day() -> u64 {
    TALLY_INTERVAL_SECS
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            contract_account: default_contract_account(),
            stakes_file: None,
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            map_size: default_map_size(),
            seconds_per_day: default_seconds_per_day(),
            referendum: ReferendumParams::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = DaemonConfig::default();
        let toml_str = config.to_toml_string().expect("should serialize");
        let parsed = DaemonConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.contract_account, config.contract_account);
        assert_eq!(parsed.seconds_per_day, config.seconds_per_day);
        assert_eq!(parsed.referendum, config.referendum);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.contract_account.as_str(), "referendum");
        assert_eq!(config.log_format, LogFormat::Human);
        assert_eq!(config.seconds_per_day, 86_400);
        assert_eq!(config.referendum.vote_period_days, 300);
        assert_eq!(config.referendum.sustained_vote_days, 30);
    }

    #[test]
    fn partial_referendum_table_overrides() {
        let toml = r#"
            log_format = "json"
            seconds_per_day = 2

            [referendum]
            vote_period_days = 10
            sustained_vote_days = 3
        "#;
        let config = DaemonConfig::from_toml_str(toml).expect("should parse");
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.seconds_per_day, 2);
        assert_eq!(config.referendum.vote_period_days, 10);
        assert_eq!(config.referendum.sustained_vote_days, 3);
        assert_eq!(config.referendum.min_participation_percent, 15.0); // default
    }

    #[test]
    fn invalid_contract_account_is_rejected() {
        assert!(DaemonConfig::from_toml_str(r#"contract_account = "Not Valid""#).is_err());
    }
}
