//! Configuration Module
//!
//! This module defines all configuration structures for the orderer.
//! Configuration is loaded from TOML files and parsed using serde.

use serde::Deserialize;
use std::fs;
use std::time::Duration;

/// Main configuration structure
///
/// Contains all configuration sections for the orderer.
/// Loaded from a TOML file (e.g., config/default.toml).
///
/// # Example TOML
/// ```toml
/// [general]
/// log_level = "info"
///
/// [solo]
/// batch_timeout_ms = 10000
///
/// [batch_size]
/// max_message_count = 10
///
/// [ledger]
/// chain_id = "testchainid"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    pub solo: SoloConfig,
    pub batch_size: BatchSizeConfig,
    pub ledger: LedgerConfig,
}

/// Process-wide settings
///
/// # Fields
/// - `log_level`: Maximum tracing level ("error", "warn", "info", "debug", "trace")
#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Solo consenter configuration
///
/// # Fields
/// - `batch_timeout_ms`: How long a partial batch may wait before it is cut (in milliseconds)
#[derive(Debug, Clone, Deserialize)]
pub struct SoloConfig {
    pub batch_timeout_ms: u64,
}

impl SoloConfig {
    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }
}

/// Batch cutting thresholds
///
/// # Fields
/// - `max_message_count`: Number of pending envelopes that completes a batch
#[derive(Debug, Clone, Deserialize)]
pub struct BatchSizeConfig {
    pub max_message_count: usize,
}

/// Ledger configuration
///
/// # Fields
/// - `chain_id`: Identifier of the ledger instance the chain writes to
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    pub chain_id: String,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Arguments
    /// * `path` - Path to the TOML configuration file
    ///
    /// # Returns
    /// * `Ok(Config)` if the file was successfully loaded, parsed and validated
    /// * `Err` if the file couldn't be read, the TOML is invalid, or a value is out of range
    ///
    /// # Example
    /// ```no_run
    /// let config = solo_orderer::Config::load("config/default.toml")?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config file {}: {}", path, e))?;
        Self::parse(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.solo.batch_timeout_ms > 0, "solo.batch_timeout_ms must be positive");
        anyhow::ensure!(
            self.batch_size.max_message_count > 0,
            "batch_size.max_message_count must be positive"
        );
        anyhow::ensure!(!self.ledger.chain_id.is_empty(), "ledger.chain_id must not be empty");
        self.log_level()?;
        Ok(())
    }

    /// Parsed tracing level from `general.log_level`
    pub fn log_level(&self) -> anyhow::Result<tracing::Level> {
        self.general
            .log_level
            .parse::<tracing::Level>()
            .map_err(|_| anyhow::anyhow!("unknown log level: {}", self.general.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [general]
        log_level = "debug"

        [solo]
        batch_timeout_ms = 250

        [batch_size]
        max_message_count = 3

        [ledger]
        chain_id = "testchainid"
    "#;

    #[test]
    fn test_parse_full_config() {
        let config = Config::parse(SAMPLE).unwrap();
        assert_eq!(config.solo.batch_timeout(), Duration::from_millis(250));
        assert_eq!(config.batch_size.max_message_count, 3);
        assert_eq!(config.ledger.chain_id, "testchainid");
        assert_eq!(config.log_level().unwrap(), tracing::Level::DEBUG);
    }

    #[test]
    fn test_general_section_is_optional() {
        let config = Config::parse(
            r#"
            [solo]
            batch_timeout_ms = 10
            [batch_size]
            max_message_count = 1
            [ledger]
            chain_id = "c"
            "#,
        )
        .unwrap();
        assert_eq!(config.general.log_level, "info");
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = Config::parse(&SAMPLE.replace("250", "0")).unwrap_err();
        assert!(err.to_string().contains("batch_timeout_ms"));
    }

    #[test]
    fn test_zero_message_count_rejected() {
        let text = SAMPLE.replace("max_message_count = 3", "max_message_count = 0");
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_unknown_log_level_rejected() {
        let text = SAMPLE.replace("\"debug\"", "\"loud\"");
        assert!(Config::parse(&text).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(Config::load("does/not/exist.toml").is_err());
    }
}
