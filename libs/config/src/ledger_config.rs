//! Ledger Configuration Module
//!
//! Loads the ledger's runtime configuration from a TOML file with
//! `CONFLUENCE_`-prefixed environment variable overrides, e.g.
//! `CONFLUENCE_PROTOCOL_VERSION=84` or `CONFLUENCE_LOGGING__LEVEL=debug`.

use crate::logging::LoggingConfig;
use crate::protocol::{ConstantValues, ProtocolVersion};
use anyhow::{Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};
use types::{Asset, PoolStatus};

/// Optional per-deployment constant overrides
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConstantOverrides {
    pub liquidity_lockup_blocks: Option<i64>,
    pub full_imp_loss_protection_blocks: Option<i64>,
    pub min_imp_loss_protection_age: Option<i64>,
    pub default_pool_status: Option<String>,
    pub native_transaction_fee: Option<i64>,
    pub maximum_liquidity_rune: Option<i64>,
}

/// Top-level ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub protocol_version: ProtocolVersion,
    /// The RUNE asset of this network; `BNB.RUNE-B1A` on networks where RUNE
    /// is not native to THORChain
    pub rune_asset: String,
    pub constants: ConstantOverrides,
    /// Seed mimir values for in-memory stores
    pub mimir: BTreeMap<String, i64>,
    pub logging: LoggingConfig,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::CURRENT,
            rune_asset: Asset::rune().to_string(),
            constants: ConstantOverrides::default(),
            mimir: BTreeMap::new(),
            logging: LoggingConfig::default(),
        }
    }
}

impl LedgerConfig {
    /// Load configuration from a TOML file with environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading ledger config: {:?}", path);

        let config = Config::builder()
            .add_source(File::from(path).required(true))
            .add_source(
                Environment::with_prefix("CONFLUENCE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let loaded: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        loaded.rune()?;
        debug!(version = %loaded.protocol_version, "ledger config loaded");
        Ok(loaded)
    }

    /// Versioned constants with this deployment's overrides applied
    pub fn constants(&self) -> ConstantValues {
        let mut values = ConstantValues::for_version(self.protocol_version);
        let o = &self.constants;
        if let Some(v) = o.liquidity_lockup_blocks {
            values.liquidity_lockup_blocks = v;
        }
        if let Some(v) = o.full_imp_loss_protection_blocks {
            values.full_imp_loss_protection_blocks = v;
        }
        if let Some(v) = o.min_imp_loss_protection_age {
            values.min_imp_loss_protection_age = v;
        }
        if let Some(v) = o.native_transaction_fee {
            values.native_transaction_fee = v;
        }
        if let Some(v) = o.maximum_liquidity_rune {
            values.maximum_liquidity_rune = v;
        }
        if let Some(name) = &o.default_pool_status {
            let status = PoolStatus::from_name(name);
            if status == PoolStatus::Suspended {
                warn!(status = %name, "default pool status resolves to Suspended");
            }
            values.default_pool_status = status;
        }
        values
    }

    /// Parsed RUNE asset
    pub fn rune(&self) -> Result<Asset> {
        let asset: Asset = self
            .rune_asset
            .parse()
            .with_context(|| format!("Invalid rune asset {}", self.rune_asset))?;
        if !asset.is_rune() {
            anyhow::bail!("{} is not a RUNE asset", asset);
        }
        Ok(asset)
    }

    /// Render as TOML, e.g. to write out a default config file
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Load the config at `path`, or fall back to defaults when it is absent
pub fn load_config(path: Option<&Path>) -> Result<LedgerConfig> {
    match path {
        Some(path) if path.exists() => LedgerConfig::load(path),
        Some(path) => {
            warn!("Ledger config not found: {:?}, using defaults", path);
            Ok(LedgerConfig::default())
        }
        None => Ok(LedgerConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_ledger_config() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ledger.toml");

        let config_content = r#"
protocol_version = 84
rune_asset = "BNB.RUNE-B1A"

[constants]
liquidity_lockup_blocks = 10
default_pool_status = "Available"

[mimir]
maximumliquidityrune = 1000
"#;
        fs::write(&config_path, config_content).unwrap();

        let config = LedgerConfig::load(&config_path).unwrap();
        assert_eq!(config.protocol_version, ProtocolVersion::V84);
        assert_eq!(config.rune().unwrap().to_string(), "BNB.RUNE-B1A");
        assert_eq!(config.mimir.get("maximumliquidityrune"), Some(&1000));

        let constants = config.constants();
        assert_eq!(constants.liquidity_lockup_blocks, 10);
        assert_eq!(constants.default_pool_status, PoolStatus::Available);
        // untouched values keep the versioned constant
        assert_eq!(constants.full_imp_loss_protection_blocks, 1_440_000);
    }

    #[test]
    fn test_rejects_non_rune_asset() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("ledger.toml");
        fs::write(&config_path, "rune_asset = \"BTC.BTC\"\n").unwrap();
        assert!(LedgerConfig::load(&config_path).is_err());
    }

    #[test]
    fn test_default_round_trips_through_toml() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("default.toml");
        let rendered = LedgerConfig::default().to_toml().unwrap();
        fs::write(&config_path, rendered).unwrap();

        let loaded = LedgerConfig::load(&config_path).unwrap();
        assert_eq!(loaded.protocol_version, ProtocolVersion::CURRENT);
        assert_eq!(loaded.constants(), ConstantValues::default());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.protocol_version, ProtocolVersion::CURRENT);
        assert_eq!(config.rune().unwrap(), Asset::rune());
    }
}
