//! Configuration structures for GridLedger.

use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a ledger session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Transaction store file imported at start and exported at exit.
    pub store_path: PathBuf,
    /// Minimum degree of the four top-level indices.
    pub index_degree: usize,
    /// Minimum degree of per-seller and per-buyer transaction sub-indices.
    pub sub_index_degree: usize,
    /// Energy amount (kWh) separating the lower and upper pricing tier.
    pub tier_threshold_kwh: f64,
    /// Transactions with one seller needed to count as a regular buyer.
    pub regular_buyer_threshold: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from("transactions.txt"),
            index_degree: 3,
            sub_index_degree: 2,
            tier_threshold_kwh: 300.0,
            regular_buyer_threshold: 5,
        }
    }
}

impl LedgerConfig {
    /// Loads a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| LedgerError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.index_degree < 2 {
            return Err(invalid("index_degree", self.index_degree));
        }
        if self.sub_index_degree < 2 {
            return Err(invalid("sub_index_degree", self.sub_index_degree));
        }
        if !(self.tier_threshold_kwh.is_finite() && self.tier_threshold_kwh > 0.0) {
            return Err(invalid("tier_threshold_kwh", self.tier_threshold_kwh));
        }
        if self.regular_buyer_threshold == 0 {
            return Err(invalid(
                "regular_buyer_threshold",
                self.regular_buyer_threshold,
            ));
        }
        if self.store_path.as_os_str().is_empty() {
            return Err(LedgerError::ConfigError("store_path is empty".to_string()));
        }
        Ok(())
    }
}

fn invalid(name: &str, value: impl ToString) -> LedgerError {
    LedgerError::InvalidParameter {
        name: name.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ledger_config_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.store_path, PathBuf::from("transactions.txt"));
        assert_eq!(config.index_degree, 3);
        assert_eq!(config.sub_index_degree, 2);
        assert_eq!(config.tier_threshold_kwh, 300.0);
        assert_eq!(config.regular_buyer_threshold, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_ledger_config_serde_roundtrip() {
        let original = LedgerConfig {
            index_degree: 8,
            ..Default::default()
        };
        let serialized = serde_json::to_string(&original).unwrap();
        let deserialized: LedgerConfig = serde_json::from_str(&serialized).unwrap();

        assert_eq!(original.store_path, deserialized.store_path);
        assert_eq!(original.index_degree, deserialized.index_degree);
        assert_eq!(original.sub_index_degree, deserialized.sub_index_degree);
        assert_eq!(
            original.regular_buyer_threshold,
            deserialized.regular_buyer_threshold
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LedgerConfig = serde_json::from_str(r#"{"index_degree": 4}"#).unwrap();
        assert_eq!(config.index_degree, 4);
        assert_eq!(config.sub_index_degree, 2);
        assert_eq!(config.store_path, PathBuf::from("transactions.txt"));
    }

    #[test]
    fn test_validate_rejects_small_degree() {
        let config = LedgerConfig {
            index_degree: 1,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameter: index_degree = 1");

        let config = LedgerConfig {
            sub_index_degree: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LedgerError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_thresholds() {
        let config = LedgerConfig {
            tier_threshold_kwh: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LedgerConfig {
            tier_threshold_kwh: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = LedgerConfig {
            regular_buyer_threshold: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"store_path": "/tmp/tx.txt", "regular_buyer_threshold": 3}}"#
        )
        .unwrap();

        let config = LedgerConfig::from_json_file(&path).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/tx.txt"));
        assert_eq!(config.regular_buyer_threshold, 3);
        assert_eq!(config.index_degree, 3);
    }

    #[test]
    fn test_from_json_file_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            LedgerConfig::from_json_file(&path),
            Err(LedgerError::ConfigError(_))
        ));

        let path = dir.path().join("bad_degree.json");
        std::fs::write(&path, r#"{"index_degree": 1}"#).unwrap();
        assert!(matches!(
            LedgerConfig::from_json_file(&path),
            Err(LedgerError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = LedgerConfig::from_json_file(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(LedgerError::Io(_))));
    }
}
