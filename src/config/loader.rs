//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading payroll
//! configuration from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{PayrollError, PayrollResult};

use super::types::{PayrollConfig, PolicyConfig, StatutoryConfig};

/// Loads and provides access to payroll configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// validates the statutory tables before handing out a [`PayrollConfig`].
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/uganda/
/// ├── statutory.yaml  # PAYE bands, NSSF rates, LST bands, rounding
/// └── policy.yaml     # Proration, overtime and approval policy
/// ```
///
/// # Example
///
/// ```no_run
/// use payroll_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/uganda").unwrap();
/// let config = loader.config();
/// assert_eq!(config.statutory().paye.bands.len(), 5);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: PayrollConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the configuration directory (e.g. "./config/uganda")
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - The statutory band tables are empty, unordered or non-contiguous
    pub fn load<P: AsRef<Path>>(path: P) -> PayrollResult<Self> {
        let path = path.as_ref();

        let statutory_path = path.join("statutory.yaml");
        let statutory = Self::load_yaml::<StatutoryConfig>(&statutory_path)?;

        let policy_path = path.join("policy.yaml");
        let policy = Self::load_yaml::<PolicyConfig>(&policy_path)?;

        Self::validate_statutory(&statutory, &statutory_path.display().to_string())?;

        Ok(Self {
            config: PayrollConfig::new(statutory, policy),
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> PayrollResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| PayrollError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| PayrollError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Validates that the band tables are usable: non-empty, ordered,
    /// contiguous, with exactly one open top band.
    fn validate_statutory(statutory: &StatutoryConfig, path: &str) -> PayrollResult<()> {
        let parse_error = |message: String| PayrollError::ConfigParseError {
            path: path.to_string(),
            message,
        };

        if statutory.paye.bands.is_empty() {
            return Err(parse_error("paye.bands must not be empty".to_string()));
        }
        for pair in statutory.paye.bands.windows(2) {
            if pair[0].upper != Some(pair[1].lower) {
                return Err(parse_error(format!(
                    "paye.bands must be contiguous: band ending at {:?} is followed by band starting at {}",
                    pair[0].upper, pair[1].lower
                )));
            }
        }
        if statutory.paye.bands.last().is_some_and(|b| b.upper.is_some()) {
            return Err(parse_error(
                "the final paye band must have no upper bound".to_string(),
            ));
        }

        if statutory.lst.bands.is_empty() {
            return Err(parse_error("lst.bands must not be empty".to_string()));
        }
        for pair in statutory.lst.bands.windows(2) {
            if pair[0].upper != Some(pair[1].lower) {
                return Err(parse_error(format!(
                    "lst.bands must be contiguous: band ending at {:?} is followed by band starting at {}",
                    pair[0].upper, pair[1].lower
                )));
            }
        }

        if !(1..=12).contains(&statutory.fiscal_year_start_month) {
            return Err(parse_error(format!(
                "fiscal_year_start_month must be 1-12, got {}",
                statutory.fiscal_year_start_month
            )));
        }

        Ok(())
    }

    /// Returns the loaded payroll configuration.
    pub fn config(&self) -> &PayrollConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_directory_returns_config_not_found() {
        let result = ConfigLoader::load("/nonexistent/config/dir");
        match result {
            Err(PayrollError::ConfigNotFound { path }) => {
                assert!(path.contains("statutory.yaml"));
            }
            other => panic!("Expected ConfigNotFound, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_load_shipped_uganda_config() {
        let loader = ConfigLoader::load("./config/uganda").expect("shipped config should load");
        let config = loader.config();
        assert_eq!(config.statutory().paye.bands.len(), 5);
        assert_eq!(config.statutory().lst.bands.len(), 6);
        assert_eq!(config.statutory().fiscal_year_start_month, 7);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let loader = ConfigLoader::load("./config/uganda").expect("shipped config should load");
        let loaded = loader.config();
        let defaults = PayrollConfig::uganda_defaults();

        assert_eq!(
            loaded.statutory().nssf.monthly_cap,
            defaults.statutory().nssf.monthly_cap
        );
        assert_eq!(
            loaded.policy().approvals.ceo_threshold_amount,
            defaults.policy().approvals.ceo_threshold_amount
        );
        for (a, b) in loaded
            .statutory()
            .paye
            .bands
            .iter()
            .zip(defaults.statutory().paye.bands.iter())
        {
            assert_eq!(a.lower, b.lower);
            assert_eq!(a.upper, b.upper);
            assert_eq!(a.rate, b.rate);
        }
    }
}
