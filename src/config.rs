// src/config.rs
//! Runtime settings, investor assumptions, and the URL write mode.
//!
//! Settings come from the environment (after `dotenv`), assumptions from a
//! JSON file. Nothing here is mutated once loaded.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{AnalysisError, Result};
use crate::models::Scope;

/// Default directory holding the JSON stores, the ignore list and the error log.
pub const DEFAULT_OUTPUT_DIR: &str = "output";

/// Default location of the investor assumptions file.
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "config/assumptions.json";

/// How long binaries wait before exiting so the last message stays readable.
pub const DEFAULT_EXIT_DELAY_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub output_dir: PathBuf,
    pub property_facts_path: PathBuf,
    pub assumptions_path: PathBuf,
    /// Fixed annual rate that skips the online lookup when set.
    pub interest_rate: Option<f64>,
    pub exit_delay: Duration,
}

fn env_parsed<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("${} is not valid ('{}'), ignoring it", name, raw);
            None
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let output_dir = env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(|_| {
            info!("$OUTPUT_DIR not set, defaulting to '{}'", DEFAULT_OUTPUT_DIR);
            PathBuf::from(DEFAULT_OUTPUT_DIR)
        });
        let property_facts_path = env::var("PROPERTY_FACTS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| output_dir.join("property_facts.json"));
        let assumptions_path = env::var("ASSUMPTIONS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ASSUMPTIONS_PATH));
        let exit_delay_ms = env_parsed::<u64>("EXIT_DELAY_MS").unwrap_or(DEFAULT_EXIT_DELAY_MS);

        Settings {
            output_dir,
            property_facts_path,
            assumptions_path,
            interest_rate: env_parsed::<f64>("INTEREST_RATE"),
            exit_delay: Duration::from_millis(exit_delay_ms),
        }
    }

    /// Settings rooted at `output_dir` with every other value defaulted.
    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Settings {
            property_facts_path: output_dir.join("property_facts.json"),
            output_dir,
            assumptions_path: PathBuf::from(DEFAULT_ASSUMPTIONS_PATH),
            interest_rate: None,
            exit_delay: Duration::from_millis(DEFAULT_EXIT_DELAY_MS),
        }
    }

    pub fn urls_path(&self) -> PathBuf {
        self.output_dir.join("urls.json")
    }

    pub fn analysis_path(&self) -> PathBuf {
        self.output_dir.join("analysis.json")
    }

    pub fn ignored_urls_path(&self) -> PathBuf {
        self.output_dir.join("ignored_urls.txt")
    }

    pub fn errors_log_path(&self) -> PathBuf {
        self.output_dir.join("errors.log")
    }
}

/// The investor's financing and operating assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAssumptions {
    pub down_payment_fraction: f64,
    pub fix_up_cost: f64,
    pub closing_cost_fraction: f64,
    pub loan_years: u32,
    pub vacancy_fraction: f64,
    pub maintenance_fraction: f64,
    pub management_fraction: f64,
    pub tax_bracket: f64,
    pub depreciation_short_fraction: f64,
    pub depreciation_long_fraction: f64,
    pub first_rental: bool,
}

impl Default for UserAssumptions {
    fn default() -> Self {
        UserAssumptions {
            down_payment_fraction: 0.25,
            fix_up_cost: 0.0,
            closing_cost_fraction: 0.03,
            loan_years: 30,
            vacancy_fraction: 0.08,
            maintenance_fraction: 0.10,
            management_fraction: 0.10,
            tax_bracket: 0.22,
            depreciation_short_fraction: 0.20,
            depreciation_long_fraction: 0.60,
            first_rental: true,
        }
    }
}

impl UserAssumptions {
    /// Reads assumptions from `path`. A missing file yields the defaults; a
    /// malformed one is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("No assumptions file at {}, using defaults", path.display());
                return Ok(UserAssumptions::default());
            }
            Err(e) => return Err(AnalysisError::io(path, e)),
        };

        serde_json::from_str(&text).map_err(|e| AnalysisError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// What the operator asked the wizard to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Append,
    Overwrite,
    Delete,
}

/// Write mode handed to the URL store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    pub overwrite: bool,
    pub search: bool,
    pub delete: bool,
}

impl StoreConfig {
    pub fn new(scope: Scope, action: Action) -> Self {
        StoreConfig {
            overwrite: action == Action::Overwrite,
            search: scope == Scope::Search,
            delete: action == Action::Delete,
        }
    }

    pub fn scope(&self) -> Scope {
        if self.search {
            Scope::Search
        } else {
            Scope::Property
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_config_flags() {
        assert_eq!(
            StoreConfig::new(Scope::Property, Action::Append),
            StoreConfig { overwrite: false, search: false, delete: false }
        );
        assert_eq!(
            StoreConfig::new(Scope::Search, Action::Overwrite),
            StoreConfig { overwrite: true, search: true, delete: false }
        );
        assert_eq!(
            StoreConfig::new(Scope::Property, Action::Delete),
            StoreConfig { overwrite: false, search: false, delete: true }
        );
        assert_eq!(StoreConfig::new(Scope::Search, Action::Delete).scope(), Scope::Search);
    }

    #[test]
    fn assumptions_fill_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assumptions.json");
        fs::write(&path, r#"{ "down_payment_fraction": 0.2, "first_rental": false }"#).unwrap();

        let loaded = UserAssumptions::load(&path).unwrap();
        assert_eq!(loaded.down_payment_fraction, 0.2);
        assert!(!loaded.first_rental);
        assert_eq!(loaded.loan_years, 30);
    }

    #[test]
    fn missing_assumptions_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = UserAssumptions::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(loaded, UserAssumptions::default());
    }

    #[test]
    fn malformed_assumptions_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assumptions.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(UserAssumptions::load(&path), Err(AnalysisError::Config { .. })));
    }

    #[test]
    fn store_paths_live_under_output_dir() {
        let settings = Settings::with_output_dir("/tmp/out");
        assert_eq!(settings.urls_path(), PathBuf::from("/tmp/out/urls.json"));
        assert_eq!(settings.analysis_path(), PathBuf::from("/tmp/out/analysis.json"));
        assert_eq!(settings.ignored_urls_path(), PathBuf::from("/tmp/out/ignored_urls.txt"));
        assert_eq!(settings.errors_log_path(), PathBuf::from("/tmp/out/errors.log"));
    }
}
