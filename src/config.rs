// Fri Oct 16 2026 - Alex

use crate::resolution::DEFAULT_SAMPLE_LIMIT;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub run_resolution: bool,
    pub run_layout: bool,
    pub enable_progress_bars: bool,
    pub verbosity: u8,
    pub diagnostic_sample_limit: usize,
    pub log_file: Option<PathBuf>,
    pub print_layouts: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: None,
            output: None,
            run_resolution: true,
            run_layout: true,
            enable_progress_bars: true,
            verbosity: 0,
            diagnostic_sample_limit: DEFAULT_SAMPLE_LIMIT,
            log_file: None,
            print_layouts: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn with_input(mut self, input: PathBuf) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    pub fn with_sample_limit(mut self, limit: usize) -> Self {
        self.diagnostic_sample_limit = limit;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_log_file(mut self, path: PathBuf) -> Self {
        self.log_file = Some(path);
        self
    }

    pub fn without_resolution(mut self) -> Self {
        self.run_resolution = false;
        self
    }

    pub fn without_layout(mut self) -> Self {
        self.run_layout = false;
        self
    }

    pub fn without_progress(mut self) -> Self {
        self.enable_progress_bars = false;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.is_none() {
            return Err(ConfigError::Invalid("an input database must be set".to_string()));
        }
        if !self.run_resolution && !self.run_layout {
            return Err(ConfigError::Invalid(
                "at least one of resolution or layout must run".to_string(),
            ));
        }
        if self.input.is_some() && self.input == self.output {
            return Err(ConfigError::Invalid("output must differ from input".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate_once_input_set() {
        assert!(Config::new().validate().is_err());
        let config = Config::new().with_input(PathBuf::from("types.json"));
        assert!(config.validate().is_ok());
        assert_eq!(config.diagnostic_sample_limit, 25);
    }

    #[test]
    fn test_both_passes_disabled_is_invalid() {
        let config = Config::new()
            .with_input(PathBuf::from("types.json"))
            .without_resolution()
            .without_layout();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_output_over_input_rejected() {
        let config = Config::new()
            .with_input(PathBuf::from("db.json"))
            .with_output(PathBuf::from("db.json"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{ "run_layout": false, "verbosity": 2 }"#).unwrap();
        assert!(!config.run_layout);
        assert!(config.run_resolution);
        assert_eq!(config.verbosity, 2);
    }
}
