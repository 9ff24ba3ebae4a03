use std::env;
use std::path::PathBuf;

use thiserror::Error;

use crate::engine::{AnomalyPolicy, DEFAULT_TOLERANCE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}

/// Batch configuration, loaded from the environment. Every knob has a
/// default matching the original report layout.
#[derive(Debug, Clone)]
pub struct Config {
    /// Absolute tolerance around 100.0 for the split-sum check.
    pub tolerance_percent: f64,
    /// Destination of the invalid-splits spreadsheet.
    pub invalid_report_path: PathBuf,
    /// Destinations of the allocation report; extension picks the renderer.
    pub allocation_report_paths: Vec<PathBuf>,
    /// How allocation treats groups that fail the split-sum check.
    pub anomaly_policy: AnomalyPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tolerance_percent: DEFAULT_TOLERANCE,
            invalid_report_path: PathBuf::from("invalid_data.xlsx"),
            allocation_report_paths: vec![
                PathBuf::from("allocated_calc.xlsx"),
                PathBuf::from("allocated_calc.json"),
            ],
            anomaly_policy: AnomalyPolicy::default(),
        }
    }
}

impl Config {
    /// Read configuration from the environment. Unset variables fall back to
    /// defaults; set but unparseable values are errors, so a typo cannot
    /// silently change the tolerance or the anomaly policy.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let tolerance_percent = match env::var("TOLERANCE_PERCENT") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "TOLERANCE_PERCENT",
                    value: raw.clone(),
                })?,
            Err(_) => defaults.tolerance_percent,
        };

        let anomaly_policy = match env::var("ANOMALY_POLICY") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "ANOMALY_POLICY",
                value: raw.clone(),
            })?,
            Err(_) => defaults.anomaly_policy,
        };

        let invalid_report_path = env::var("INVALID_REPORT_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.invalid_report_path);

        let allocation_report_paths = match env::var("ALLOCATION_REPORT_PATHS") {
            Ok(raw) => {
                let paths: Vec<PathBuf> = raw
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(PathBuf::from)
                    .collect();
                if paths.is_empty() {
                    return Err(ConfigError::InvalidValue {
                        var: "ALLOCATION_REPORT_PATHS",
                        value: raw,
                    });
                }
                paths
            }
            Err(_) => defaults.allocation_report_paths,
        };

        Ok(Config {
            tolerance_percent,
            invalid_report_path,
            allocation_report_paths,
            anomaly_policy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_matches_original_reports() {
        let config = Config::default();

        assert_eq!(config.tolerance_percent, 1e-6);
        assert_eq!(config.invalid_report_path, PathBuf::from("invalid_data.xlsx"));
        assert_eq!(
            config.allocation_report_paths,
            vec![
                PathBuf::from("allocated_calc.xlsx"),
                PathBuf::from("allocated_calc.json"),
            ]
        );
        assert_eq!(config.anomaly_policy, AnomalyPolicy::Proceed);
    }
}
