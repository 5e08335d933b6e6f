//! YAML configuration loader for prediction thresholds.
//!
//! This module handles loading and parsing a thresholds file into a validated
//! [`ThresholdTable`]. The expected document shape is:
//!
//! ```yaml
//! prediction_thresholds:
//!   - name: low_risk
//!     min_risk: 0.0
//!     max_risk: 0.35
//!     target_label: Low
//!     boost_factor: 2.5
//!   - name: moderate_risk
//!     min_risk: 0.35
//!     max_risk: 0.65
//!   - name: high_risk
//!     min_risk: 0.65
//!     max_risk: 1.0
//!     target_label: Severe
//!     boost_factor: ${HIGH_RISK_BOOST}
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use super::{ThresholdRule, ThresholdTable};
use crate::error::ConfigError;

/// Top-level thresholds configuration matching the YAML schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    /// Rules ordered by increasing risk.
    pub prediction_thresholds: Vec<ThresholdRuleConfig>,
}

/// A single rule as written in YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdRuleConfig {
    /// Rule name.
    pub name: String,
    /// Inclusive lower risk bound.
    pub min_risk: f64,
    /// Exclusive upper risk bound.
    pub max_risk: f64,
    /// Label to boost, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_label: Option<String>,
    /// Multiplicative boost factor.
    #[serde(default = "default_boost_factor")]
    pub boost_factor: f64,
}

fn default_boost_factor() -> f64 {
    1.0
}

impl From<ThresholdRuleConfig> for ThresholdRule {
    fn from(config: ThresholdRuleConfig) -> Self {
        ThresholdRule {
            name: config.name,
            min_risk: config.min_risk,
            max_risk: config.max_risk,
            target_label: config.target_label,
            boost_factor: config.boost_factor,
        }
    }
}

impl From<&ThresholdRule> for ThresholdRuleConfig {
    fn from(rule: &ThresholdRule) -> Self {
        ThresholdRuleConfig {
            name: rule.name.clone(),
            min_risk: rule.min_risk,
            max_risk: rule.max_risk,
            target_label: rule.target_label.clone(),
            boost_factor: rule.boost_factor,
        }
    }
}

impl ThresholdsConfig {
    /// Validates the rules and builds a threshold table.
    pub fn into_table(self) -> Result<ThresholdTable, ConfigError> {
        let rules = self
            .prediction_thresholds
            .into_iter()
            .map(ThresholdRule::from)
            .collect();
        ThresholdTable::new(rules)
    }
}

impl From<&ThresholdTable> for ThresholdsConfig {
    fn from(table: &ThresholdTable) -> Self {
        ThresholdsConfig {
            prediction_thresholds: table.rules().iter().map(ThresholdRuleConfig::from).collect(),
        }
    }
}

fn env_var_pattern() -> &'static Regex {
    static INSTANCE: OnceLock<Regex> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    })
}

/// Substitutes environment variables in a string.
///
/// Replaces patterns like `${VAR_NAME}` with the corresponding environment variable value.
/// Comment lines are copied unchanged.
fn substitute_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());
    let mut missing = Vec::new();

    for line in input.split_inclusive('\n') {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            continue;
        }

        let mut last = 0;
        for cap in env_var_pattern().captures_iter(line) {
            let Some(full_match) = cap.get(0) else {
                continue;
            };
            let var_name = &cap[1];
            result.push_str(&line[last..full_match.start()]);

            match env::var(var_name) {
                Ok(value) => result.push_str(&value),
                Err(_) => missing.push(var_name.to_string()),
            }
            last = full_match.end();
        }
        result.push_str(&line[last..]);
    }

    if !missing.is_empty() {
        return Err(ConfigError::EnvVarNotFound(missing.join(", ")));
    }

    Ok(result)
}

/// Parses and validates a thresholds document held in memory.
pub fn parse_thresholds(content: &str) -> Result<ThresholdTable, ConfigError> {
    let content = substitute_env_vars(content)?;
    let config: ThresholdsConfig = serde_yaml::from_str(&content)?;
    config.into_table()
}

/// Loads and validates the prediction thresholds from a YAML file.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use ra_core::thresholds::load_thresholds;
///
/// let table = load_thresholds(Path::new("config/thresholds.yaml")).unwrap();
/// println!("{} rules", table.rules().len());
/// ```
pub fn load_thresholds(path: &Path) -> Result<ThresholdTable, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let table = parse_thresholds(&content)?;
    debug!(
        path = %path.display(),
        rules = table.rules().len(),
        "Loaded prediction thresholds"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_yaml() -> &'static str {
        r#"
prediction_thresholds:
  - name: low_risk
    min_risk: 0.0
    max_risk: 0.3
    target_label: Low
    boost_factor: 3.0
  - name: moderate_risk
    min_risk: 0.3
    max_risk: 0.7
  - name: high_risk
    min_risk: 0.7
    max_risk: 1.0
    target_label: Severe
    boost_factor: 2.0
"#
    }

    #[test]
    fn test_load_valid_config() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(create_valid_yaml().as_bytes()).unwrap();

        let table = load_thresholds(file.path()).unwrap();
        let rules = table.rules();

        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].name, "low_risk");
        assert_eq!(rules[0].target_label.as_deref(), Some("Low"));
        assert_eq!(rules[0].boost_factor, 3.0);

        // Omitted fields fall back to a no-boost band
        assert_eq!(rules[1].target_label, None);
        assert_eq!(rules[1].boost_factor, 1.0);

        assert_eq!(rules[2].max_risk, 1.0);
    }

    #[test]
    fn test_missing_file() {
        let result = load_thresholds(Path::new("/nonexistent/path/thresholds.yaml"));
        assert!(matches!(result.unwrap_err(), ConfigError::IoError(_)));
    }

    #[test]
    fn test_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"prediction_thresholds: [").unwrap();

        let result = load_thresholds(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::ParseError(_)));
    }

    #[test]
    fn test_invalid_partition() {
        let yaml = r#"
prediction_thresholds:
  - name: low_risk
    min_risk: 0.0
    max_risk: 0.3
    target_label: Low
    boost_factor: 2.0
  - name: high_risk
    min_risk: 0.5
    max_risk: 1.0
    target_label: Severe
    boost_factor: 2.0
"#;
        let result = parse_thresholds(yaml);
        assert!(matches!(result.unwrap_err(), ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_empty_rule_list() {
        let result = parse_thresholds("prediction_thresholds: []");
        assert!(matches!(result.unwrap_err(), ConfigError::MissingField(_)));
    }

    #[test]
    fn test_env_var_substitution() {
        env::set_var("RA_TEST_SEVERE_BOOST", "4.0");

        let yaml = r#"
prediction_thresholds:
  - name: everything
    min_risk: 0.0
    max_risk: 1.0
    target_label: Severe
    boost_factor: ${RA_TEST_SEVERE_BOOST}
"#;
        let table = parse_thresholds(yaml).unwrap();
        assert_eq!(table.rules()[0].boost_factor, 4.0);

        env::remove_var("RA_TEST_SEVERE_BOOST");
    }

    #[test]
    fn test_missing_env_var() {
        let yaml = r#"
prediction_thresholds:
  - name: everything
    min_risk: 0.0
    max_risk: 1.0
    boost_factor: ${RA_TEST_NONEXISTENT_BOOST_12345}
"#;
        let result = parse_thresholds(yaml);
        match result {
            Err(ConfigError::EnvVarNotFound(var)) => {
                assert!(var.contains("RA_TEST_NONEXISTENT_BOOST_12345"));
            }
            other => panic!("Expected EnvVarNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_comments_are_not_substituted() {
        let yaml = r#"
# Boost may come from ${RA_TEST_UNSET_IN_COMMENT_12345}
prediction_thresholds:
  - name: everything
    min_risk: 0.0
    max_risk: 1.0
    # target_label: ${RA_TEST_UNSET_IN_COMMENT_12345}
"#;
        let table = parse_thresholds(yaml).unwrap();
        assert_eq!(table.rules()[0].boost_factor, 1.0);
    }

    #[test]
    fn test_substitution_keeps_surrounding_text() {
        env::set_var("RA_TEST_RULE_SUFFIX", "band");

        let yaml = r#"
prediction_thresholds:
  - name: risk_${RA_TEST_RULE_SUFFIX}_all
    min_risk: 0.0
    max_risk: 1.0
"#;
        let table = parse_thresholds(yaml).unwrap();
        assert_eq!(table.rules()[0].name, "risk_band_all");

        env::remove_var("RA_TEST_RULE_SUFFIX");
    }

    #[test]
    fn test_default_table_renders_as_yaml() {
        let config = ThresholdsConfig::from(&ThresholdTable::default());
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("prediction_thresholds"));

        let reparsed = parse_thresholds(&yaml).unwrap();
        assert_eq!(reparsed, ThresholdTable::default());
    }

    #[test]
    fn test_load_shipped_thresholds_yaml() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/thresholds.yaml");
        let table = load_thresholds(&path).unwrap();
        assert_eq!(table, ThresholdTable::default());
    }
}
