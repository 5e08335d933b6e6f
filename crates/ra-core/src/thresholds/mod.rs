//! Risk-range threshold rules.
//!
//! A [`ThresholdTable`] partitions the risk domain `[0.0, 1.0]` into
//! contiguous, non-overlapping ranges. Each range is owned by one
//! [`ThresholdRule`] naming the class label to boost and the multiplicative
//! boost factor. Ranges are half-open `[min_risk, max_risk)`, so a score
//! sitting exactly on a boundary belongs to the higher-risk rule; the last
//! rule additionally owns `1.0`.

mod config;
mod global;

pub use config::{load_thresholds, parse_thresholds, ThresholdRuleConfig, ThresholdsConfig};
pub use global::{install_prediction_thresholds, prediction_thresholds, PREDICTION_THRESHOLDS};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::labels::LabelMapping;

/// Maximum gap or overlap tolerated between consecutive ranges.
const RANGE_EPSILON: f64 = 1e-9;

/// Smallest accepted boost factor.
pub const MIN_BOOST_FACTOR: f64 = 1e-6;

/// Largest accepted boost factor. Keeps boosted probabilities finite.
pub const MAX_BOOST_FACTOR: f64 = 1e6;

/// A single risk-range rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    /// Unique name for this rule.
    pub name: String,
    /// Inclusive lower bound of the risk range.
    pub min_risk: f64,
    /// Exclusive upper bound of the risk range (inclusive for the last rule).
    pub max_risk: f64,
    /// Label whose probability is boosted; `None` for a no-boost band.
    pub target_label: Option<String>,
    /// Multiplicative weight applied to the target probability.
    pub boost_factor: f64,
}

impl ThresholdRule {
    /// Creates a rule that boosts `target_label` by `boost_factor`.
    pub fn boost(
        name: &str,
        min_risk: f64,
        max_risk: f64,
        target_label: &str,
        boost_factor: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            min_risk,
            max_risk,
            target_label: Some(target_label.to_string()),
            boost_factor,
        }
    }

    /// Creates a rule that leaves probabilities unchanged.
    pub fn neutral(name: &str, min_risk: f64, max_risk: f64) -> Self {
        Self {
            name: name.to_string(),
            min_risk,
            max_risk,
            target_label: None,
            boost_factor: 1.0,
        }
    }

    /// Returns the target label if this rule changes any probability.
    pub fn effective_target(&self) -> Option<&str> {
        match &self.target_label {
            Some(label) if self.boost_factor != 1.0 => Some(label.as_str()),
            _ => None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::MissingField(
                "prediction_thresholds[].name".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.min_risk) || !(0.0..=1.0).contains(&self.max_risk) {
            return Err(ConfigError::InvalidValue(format!(
                "rule '{}': risk range [{}, {}) must lie within [0.0, 1.0]",
                self.name, self.min_risk, self.max_risk
            )));
        }
        if self.min_risk >= self.max_risk {
            return Err(ConfigError::InvalidValue(format!(
                "rule '{}': min_risk {} must be below max_risk {}",
                self.name, self.min_risk, self.max_risk
            )));
        }
        if !(MIN_BOOST_FACTOR..=MAX_BOOST_FACTOR).contains(&self.boost_factor) {
            return Err(ConfigError::InvalidValue(format!(
                "rule '{}': boost_factor must lie within [{}, {}], got {}",
                self.name, MIN_BOOST_FACTOR, MAX_BOOST_FACTOR, self.boost_factor
            )));
        }
        if let Some(label) = &self.target_label {
            if label.trim().is_empty() {
                return Err(ConfigError::InvalidValue(format!(
                    "rule '{}': target_label must not be blank",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

/// Validated, ordered set of threshold rules covering `[0.0, 1.0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable {
    rules: Vec<ThresholdRule>,
}

impl ThresholdTable {
    /// Builds a table from rules ordered by increasing risk.
    pub fn new(rules: Vec<ThresholdRule>) -> Result<Self, ConfigError> {
        let first = rules
            .first()
            .ok_or_else(|| ConfigError::MissingField("prediction_thresholds".to_string()))?;
        if first.min_risk.abs() > RANGE_EPSILON {
            return Err(ConfigError::InvalidValue(format!(
                "first rule '{}' must start at 0.0, starts at {}",
                first.name, first.min_risk
            )));
        }

        for rule in &rules {
            rule.validate()?;
        }

        for pair in rules.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let delta = next.min_risk - prev.max_risk;
            if delta > RANGE_EPSILON {
                return Err(ConfigError::InvalidValue(format!(
                    "gap between rule '{}' (ends at {}) and rule '{}' (starts at {})",
                    prev.name, prev.max_risk, next.name, next.min_risk
                )));
            }
            if delta < -RANGE_EPSILON {
                return Err(ConfigError::InvalidValue(format!(
                    "rule '{}' (ends at {}) overlaps rule '{}' (starts at {})",
                    prev.name, prev.max_risk, next.name, next.min_risk
                )));
            }
        }

        if let Some(last) = rules.last() {
            if (last.max_risk - 1.0).abs() > RANGE_EPSILON {
                return Err(ConfigError::InvalidValue(format!(
                    "last rule '{}' must end at 1.0, ends at {}",
                    last.name, last.max_risk
                )));
            }
        }

        Ok(Self { rules })
    }

    /// Returns the rules in increasing risk order.
    pub fn rules(&self) -> &[ThresholdRule] {
        &self.rules
    }

    /// Returns the rule owning `risk_score` after clamping it into `[0.0, 1.0]`.
    ///
    /// NaN is treated as `0.0`; callers that must reject NaN do so first.
    pub fn rule_for(&self, risk_score: f64) -> &ThresholdRule {
        let risk = clamp_risk(risk_score);
        // Ranges start at 0.0 and are contiguous, so the last rule starting at
        // or below the score owns it. Boundaries go to the upper rule.
        self.rules
            .iter()
            .rev()
            .find(|rule| risk >= rule.min_risk)
            .unwrap_or(&self.rules[0])
    }

    /// Returns target labels that the mapping does not contain.
    pub fn missing_labels(&self, mapping: &LabelMapping) -> Vec<&str> {
        self.rules
            .iter()
            .filter_map(|rule| rule.target_label.as_deref())
            .filter(|label| mapping.index_of(label).is_none())
            .collect()
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self {
            rules: vec![
                ThresholdRule::boost("low_risk", 0.0, 0.35, "Low", 2.5),
                ThresholdRule::neutral("moderate_risk", 0.35, 0.65),
                ThresholdRule::boost("high_risk", 0.65, 1.0, "Severe", 2.5),
            ],
        }
    }
}

/// Clamps a risk score into `[0.0, 1.0]`, mapping NaN to `0.0`.
pub fn clamp_risk(risk_score: f64) -> f64 {
    if risk_score.is_nan() {
        0.0
    } else {
        risk_score.clamp(0.0, 1.0)
    }
}
