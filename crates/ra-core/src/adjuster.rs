//! Threshold-based probability adjustment.
//!
//! The adjuster biases a classifier's probability distribution toward the
//! class that a configured risk band favors:
//!
//! 1. Find the threshold rule owning the (clamped) risk score.
//! 2. Multiply the probability of the rule's target label by its boost factor.
//! 3. Renormalize so the distribution sums to 1.0.
//! 4. Pick the most probable class, lowest index first on ties.
//!
//! The confidence reported is the renormalized probability of that class.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::error::{AdjustResult, InvalidInputError};
use crate::labels::LabelMapping;
use crate::probability::{argmax, normalize, validate_probabilities};
use crate::thresholds::{clamp_risk, prediction_thresholds, ThresholdTable};

/// Outcome of a single adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    /// Predicted label after adjustment.
    pub label: String,
    /// Class index of the predicted label.
    pub class_index: usize,
    /// Adjusted probability of the predicted label.
    pub confidence: f64,
    /// Full adjusted distribution, in class-index order.
    pub adjusted: Vec<f64>,
    /// Class index the raw probabilities would have picked.
    pub raw_index: usize,
    /// Risk score after clamping into `[0.0, 1.0]`.
    pub risk_score: f64,
    /// Name of the threshold rule that owned the risk score.
    pub rule: String,
    /// Label that was boosted, if a boost was applied.
    pub boosted_label: Option<String>,
}

impl Adjustment {
    /// Consumes the adjustment, returning `(label, confidence)`.
    pub fn into_prediction(self) -> (String, f64) {
        (self.label, self.confidence)
    }

    /// Returns true if the boost changed the predicted class.
    pub fn decision_changed(&self) -> bool {
        self.class_index != self.raw_index
    }

    /// Returns true if a boost factor was applied to some class.
    pub fn boosted(&self) -> bool {
        self.boosted_label.is_some()
    }
}

/// Applies a threshold table to classifier output.
///
/// Cheap to clone; the table is shared.
#[derive(Debug, Clone)]
pub struct ThresholdAdjuster {
    table: Arc<ThresholdTable>,
}

impl Default for ThresholdAdjuster {
    fn default() -> Self {
        Self::global()
    }
}

impl ThresholdAdjuster {
    /// Creates an adjuster owning the given table.
    pub fn new(table: ThresholdTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Creates an adjuster sharing an existing table.
    pub fn from_shared(table: Arc<ThresholdTable>) -> Self {
        Self { table }
    }

    /// Creates an adjuster backed by the process-wide prediction thresholds.
    pub fn global() -> Self {
        Self::from_shared(Arc::clone(prediction_thresholds()))
    }

    /// Returns the threshold table in use.
    pub fn table(&self) -> &ThresholdTable {
        &self.table
    }

    /// Adjusts a probability vector using the risk score.
    pub fn adjust(
        &self,
        probabilities: &[f64],
        mapping: &LabelMapping,
        risk_score: f64,
    ) -> AdjustResult<Adjustment> {
        if risk_score.is_nan() {
            return Err(InvalidInputError::NonFiniteRisk(risk_score));
        }
        validate_probabilities(probabilities, mapping)?;

        let risk_score = clamp_risk(risk_score);
        let rule = self.table.rule_for(risk_score);

        let mut adjusted = probabilities.to_vec();
        let mut boosted_label = None;

        if let Some(target) = rule.effective_target() {
            match mapping.index_of(target) {
                Some(index) => {
                    adjusted[index] *= rule.boost_factor;
                    boosted_label = Some(target.to_string());
                }
                None => {
                    debug!(
                        rule = %rule.name,
                        target_label = target,
                        "Boost target not present in label mapping, skipping boost"
                    );
                }
            }
        }

        normalize(&mut adjusted);

        // Non-empty: validation guarantees one probability per label.
        let raw_index = argmax(probabilities).unwrap_or(0);
        let class_index = argmax(&adjusted).unwrap_or(0);
        let confidence = adjusted[class_index];
        let label = mapping.label(class_index).unwrap_or_default().to_string();

        debug!(
            risk_score,
            rule = %rule.name,
            label = %label,
            confidence,
            changed = class_index != raw_index,
            "Adjusted prediction"
        );

        Ok(Adjustment {
            label,
            class_index,
            confidence,
            adjusted,
            raw_index,
            risk_score,
            rule: rule.name.clone(),
            boosted_label,
        })
    }

    /// Adjusts many rows that share one label mapping.
    ///
    /// Stops at the first invalid row and reports its index.
    pub fn adjust_batch<P: AsRef<[f64]>>(
        &self,
        rows: &[P],
        mapping: &LabelMapping,
        risk_scores: &[f64],
    ) -> AdjustResult<Vec<Adjustment>> {
        if rows.len() != risk_scores.len() {
            return Err(InvalidInputError::BatchLengthMismatch {
                rows: rows.len(),
                risk_scores: risk_scores.len(),
            });
        }

        rows.iter()
            .zip(risk_scores)
            .enumerate()
            .map(|(index, (row, &risk))| {
                self.adjust(row.as_ref(), mapping, risk)
                    .map_err(|e| e.in_row(index))
            })
            .collect()
    }
}

/// Adjusts a probability vector with the process-wide prediction thresholds,
/// returning `(label, confidence)`.
pub fn adjust(
    probabilities: &[f64],
    mapping: &LabelMapping,
    risk_score: f64,
) -> AdjustResult<(String, f64)> {
    ThresholdAdjuster::global()
        .adjust(probabilities, mapping, risk_score)
        .map(Adjustment::into_prediction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thresholds::{ThresholdRule, MAX_BOOST_FACTOR};

    fn severity_labels() -> LabelMapping {
        LabelMapping::new(["Low", "High", "Severe"]).unwrap()
    }

    fn default_adjuster() -> ThresholdAdjuster {
        ThresholdAdjuster::new(ThresholdTable::default())
    }

    #[test]
    fn test_low_risk_favors_low() {
        let result = default_adjuster()
            .adjust(&[0.25, 0.5, 0.25], &severity_labels(), 0.2)
            .unwrap();

        assert_eq!(result.label, "Low");
        assert_eq!(result.class_index, 0);
        assert!(result.confidence > 0.25);
        assert!(result.decision_changed());
        assert_eq!(result.boosted_label.as_deref(), Some("Low"));
        assert_eq!(result.rule, "low_risk");
    }

    #[test]
    fn test_high_risk_favors_severe() {
        let result = default_adjuster()
            .adjust(&[0.25, 0.5, 0.25], &severity_labels(), 0.9)
            .unwrap();

        assert_eq!(result.label, "Severe");
        assert!(result.confidence > 0.25);
        assert!(result.decision_changed());
    }

    #[test]
    fn test_moderate_risk_leaves_distribution_unchanged() {
        let result = default_adjuster()
            .adjust(&[0.1, 0.1, 0.8], &severity_labels(), 0.5)
            .unwrap();

        assert_eq!(result.label, "Severe");
        assert!((result.confidence - 0.8).abs() < 1e-9);
        assert!(!result.boosted());
        assert!(!result.decision_changed());
    }

    #[test]
    fn test_adjusted_distribution_is_normalized() {
        let result = default_adjuster()
            .adjust(&[0.25, 0.5, 0.25], &severity_labels(), 0.1)
            .unwrap();

        let sum: f64 = result.adjusted.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9);

        let max = result.adjusted.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(result.confidence, max);

        // 0.25 * 2.5 = 0.625, total 1.375
        assert!((result.confidence - 0.625 / 1.375).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_class_still_boosted() {
        let result = default_adjuster()
            .adjust(&[0.95, 0.03, 0.02], &severity_labels(), 0.0)
            .unwrap();

        assert_eq!(result.label, "Low");
        assert!(result.confidence > 0.95);
        assert!(result.confidence < 1.0);
    }

    #[test]
    fn test_tie_breaks_to_lowest_index() {
        let third = 1.0 / 3.0;
        let result = default_adjuster()
            .adjust(&[third, third, third], &severity_labels(), 0.5)
            .unwrap();

        assert_eq!(result.label, "Low");
        assert_eq!(result.class_index, 0);
    }

    #[test]
    fn test_out_of_range_risk_is_clamped() {
        let adjuster = default_adjuster();
        let labels = severity_labels();
        let probs = [0.25, 0.5, 0.25];

        let below = adjuster.adjust(&probs, &labels, -0.5).unwrap();
        let zero = adjuster.adjust(&probs, &labels, 0.0).unwrap();
        assert_eq!(below.into_prediction(), zero.into_prediction());

        let above = adjuster.adjust(&probs, &labels, 1.5).unwrap();
        let one = adjuster.adjust(&probs, &labels, 1.0).unwrap();
        assert_eq!(above.risk_score, 1.0);
        assert_eq!(above.into_prediction(), one.into_prediction());
    }

    #[test]
    fn test_nan_risk_rejected() {
        let result = default_adjuster().adjust(&[0.25, 0.5, 0.25], &severity_labels(), f64::NAN);
        assert!(matches!(result, Err(InvalidInputError::NonFiniteRisk(_))));
    }

    #[test]
    fn test_invalid_probabilities_rejected() {
        let labels = LabelMapping::new(["Low", "Severe"]).unwrap();
        let result = default_adjuster().adjust(&[0.5, 0.6], &labels, 0.5);
        assert!(matches!(
            result,
            Err(InvalidInputError::SumOutOfTolerance { .. })
        ));
    }

    #[test]
    fn test_missing_target_label_skips_boost() {
        let labels = LabelMapping::new(["Minor", "Major"]).unwrap();
        let result = default_adjuster().adjust(&[0.4, 0.6], &labels, 0.1).unwrap();

        assert_eq!(result.label, "Major");
        assert!((result.confidence - 0.6).abs() < 1e-9);
        assert!(!result.boosted());
    }

    #[test]
    fn test_custom_table() {
        let table = ThresholdTable::new(vec![
            ThresholdRule::boost("calm", 0.0, 0.5, "High", 1.5),
            ThresholdRule::boost("alarm", 0.5, 1.0, "Severe", 10.0),
        ])
        .unwrap();
        let adjuster = ThresholdAdjuster::new(table);

        let result = adjuster
            .adjust(&[0.6, 0.3, 0.1], &severity_labels(), 0.5)
            .unwrap();
        assert_eq!(result.rule, "alarm");
        assert_eq!(result.label, "Severe");
    }

    #[test]
    fn test_largest_boost_stays_normalized() {
        let table = ThresholdTable::new(vec![ThresholdRule::boost(
            "extreme",
            0.0,
            1.0,
            "A",
            MAX_BOOST_FACTOR,
        )])
        .unwrap();
        let labels = LabelMapping::new(["A", "B"]).unwrap();

        // Sum is 1.0005, inside the tolerance
        let result = ThresholdAdjuster::new(table)
            .adjust(&[1.0005, 0.0], &labels, 0.5)
            .unwrap();
        assert_eq!(result.label, "A");
        assert!(result.adjusted.iter().all(|p| p.is_finite()));
        assert!((result.confidence - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_deterministic() {
        let adjuster = default_adjuster();
        let labels = severity_labels();
        let first = adjuster.adjust(&[0.3, 0.3, 0.4], &labels, 0.8).unwrap();
        let second = adjuster.adjust(&[0.3, 0.3, 0.4], &labels, 0.8).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_adjust_batch() {
        let rows = vec![vec![0.25, 0.5, 0.25], vec![0.25, 0.5, 0.25]];
        let results = default_adjuster()
            .adjust_batch(&rows, &severity_labels(), &[0.2, 0.9])
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].label, "Low");
        assert_eq!(results[1].label, "Severe");
    }

    #[test]
    fn test_adjust_batch_reports_failing_row() {
        let rows = vec![vec![0.25, 0.5, 0.25], vec![0.5, 0.6, 0.1]];
        let result = default_adjuster().adjust_batch(&rows, &severity_labels(), &[0.2, 0.9]);

        match result {
            Err(InvalidInputError::Row { index, source }) => {
                assert_eq!(index, 1);
                assert!(matches!(
                    *source,
                    InvalidInputError::SumOutOfTolerance { .. }
                ));
            }
            other => panic!("Expected row error, got {:?}", other),
        }
    }

    #[test]
    fn test_adjust_batch_length_mismatch() {
        let rows = vec![vec![0.25, 0.5, 0.25]];
        let result = default_adjuster().adjust_batch(&rows, &severity_labels(), &[0.2, 0.9]);
        assert_eq!(
            result,
            Err(InvalidInputError::BatchLengthMismatch {
                rows: 1,
                risk_scores: 2
            })
        );
    }
}
