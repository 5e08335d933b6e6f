//! Metrics collection for risk adjustment.
//!
//! Records adjustment outcomes through the `metrics` crate facade, so any
//! installed recorder (Prometheus exporter, test recorder) picks them up, and
//! keeps a small in-process summary for reporting.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use ra_core::{Adjustment, InvalidInputError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Snapshot of adjustments recorded so far.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdjustmentSummary {
    /// Total successful adjustments.
    pub total: u64,
    /// Adjustments where a boost was applied.
    pub boosted: u64,
    /// Adjustments where the boost changed the predicted label.
    pub decisions_changed: u64,
    /// Calls rejected as invalid input.
    pub invalid_inputs: u64,
    /// Predicted label counts.
    pub by_label: BTreeMap<String, u64>,
    /// Mean adjusted confidence, if any adjustment was recorded.
    pub mean_confidence: Option<f64>,
}

impl AdjustmentSummary {
    /// Fraction of adjustments whose decision was changed by the boost.
    pub fn change_rate(&self) -> f64 {
        if self.total > 0 {
            self.decisions_changed as f64 / self.total as f64
        } else {
            0.0
        }
    }
}

#[derive(Debug, Default)]
struct SummaryState {
    summary: AdjustmentSummary,
    confidence_sum: f64,
}

/// Metrics collector for adjustment outcomes.
#[derive(Debug, Clone)]
pub struct AdjustmentMetrics {
    state: Arc<RwLock<SummaryState>>,
}

impl AdjustmentMetrics {
    /// Creates a new metrics collector.
    pub fn new() -> Self {
        Self::register_metrics();

        Self {
            state: Arc::new(RwLock::new(SummaryState::default())),
        }
    }

    /// Registers metric descriptions.
    fn register_metrics() {
        describe_counter!(
            "ra_adjustments_total",
            "Total number of adjusted predictions, by predicted label"
        );
        describe_counter!(
            "ra_decisions_changed_total",
            "Adjustments where the risk boost changed the predicted label"
        );
        describe_counter!(
            "ra_invalid_inputs_total",
            "Adjustment calls rejected as invalid input"
        );
        describe_histogram!(
            "ra_adjusted_confidence",
            "Confidence of the predicted label after adjustment"
        );
    }

    /// Records a successful adjustment.
    pub fn record_adjustment(&self, adjustment: &Adjustment) {
        counter!("ra_adjustments_total", "label" => adjustment.label.clone(), "rule" => adjustment.rule.clone()).increment(1);
        histogram!("ra_adjusted_confidence").record(adjustment.confidence);
        if adjustment.decision_changed() {
            counter!("ra_decisions_changed_total", "rule" => adjustment.rule.clone()).increment(1);
        }

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.confidence_sum += adjustment.confidence;
        let summary = &mut state.summary;
        summary.total += 1;
        if adjustment.boosted() {
            summary.boosted += 1;
        }
        if adjustment.decision_changed() {
            summary.decisions_changed += 1;
        }
        *summary
            .by_label
            .entry(adjustment.label.clone())
            .or_default() += 1;
    }

    /// Records a rejected call.
    pub fn record_invalid_input(&self, error: &InvalidInputError) {
        counter!("ra_invalid_inputs_total", "kind" => error_kind(error)).increment(1);

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.summary.invalid_inputs += 1;
    }

    /// Records the outcome of an adjustment call.
    pub fn record_result(&self, result: &Result<Adjustment, InvalidInputError>) {
        match result {
            Ok(adjustment) => self.record_adjustment(adjustment),
            Err(error) => self.record_invalid_input(error),
        }
    }

    /// Returns a snapshot of what has been recorded.
    pub fn summary(&self) -> AdjustmentSummary {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        let mut summary = state.summary.clone();
        summary.mean_confidence = if summary.total > 0 {
            Some(state.confidence_sum / summary.total as f64)
        } else {
            None
        };
        summary
    }
}

impl Default for AdjustmentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable metric label for an input error.
fn error_kind(error: &InvalidInputError) -> &'static str {
    match error {
        InvalidInputError::EmptyMapping => "empty_mapping",
        InvalidInputError::LengthMismatch { .. } => "length_mismatch",
        InvalidInputError::NegativeProbability { .. } => "negative_probability",
        InvalidInputError::NonFiniteProbability { .. } => "non_finite_probability",
        InvalidInputError::SumOutOfTolerance { .. } => "sum_out_of_tolerance",
        InvalidInputError::NonDenseMapping { .. } => "non_dense_mapping",
        InvalidInputError::DuplicateIndex(_) => "duplicate_index",
        InvalidInputError::DuplicateLabel(_) => "duplicate_label",
        InvalidInputError::NonFiniteRisk(_) => "non_finite_risk",
        InvalidInputError::BatchLengthMismatch { .. } => "batch_length_mismatch",
        InvalidInputError::Row { source, .. } => error_kind(source),
    }
}
