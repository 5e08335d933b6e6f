//! Probability vector validation and helpers.

use crate::error::{AdjustResult, InvalidInputError};
use crate::labels::LabelMapping;

/// Allowed deviation of a probability vector's sum from 1.0.
pub const SUM_TOLERANCE: f64 = 1e-3;

/// Validates a raw probability vector against the label mapping it belongs to.
pub fn validate_probabilities(probabilities: &[f64], mapping: &LabelMapping) -> AdjustResult<()> {
    if probabilities.len() != mapping.len() {
        return Err(InvalidInputError::LengthMismatch {
            probabilities: probabilities.len(),
            labels: mapping.len(),
        });
    }

    for (index, &value) in probabilities.iter().enumerate() {
        if !value.is_finite() {
            return Err(InvalidInputError::NonFiniteProbability { index, value });
        }
        if value < 0.0 {
            return Err(InvalidInputError::NegativeProbability { index, value });
        }
    }

    let sum: f64 = probabilities.iter().sum();
    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(InvalidInputError::SumOutOfTolerance {
            sum,
            tolerance: SUM_TOLERANCE,
        });
    }

    Ok(())
}

/// Scales the values in place so they sum to 1.0.
///
/// Leaves the values untouched if their total is not positive.
pub fn normalize(values: &mut [f64]) {
    let total: f64 = values.iter().sum();
    if total > 0.0 {
        for v in values.iter_mut() {
            *v /= total;
        }
    }
}

/// Returns the index of the largest value, preferring the lowest index on ties.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, current)) if v <= current => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
