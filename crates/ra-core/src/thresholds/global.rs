//! Process-wide prediction thresholds.

use std::sync::{Arc, OnceLock};
use tracing::info;

use super::ThresholdTable;

/// The threshold table shared by every adjustment in this process.
///
/// Set at most once, either explicitly through
/// [`install_prediction_thresholds`] or lazily with the built-in defaults on
/// first read. Never mutated afterwards.
pub static PREDICTION_THRESHOLDS: OnceLock<Arc<ThresholdTable>> = OnceLock::new();

/// Returns the active prediction thresholds.
pub fn prediction_thresholds() -> &'static Arc<ThresholdTable> {
    PREDICTION_THRESHOLDS.get_or_init(|| Arc::new(ThresholdTable::default()))
}

/// Installs the prediction thresholds for this process.
///
/// Must be called during start-up, before the first adjustment. Returns the
/// table back if thresholds are already active.
pub fn install_prediction_thresholds(table: ThresholdTable) -> Result<(), ThresholdTable> {
    let rules = table.rules().len();
    PREDICTION_THRESHOLDS
        .set(Arc::new(table))
        .map_err(Arc::unwrap_or_clone)?;
    info!(rules, "Installed prediction thresholds");
    Ok(())
}
