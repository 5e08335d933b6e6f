//! # ra-core
//!
//! Risk-aware adjustment of multi-class classifier output.
//!
//! Given the raw class probabilities from an upstream model, a dense
//! index-to-label mapping and an independent risk score, the
//! [`ThresholdAdjuster`] boosts the class favored by the configured risk band,
//! renormalizes, and returns the winning label with its adjusted confidence.
//!
//! ## Usage
//!
//! ```rust
//! use ra_core::{adjust, LabelMapping};
//!
//! let labels = LabelMapping::new(["Low", "High", "Severe"]).unwrap();
//! let (label, confidence) = adjust(&[0.25, 0.5, 0.25], &labels, 0.9).unwrap();
//!
//! assert_eq!(label, "Severe");
//! assert!(confidence > 0.25);
//! ```

pub mod adjuster;
pub mod error;
pub mod labels;
pub mod probability;
pub mod thresholds;

pub use adjuster::{adjust, Adjustment, ThresholdAdjuster};
pub use error::{AdjustResult, ConfigError, InvalidInputError};
pub use labels::LabelMapping;
pub use probability::SUM_TOLERANCE;
pub use thresholds::{
    install_prediction_thresholds, load_thresholds, prediction_thresholds, ThresholdRule,
    ThresholdTable, PREDICTION_THRESHOLDS,
};
