//! Threshold configuration validation.
//!
//! Goes beyond the structural checks done at load time and flags rules that
//! are valid but probably not what the author intended.

use colored::Colorize;
use ra_core::{load_thresholds, LabelMapping, ThresholdTable};
use std::path::Path;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Errors that make the thresholds unusable.
    pub errors: Vec<String>,
    /// Warnings that should be addressed but don't prevent use.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a new empty validation result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an error to the result.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Adds a warning to the result.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Returns true if there are any errors.
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns true if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Prints the validation result to the console.
    pub fn print(&self) {
        if !self.warnings.is_empty() {
            println!();
            println!("{}", "Threshold Warnings:".yellow().bold());
            for warning in &self.warnings {
                println!("  {} {}", "⚠".yellow(), warning);
            }
        }

        if !self.errors.is_empty() {
            println!();
            println!("{}", "Threshold Errors:".red().bold());
            for error in &self.errors {
                println!("  {} {}", "✗".red(), error);
            }
        }

        if self.errors.is_empty() && self.warnings.is_empty() {
            println!("  {} Thresholds OK", "✓".green());
        }
    }
}

/// Validates threshold files against the labels they will be used with.
pub struct ThresholdsValidator;

impl ThresholdsValidator {
    /// Loads and validates a thresholds file.
    ///
    /// Returns the table alongside the findings when it loaded successfully.
    pub fn validate_file(
        path: &Path,
        mapping: &LabelMapping,
    ) -> (Option<ThresholdTable>, ValidationResult) {
        match load_thresholds(path) {
            Ok(table) => {
                let result = Self::validate_table(&table, mapping);
                (Some(table), result)
            }
            Err(e) => {
                let mut result = ValidationResult::new();
                result.add_error(format!("{}: {}", path.display(), e));
                (None, result)
            }
        }
    }

    /// Checks an already-structurally-valid table for suspicious rules.
    pub fn validate_table(table: &ThresholdTable, mapping: &LabelMapping) -> ValidationResult {
        let mut result = ValidationResult::new();

        for label in table.missing_labels(mapping) {
            result.add_warning(format!(
                "Target label '{}' is not one of the known labels ({}); its rules will not boost anything",
                label,
                mapping.labels().join(", ")
            ));
        }

        for rule in table.rules() {
            match &rule.target_label {
                Some(label) if rule.boost_factor == 1.0 => {
                    result.add_warning(format!(
                        "Rule '{}' targets '{}' with boost_factor 1.0, which has no effect",
                        rule.name, label
                    ));
                }
                Some(label) if rule.boost_factor < 1.0 => {
                    result.add_warning(format!(
                        "Rule '{}' has boost_factor {} below 1.0 and will suppress '{}'",
                        rule.name, rule.boost_factor, label
                    ));
                }
                None if rule.boost_factor != 1.0 => {
                    result.add_warning(format!(
                        "Rule '{}' sets boost_factor {} but has no target_label",
                        rule.name, rule.boost_factor
                    ));
                }
                _ => {}
            }
        }

        result
    }
}
