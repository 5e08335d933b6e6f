//! Thresholds command - shows the active prediction thresholds.

use anyhow::Result;
use colored::Colorize;
use ra_core::thresholds::ThresholdsConfig;
use ra_core::{prediction_thresholds, ThresholdTable};

use super::OutputFormat;

/// Prints the process-wide prediction thresholds.
pub fn cmd_thresholds(format: OutputFormat) -> Result<()> {
    let table = prediction_thresholds();
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&ThresholdsConfig::from(table.as_ref()))?
            );
        }
        OutputFormat::Text => print_table(table),
    }
    Ok(())
}

/// Prints a threshold table as aligned text.
pub(crate) fn print_table(table: &ThresholdTable) {
    println!("{}", "PREDICTION_THRESHOLDS".bold());
    println!("─────────────────────");
    let last = table.rules().len().saturating_sub(1);
    for (i, rule) in table.rules().iter().enumerate() {
        let close = if i == last { ']' } else { ')' };
        let effect = match rule.effective_target() {
            Some(label) => format!("boost {} x{}", label.cyan(), rule.boost_factor),
            None => "no boost".dimmed().to_string(),
        };
        println!(
            "  {:<16} [{:.2}, {:.2}{}  {}",
            rule.name, rule.min_risk, rule.max_risk, close, effect
        );
    }
}
