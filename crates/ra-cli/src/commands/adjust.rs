//! Adjust and demo commands - run threshold adjustments by hand.

use anyhow::{Context, Result};
use colored::Colorize;
use ra_core::{
    prediction_thresholds, AdjustResult, Adjustment, LabelMapping, ThresholdAdjuster,
};
use ra_observability::AdjustmentMetrics;
use serde::Serialize;

use super::thresholds::print_table;
use super::OutputFormat;

/// Probabilities used by the demo: the middle class is the raw favorite.
const DEMO_PROBABILITIES: [f64; 3] = [0.25, 0.5, 0.25];

/// A named demo run and its outcome.
#[derive(Debug, Clone, Serialize)]
pub struct DemoScenario {
    /// Short scenario name.
    pub name: &'static str,
    /// Risk score fed to the adjuster.
    pub risk_score: f64,
    /// Adjustment produced.
    pub adjustment: Adjustment,
}

/// Runs one adjustment and prints the result.
pub fn cmd_adjust(
    probabilities: &[f64],
    labels: &[String],
    risk_score: f64,
    format: OutputFormat,
) -> Result<()> {
    let mapping = LabelMapping::new(labels.iter().cloned()).context("Invalid labels")?;
    let metrics = AdjustmentMetrics::new();
    let adjustment = run_adjust(
        &ThresholdAdjuster::global(),
        probabilities,
        &mapping,
        risk_score,
        &metrics,
    )
    .context("Adjustment rejected the input")?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&adjustment)?),
        OutputFormat::Text => print_adjustment(&adjustment, &mapping),
    }
    Ok(())
}

/// Adjusts one vector, recording the outcome whether or not it succeeds.
fn run_adjust(
    adjuster: &ThresholdAdjuster,
    probabilities: &[f64],
    mapping: &LabelMapping,
    risk_score: f64,
    metrics: &AdjustmentMetrics,
) -> AdjustResult<Adjustment> {
    let result = adjuster.adjust(probabilities, mapping, risk_score);
    metrics.record_result(&result);
    result
}

/// Runs the low-risk and high-risk demo scenarios.
pub fn run_demo(
    adjuster: &ThresholdAdjuster,
    mapping: &LabelMapping,
    metrics: &AdjustmentMetrics,
) -> Result<Vec<DemoScenario>> {
    [("low risk", 0.2), ("high risk", 0.9)]
        .into_iter()
        .map(|(name, risk_score)| {
            let adjustment = run_adjust(adjuster, &DEMO_PROBABILITIES, mapping, risk_score, metrics)
                .with_context(|| format!("Demo scenario '{}' failed", name))?;
            Ok(DemoScenario {
                name,
                risk_score,
                adjustment,
            })
        })
        .collect()
}

/// Prints the thresholds, then the demo scenarios against them.
pub fn cmd_demo(labels: &[String], format: OutputFormat) -> Result<()> {
    let mapping = LabelMapping::new(labels.iter().cloned()).context("Invalid labels")?;
    let adjuster = ThresholdAdjuster::global();
    let metrics = AdjustmentMetrics::new();

    let scenarios = run_demo(&adjuster, &mapping, &metrics)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&scenarios)?);
        return Ok(());
    }

    println!("{}", "=".repeat(60));
    println!("{}", "Threshold Adjustment Demo".bold());
    println!("{}", "=".repeat(60));
    println!();
    print_table(prediction_thresholds());
    println!();
    println!("Raw probabilities: {:?}", DEMO_PROBABILITIES);

    for scenario in &scenarios {
        println!();
        println!(
            "[{}] risk {:.2} -> {} (confidence {:.3})",
            scenario.name.to_uppercase().bold(),
            scenario.risk_score,
            scenario.adjustment.label.green().bold(),
            scenario.adjustment.confidence
        );
    }

    let summary = metrics.summary();
    println!();
    println!(
        "Decisions changed by risk: {}/{}",
        summary.decisions_changed, summary.total
    );
    Ok(())
}

fn print_adjustment(adjustment: &Adjustment, mapping: &LabelMapping) {
    println!(
        "Adjusted prediction: {} (confidence {:.3})",
        adjustment.label.green().bold(),
        adjustment.confidence
    );

    let effect = match &adjustment.boosted_label {
        Some(label) => format!("boosted {}", label),
        None => "no boost".to_string(),
    };
    println!(
        "  Rule: {} ({}), risk {:.2}",
        adjustment.rule, effect, adjustment.risk_score
    );
    if adjustment.decision_changed() {
        if let Some(raw) = mapping.label(adjustment.raw_index) {
            println!("  {} raw prediction was {}", "Changed:".yellow(), raw);
        }
    }

    println!();
    for (index, label) in mapping.iter() {
        let marker = if index == adjustment.class_index {
            "←"
        } else {
            ""
        };
        println!("  {:<12} {:.3} {}", label, adjustment.adjusted[index], marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ra_core::ThresholdTable;

    #[test]
    fn test_demo_scenarios() {
        let adjuster = ThresholdAdjuster::new(ThresholdTable::default());
        let mapping = LabelMapping::new(["Low", "High", "Severe"]).unwrap();

        let metrics = AdjustmentMetrics::new();

        let scenarios = run_demo(&adjuster, &mapping, &metrics).unwrap();
        assert_eq!(scenarios.len(), 2);
        assert_eq!(metrics.summary().total, 2);
        assert_eq!(metrics.summary().decisions_changed, 2);

        assert_eq!(scenarios[0].adjustment.label, "Low");
        assert!(scenarios[0].adjustment.confidence > 0.25);

        assert_eq!(scenarios[1].adjustment.label, "Severe");
        assert!(scenarios[1].adjustment.confidence > 0.25);
    }

    #[test]
    fn test_demo_requires_three_labels() {
        let adjuster = ThresholdAdjuster::new(ThresholdTable::default());
        let mapping = LabelMapping::new(["Low", "Severe"]).unwrap();

        let metrics = AdjustmentMetrics::new();

        let result = run_demo(&adjuster, &mapping, &metrics);
        assert!(result.is_err());
        assert_eq!(metrics.summary().invalid_inputs, 1);
    }

    #[test]
    fn test_rejected_adjustment_is_recorded() {
        let adjuster = ThresholdAdjuster::new(ThresholdTable::default());
        let mapping = LabelMapping::new(["Low", "High", "Severe"]).unwrap();
        let metrics = AdjustmentMetrics::new();

        let result = run_adjust(&adjuster, &[0.5, 0.6, 0.1], &mapping, 0.5, &metrics);
        assert!(result.is_err());

        let adjustment = run_adjust(&adjuster, &[0.1, 0.1, 0.8], &mapping, 0.5, &metrics).unwrap();
        assert_eq!(adjustment.label, "Severe");

        let summary = metrics.summary();
        assert_eq!(summary.total, 1);
        assert_eq!(summary.invalid_inputs, 1);
    }
}
