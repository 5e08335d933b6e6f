//! risk-adjust CLI
//!
//! Command-line harness for inspecting prediction thresholds and running
//! risk-aware adjustments by hand.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ra_core::{install_prediction_thresholds, load_thresholds, LabelMapping};
use ra_observability::{init_logging, LoggingConfig};
use std::path::{Path, PathBuf};
use tracing::debug;

mod commands;
mod config;
mod validator;

use commands::{cmd_adjust, cmd_demo, cmd_thresholds, OutputFormat};
use config::AppConfig;
use validator::ThresholdsValidator;

#[derive(Parser)]
#[command(name = "risk-adjust")]
#[command(version)]
#[command(about = "Risk-aware adjustment of classifier predictions", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Thresholds file (overrides thresholds_path from the configuration)
    #[arg(short, long, value_name = "FILE")]
    thresholds: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(long, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active prediction thresholds
    Thresholds,

    /// Adjust one probability vector using a risk score
    Adjust {
        /// Class probabilities, comma separated, in class-index order
        #[arg(short, long, value_delimiter = ',', required = true)]
        probs: Vec<f64>,

        /// Class labels, comma separated (defaults to the configured labels)
        #[arg(short, long, value_delimiter = ',')]
        labels: Option<Vec<String>>,

        /// Risk score; values outside [0, 1] are clamped
        #[arg(short, long, allow_hyphen_values = true)]
        risk: f64,
    },

    /// Run the low-risk and high-risk demonstration
    Demo,

    /// Validate a thresholds file
    Validate {
        /// Thresholds file to validate (defaults to the active thresholds path)
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.exists() {
                AppConfig::load(&default_path)?
            } else {
                AppConfig::default()
            }
        }
    };

    // Initialize logging
    init_logging(&LoggingConfig::for_cli(
        config.logging.tracing_level(),
        cli.verbose,
        config.logging.json || cli.format == OutputFormat::Json,
    ))
    .context("Failed to initialize logging")?;

    let thresholds_path = cli.thresholds.clone().or(config.thresholds_path.clone());

    // Validation inspects a file without installing it
    if !matches!(cli.command, Commands::Validate { .. }) {
        if let Some(path) = &thresholds_path {
            install_thresholds(path)?;
        }
    }

    // Execute command
    match cli.command {
        Commands::Thresholds => cmd_thresholds(cli.format),
        Commands::Adjust {
            probs,
            labels,
            risk,
        } => cmd_adjust(
            &probs,
            labels.as_deref().unwrap_or(&config.labels),
            risk,
            cli.format,
        ),
        Commands::Demo => cmd_demo(&config.labels, cli.format),
        Commands::Validate { file } => {
            let path = file.or(thresholds_path);
            cmd_validate(path.as_deref(), &config.labels)
        }
    }
}

fn default_config_path() -> PathBuf {
    PathBuf::from("config/risk-adjust.yaml")
}

/// Loads a thresholds file and makes it the process-wide table.
fn install_thresholds(path: &Path) -> Result<()> {
    let table = load_thresholds(path)
        .with_context(|| format!("Failed to load thresholds from {}", path.display()))?;
    debug!(path = %path.display(), "Installing prediction thresholds");
    if install_prediction_thresholds(table).is_err() {
        bail!("Prediction thresholds were already initialized");
    }
    Ok(())
}

fn cmd_validate(path: Option<&Path>, labels: &[String]) -> Result<()> {
    let Some(path) = path else {
        bail!("No thresholds file given; pass one or set thresholds_path in the configuration");
    };
    println!(
        "Validating thresholds: {}",
        path.display().to_string().cyan()
    );

    let mapping = LabelMapping::new(labels.iter().cloned()).context("Invalid configured labels")?;
    let (table, result) = ThresholdsValidator::validate_file(path, &mapping);
    result.print();

    if let Some(table) = table {
        println!();
        println!("{}", "Thresholds Summary".bold());
        println!("──────────────────");
        println!("  Rules: {}", table.rules().len());
        println!("  Labels: {}", mapping.labels().join(", "));
    }

    if result.has_errors() {
        println!();
        println!(
            "{}",
            "Threshold validation failed. Fix the errors above."
                .red()
                .bold()
        );
        std::process::exit(1);
    } else if result.has_warnings() {
        println!();
        println!(
            "{}",
            "Thresholds are valid with warnings. Review the warnings above."
                .yellow()
                .bold()
        );
    } else {
        println!();
        println!("{}", "Thresholds are valid.".green().bold());
    }

    Ok(())
}
