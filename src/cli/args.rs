//! Command line argument definitions for the verdict CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;

/// Verdict - review sentiment classifier
#[derive(Parser, Debug, Clone)]
#[command(name = "verdict")]
#[command(about = "Train and serve a three-way review sentiment classifier")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct VerdictArgs {
    /// Verbose output (-vv for info, -vvv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl VerdictArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.max(1)
        }
    }

    /// Log level implied by `--quiet` and `-v`.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbosity() {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Train a model from a CSV of rated reviews
    Train(TrainArgs),

    /// Classify a single review
    Predict(PredictArgs),

    /// Classify reviews typed on standard input until quit
    Interactive(InteractiveArgs),
}

/// Arguments for training
#[derive(Parser, Debug, Clone)]
pub struct TrainArgs {
    /// CSV file with Summary, Review and Rate columns
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Directory the trained model is written to
    #[arg(short, long, value_name = "DIR", default_value = "model")]
    pub output: PathBuf,

    /// Training configuration file (JSON)
    #[arg(short, long, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Number of cross-validation folds
    #[arg(long)]
    pub folds: Option<usize>,

    /// Seed for the split, the balancer and the SVM solver
    #[arg(long)]
    pub seed: Option<u64>,

    /// Fraction of each class held out for testing
    #[arg(long)]
    pub test_fraction: Option<f64>,

    /// Minimum document frequency of a vocabulary term
    #[arg(long)]
    pub min_df: Option<usize>,

    /// Skip minority oversampling
    #[arg(long)]
    pub no_balance: bool,

    /// Run the grid search on one thread
    #[arg(long)]
    pub sequential: bool,

    /// Also compete with a nearest-centroid model
    #[arg(long)]
    pub include_nearest_centroid: bool,
}

impl TrainArgs {
    /// Apply command line overrides on top of `config`.
    pub fn apply(&self, config: &mut TrainingConfig) {
        if let Some(folds) = self.folds {
            config.selection.folds = folds;
        }
        if let Some(seed) = self.seed {
            config.split.seed = seed;
            config.balancer.seed = seed;
            config.selection.seed = seed;
        }
        if let Some(fraction) = self.test_fraction {
            config.split.test_fraction = fraction;
        }
        if let Some(min_df) = self.min_df {
            config.vectorizer.min_df = min_df;
        }
        if self.no_balance {
            config.balancer.enabled = false;
        }
        if self.sequential {
            config.selection.parallel = false;
        }
        if self.include_nearest_centroid {
            config.selection.include_nearest_centroid = true;
        }
    }
}

/// Arguments for a single prediction
#[derive(Parser, Debug, Clone)]
pub struct PredictArgs {
    /// Directory holding a trained model
    #[arg(short, long, value_name = "DIR", default_value = "model")]
    pub model: PathBuf,

    /// Review text
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Arguments for the interactive loop
#[derive(Parser, Debug, Clone)]
pub struct InteractiveArgs {
    /// Directory holding a trained model
    #[arg(short, long, value_name = "DIR", default_value = "model")]
    pub model: PathBuf,
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        let args = VerdictArgs::try_parse_from(["verdict", "predict", "fine"]).unwrap();
        assert_eq!(args.verbosity(), 1);
        assert_eq!(args.log_level(), LevelFilter::Warn);

        let args = VerdictArgs::try_parse_from(["verdict", "-vv", "predict", "fine"]).unwrap();
        assert_eq!(args.log_level(), LevelFilter::Info);

        let args = VerdictArgs::try_parse_from(["verdict", "-vvv", "predict", "fine"]).unwrap();
        assert_eq!(args.log_level(), LevelFilter::Debug);

        let args = VerdictArgs::try_parse_from(["verdict", "--quiet", "predict", "fine"]).unwrap();
        assert_eq!(args.verbosity(), 0);
        assert_eq!(args.log_level(), LevelFilter::Error);
    }

    #[test]
    fn test_output_format() {
        let args =
            VerdictArgs::try_parse_from(["verdict", "--format", "json", "predict", "ok"]).unwrap();
        assert_eq!(args.output_format, OutputFormat::Json);
    }

    #[test]
    fn test_train_overrides() {
        let args = VerdictArgs::try_parse_from([
            "verdict",
            "train",
            "reviews.csv",
            "--output",
            "out",
            "--folds",
            "3",
            "--seed",
            "7",
            "--no-balance",
            "--sequential",
        ])
        .unwrap();

        let Command::Train(train) = args.command else {
            panic!("Expected Train command");
        };
        assert_eq!(train.output, PathBuf::from("out"));

        let mut config = TrainingConfig::default();
        train.apply(&mut config);
        assert_eq!(config.selection.folds, 3);
        assert_eq!(config.split.seed, 7);
        assert_eq!(config.balancer.seed, 7);
        assert!(!config.balancer.enabled);
        assert!(!config.selection.parallel);
        assert_eq!(config.vectorizer.min_df, 5);
    }

    #[test]
    fn test_predict_requires_text() {
        assert!(VerdictArgs::try_parse_from(["verdict", "predict", "--model", "m"]).is_err());
    }
}
