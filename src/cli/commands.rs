//! Command implementations for the verdict CLI.

use std::io;
use std::time::Instant;

use anyhow::Context;
use log::info;

use crate::artifact::{ArtifactStore, JsonArtifactStore};
use crate::cli::args::*;
use crate::cli::interactive::run_interactive;
use crate::cli::output::*;
use crate::config::TrainingConfig;
use crate::error::Result;
use crate::pipeline::Trainer;
use crate::predictor::SentimentPredictor;

/// Execute a CLI command.
pub fn execute_command(args: VerdictArgs) -> Result<()> {
    match &args.command {
        Command::Train(train_args) => train(train_args, &args),
        Command::Predict(predict_args) => predict(predict_args, &args),
        Command::Interactive(interactive_args) => interactive(interactive_args, &args),
    }
}

/// Build the training configuration from the optional file and the flags.
pub fn resolve_config(args: &TrainArgs) -> Result<TrainingConfig> {
    let mut config = match &args.config {
        Some(path) => TrainingConfig::load(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => TrainingConfig::default(),
    };
    args.apply(&mut config);
    config.validate()?;
    Ok(config)
}

/// Train, evaluate and save a model.
fn train(args: &TrainArgs, cli_args: &VerdictArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let start_time = Instant::now();

    let trainer = Trainer::new(config)?;
    let (model, report) = trainer.train_csv(&args.csv)?;

    let store = JsonArtifactStore::new(&args.output);
    store.save(&model)?;
    info!(
        "training finished in {:.1}s",
        start_time.elapsed().as_secs_f64()
    );

    output_training(
        &TrainingOutput {
            model_path: store.model_path().display().to_string(),
            report: &report,
        },
        cli_args,
    )
}

fn load_predictor(model_dir: &std::path::Path) -> Result<SentimentPredictor> {
    let model = JsonArtifactStore::new(model_dir).load()?;
    SentimentPredictor::new(model)
}

/// Classify a single text.
fn predict(args: &PredictArgs, cli_args: &VerdictArgs) -> Result<()> {
    let predictor = load_predictor(&args.model)?;
    let prediction = predictor.predict(&args.text)?;
    output_prediction(
        &PredictionOutput {
            text: &args.text,
            prediction: &prediction,
        },
        cli_args,
    )
}

/// Classify lines from standard input until quit.
fn interactive(args: &InteractiveArgs, cli_args: &VerdictArgs) -> Result<()> {
    let predictor = load_predictor(&args.model)?;
    if cli_args.verbosity() > 0 {
        let metadata = &predictor.model().metadata;
        println!(
            "Loaded {} model {} (test accuracy {:.2}%)",
            metadata.family,
            metadata.params,
            metadata.test_accuracy * 100.0
        );
        println!("Type a review and press Enter; 'quit' or 'exit' to stop.");
    }

    let stdin = io::stdin();
    let summary = run_interactive(stdin.lock(), io::stdout(), |text| predictor.predict(text))?;
    info!(
        "session ended after {} predictions ({} rejected)",
        summary.predictions, summary.rejected
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn train_args(extra: &[&str]) -> TrainArgs {
        let mut argv = vec!["verdict", "train", "reviews.csv"];
        argv.extend_from_slice(extra);
        match VerdictArgs::try_parse_from(argv).unwrap().command {
            Command::Train(args) => args,
            _ => panic!("Expected Train command"),
        }
    }

    #[test]
    fn test_resolve_config_file_then_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "selection": {{ "folds": 4 }}, "vectorizer": {{ "min_df": 2 }} }}"#)
            .unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let config = resolve_config(&train_args(&["--config", &path, "--min-df", "3"])).unwrap();
        assert_eq!(config.selection.folds, 4);
        assert_eq!(config.vectorizer.min_df, 3);
    }

    #[test]
    fn test_resolve_config_rejects_invalid_override() {
        assert!(resolve_config(&train_args(&["--folds", "1"])).is_err());
    }

    #[test]
    fn test_missing_config_file_has_context() {
        let err = resolve_config(&train_args(&["--config", "/nonexistent/verdict.json"]))
            .unwrap_err()
            .to_string();
        assert!(err.contains("failed to load configuration"));
    }
}
