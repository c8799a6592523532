//! Output formatting for CLI commands.

use std::fmt::Write as _;

use serde::Serialize;

use crate::cli::args::{OutputFormat, VerdictArgs};
use crate::error::Result;
use crate::evaluation::TrainingReport;
use crate::model::selection::FamilyStatus;
use crate::predictor::PredictionResult;
use crate::types::SentimentLabel;

/// Result of the train command.
#[derive(Debug, Serialize)]
pub struct TrainingOutput<'a> {
    pub model_path: String,
    #[serde(flatten)]
    pub report: &'a TrainingReport,
}

/// Result of classifying one text.
#[derive(Debug, Serialize)]
pub struct PredictionOutput<'a> {
    pub text: &'a str,
    #[serde(flatten)]
    pub prediction: &'a PredictionResult,
}

/// Print the outcome of a training run.
pub fn output_training(output: &TrainingOutput<'_>, args: &VerdictArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            print!("{}", render_training_report(output.report));
            println!("Model saved to: {}", output.model_path);
            Ok(())
        }
        OutputFormat::Json => output_json(output, args),
    }
}

/// Print one prediction.
pub fn output_prediction(output: &PredictionOutput<'_>, args: &VerdictArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            println!("{}", render_prediction(output.prediction));
            Ok(())
        }
        OutputFormat::Json => output_json(output, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &VerdictArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

/// Human-readable line for a prediction.
pub fn render_prediction(prediction: &PredictionResult) -> String {
    format!(
        "Sentiment: {}\nRating: {} {}\nConfidence: {}",
        prediction.label,
        prediction.rating,
        format_stars(prediction.rating),
        prediction.confidence
    )
}

/// Human-readable training summary.
pub fn render_training_report(report: &TrainingReport) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_training_report(&mut out, report);
    out
}

fn write_training_report(out: &mut String, report: &TrainingReport) -> std::fmt::Result {
    writeln!(out, "Training Summary:")?;
    writeln!(out, "═════════════════")?;
    writeln!(out, "Reviews loaded: {}", report.reviews_loaded)?;
    if report.rows_dropped > 0 {
        writeln!(out, "Rows dropped: {}", report.rows_dropped)?;
    }
    writeln!(
        out,
        "Training set: {} ({} after balancing)",
        report.training_size, report.balanced_training_size
    )?;
    writeln!(out, "Test set: {}", report.test_size)?;
    writeln!(out, "Vocabulary size: {}", report.vocabulary_size)?;
    for label in SentimentLabel::ALL {
        writeln!(
            out,
            "  {:<9} {}",
            label.as_str(),
            report.class_counts[label.index()]
        )?;
    }

    writeln!(out)?;
    writeln!(out, "Model Families:")?;
    writeln!(out, "──────────────")?;
    for family in &report.families {
        match &family.status {
            FamilyStatus::Trained {
                best_params,
                cv_accuracy,
                test_accuracy,
                ..
            } => writeln!(
                out,
                "{:<24} cv {} test {} {}",
                family.family.as_str(),
                format_percent(*cv_accuracy),
                format_percent(*test_accuracy),
                best_params
            )?,
            FamilyStatus::Failed { reason } => {
                writeln!(out, "{:<24} failed: {reason}", family.family.as_str())?
            }
        }
    }

    writeln!(out)?;
    writeln!(
        out,
        "Selected: {} {} (test accuracy {})",
        report.selected_family,
        report.selected_params,
        format_percent(report.test_accuracy)
    )?;
    writeln!(out)?;
    write!(out, "{}", report.evaluation.report)?;
    writeln!(out)?;
    writeln!(out, "Confusion matrix (rows: actual, columns: predicted):")?;
    write!(out, "{}", report.evaluation.confusion)?;
    Ok(())
}

/// Format a fraction as a percentage.
fn format_percent(fraction: f64) -> String {
    format!("{:.2}%", fraction * 100.0)
}

/// Star string for a 1-5 rating.
fn format_stars(rating: u8) -> String {
    let filled = rating.min(5) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::Confidence;

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.8765), "87.65%");
        assert_eq!(format_percent(1.0), "100.00%");
    }

    #[test]
    fn test_format_stars() {
        assert_eq!(format_stars(1), "★☆☆☆☆");
        assert_eq!(format_stars(5), "★★★★★");
    }

    #[test]
    fn test_render_prediction() {
        let prediction = PredictionResult {
            label: SentimentLabel::Positive,
            confidence: Confidence::Percent(92.5),
            rating: 5,
        };
        let text = render_prediction(&prediction);
        assert!(text.contains("Sentiment: Positive"));
        assert!(text.contains("Confidence: 92.50%"));

        let opaque = PredictionResult {
            confidence: Confidence::Unavailable,
            ..prediction
        };
        assert!(render_prediction(&opaque).contains("Confidence: unavailable"));
    }

    #[test]
    fn test_prediction_json_is_flat() {
        let prediction = PredictionResult {
            label: SentimentLabel::Negative,
            confidence: Confidence::Percent(70.0),
            rating: 1,
        };
        let output = PredictionOutput {
            text: "meh",
            prediction: &prediction,
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["text"], "meh");
        assert_eq!(value["rating"], 1);
        assert_eq!(value["confidence"], 70.0);
    }
}
