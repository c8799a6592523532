//! Line-oriented prediction loop.

use std::io::{BufRead, Write};

use crate::cli::output::render_prediction;
use crate::error::{Result, VerdictError};
use crate::predictor::PredictionResult;

/// Message printed for a blank line.
pub const EMPTY_INPUT_MESSAGE: &str = "Please enter some review text (or 'quit' to exit).";

const PROMPT: &str = "review> ";

/// Statistics of a finished session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub predictions: usize,
    pub rejected: usize,
}

fn is_exit_command(line: &str) -> bool {
    line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit")
}

/// Read reviews from `input` and write a prediction for each one.
///
/// Lines are trimmed. `quit` or `exit` (any case) and end of input stop the
/// loop. Blank lines and texts the predictor rejects as invalid input get a
/// message and the loop continues; other predictor errors end it.
pub fn run_interactive<R, W, F>(input: R, mut output: W, mut predict: F) -> Result<SessionSummary>
where
    R: BufRead,
    W: Write,
    F: FnMut(&str) -> Result<PredictionResult>,
{
    let mut summary = SessionSummary::default();
    let mut lines = input.lines();

    loop {
        write!(output, "{PROMPT}")?;
        output.flush()?;

        let Some(line) = lines.next() else {
            writeln!(output)?;
            break;
        };
        let line = line?;
        let text = line.trim();

        if is_exit_command(text) {
            break;
        }
        if text.is_empty() {
            writeln!(output, "{EMPTY_INPUT_MESSAGE}")?;
            summary.rejected += 1;
            continue;
        }

        match predict(text) {
            Ok(prediction) => {
                writeln!(output, "{}", render_prediction(&prediction))?;
                summary.predictions += 1;
            }
            Err(VerdictError::InvalidInput(message)) => {
                writeln!(output, "Invalid input: {message}")?;
                summary.rejected += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predictor::Confidence;
    use crate::types::SentimentLabel;

    fn fixed(_: &str) -> Result<PredictionResult> {
        Ok(PredictionResult {
            label: SentimentLabel::Neutral,
            confidence: Confidence::Percent(55.0),
            rating: 3,
        })
    }

    #[test]
    fn test_exit_is_case_insensitive() {
        assert!(is_exit_command("quit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("Quit"));
        assert!(!is_exit_command("quitting"));
    }

    #[test]
    fn test_end_of_input_stops() {
        let mut out = Vec::new();
        let summary = run_interactive("so so\n".as_bytes(), &mut out, fixed).unwrap();
        assert_eq!(summary.predictions, 1);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Sentiment: Neutral"));
    }

    #[test]
    fn test_fatal_error_propagates() {
        let mut out = Vec::<u8>::new();
        let result = run_interactive("anything\n".as_bytes(), &mut out, |_| {
            Err(VerdictError::not_trained("no model"))
        });
        assert!(matches!(result, Err(VerdictError::ModelNotTrained(_))));
    }
}
