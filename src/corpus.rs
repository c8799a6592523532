//! Review corpus loading and stratified train/test splitting.
//!
//! The loader reads a CSV with a header row:
//! ```csv
//! Summary,Review,Rate
//! Great value,Works exactly as described,5
//! Meh,It is fine I guess,3
//! ```
//! Ratings are parsed as numbers; rows whose rating is missing or not a
//! finite number are dropped and counted.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::config::{CorpusConfig, SplitConfig};
use crate::error::{Result, VerdictError};
use crate::types::{Review, SentimentLabel};

/// Reviews kept by the loader and the number of rows it dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadedCorpus {
    pub reviews: Vec<Review>,
    pub dropped: usize,
}

/// CSV review loader.
#[derive(Debug, Clone)]
pub struct CsvReviewLoader {
    config: CorpusConfig,
}

impl Default for CsvReviewLoader {
    fn default() -> Self {
        Self::new(CorpusConfig::default())
    }
}

impl CsvReviewLoader {
    pub fn new(config: CorpusConfig) -> Self {
        CsvReviewLoader { config }
    }

    /// Load reviews from a CSV file.
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<LoadedCorpus> {
        let file = File::open(path.as_ref()).map_err(|e| {
            VerdictError::Io(std::io::Error::new(
                e.kind(),
                format!("cannot open {}: {e}", path.as_ref().display()),
            ))
        })?;
        self.load(file)
    }

    /// Load reviews from any CSV source.
    pub fn load<R: Read>(&self, input: R) -> Result<LoadedCorpus> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.config.delimiter as u8)
            .trim(csv::Trim::All)
            .flexible(self.config.flexible)
            .from_reader(input);

        let headers = reader.headers()?.clone();
        let column = |name: &str| headers.iter().position(|h| h == name);
        let summary_at = column(&self.config.summary_column);
        let body_at = column(&self.config.body_column);
        let rating_at = column(&self.config.rating_column).ok_or_else(|| {
            VerdictError::invalid_input(format!(
                "CSV has no rating column {:?}",
                self.config.rating_column
            ))
        })?;
        if summary_at.is_none() && body_at.is_none() {
            return Err(VerdictError::invalid_input(format!(
                "CSV has neither a {:?} nor a {:?} column",
                self.config.summary_column, self.config.body_column
            )));
        }

        let mut corpus = LoadedCorpus::default();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let field = |at: Option<usize>| {
                at.and_then(|i| record.get(i))
                    .filter(|value| !value.is_empty())
                    .map(str::to_string)
            };

            let rating = record
                .get(rating_at)
                .and_then(|value| value.parse::<f64>().ok())
                .filter(|value| value.is_finite());
            let Some(rating) = rating else {
                corpus.dropped += 1;
                continue;
            };

            corpus.reviews.push(Review {
                summary: field(summary_at),
                body: field(body_at),
                rating: Some(rating),
            });
            if row > 0 && row % 10_000 == 0 {
                info!("read {row} rows");
            }
        }

        if corpus.dropped > 0 {
            warn!(
                "dropped {} rows with a missing or non-numeric {:?}",
                corpus.dropped, self.config.rating_column
            );
        }
        info!("loaded {} reviews", corpus.reviews.len());
        Ok(corpus)
    }
}

/// Split labeled items into `(train, test)` preserving label proportions.
///
/// Each label's items are shuffled with a seeded generator and
/// `round(n * test_fraction)` of them go to the test set. Both outputs keep
/// label order (all negatives, then neutrals, then positives).
pub fn stratified_split<T: Clone>(
    items: &[T],
    labels: &[SentimentLabel],
    config: &SplitConfig,
) -> Result<(Vec<(T, SentimentLabel)>, Vec<(T, SentimentLabel)>)> {
    config.validate()?;
    if items.len() != labels.len() {
        return Err(VerdictError::invalid_input(format!(
            "{} items but {} labels",
            items.len(),
            labels.len()
        )));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut train = Vec::new();
    let mut test = Vec::new();
    for label in SentimentLabel::ALL {
        let mut members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| **l == label)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);

        let n_test = (members.len() as f64 * config.test_fraction).round() as usize;
        for (position, &i) in members.iter().enumerate() {
            let pair = (items[i].clone(), label);
            if position < n_test {
                test.push(pair);
            } else {
                train.push(pair);
            }
        }
    }

    if train.is_empty() || test.is_empty() {
        return Err(VerdictError::invalid_input(format!(
            "split of {} items produced {} training and {} test items",
            items.len(),
            train.len(),
            test.len()
        )));
    }
    Ok((train, test))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Summary,Review,Rate\n\
Great value,Works exactly as described,5\n\
Meh,\"It is fine, I guess\",3\n\
Broken,Stopped working,1\n\
No rating,Missing,\n\
Odd,Bad rating,five\n\
,Body only,4.5\n";

    #[test]
    fn test_load_drops_invalid_ratings() {
        let corpus = CsvReviewLoader::default().load(SAMPLE.as_bytes()).unwrap();
        assert_eq!(corpus.reviews.len(), 4);
        assert_eq!(corpus.dropped, 2);

        let meh = &corpus.reviews[1];
        assert_eq!(meh.body.as_deref(), Some("It is fine, I guess"));
        assert_eq!(meh.label(), Some(SentimentLabel::Neutral));

        let body_only = &corpus.reviews[3];
        assert_eq!(body_only.summary, None);
        assert_eq!(body_only.label(), Some(SentimentLabel::Positive));
    }

    #[test]
    fn test_custom_columns() {
        let csv = "title;text;stars\nOk;Fine;2\n";
        let loader = CsvReviewLoader::new(CorpusConfig {
            summary_column: "title".into(),
            body_column: "text".into(),
            rating_column: "stars".into(),
            delimiter: ';',
            flexible: true,
        });
        let corpus = loader.load(csv.as_bytes()).unwrap();
        assert_eq!(corpus.reviews.len(), 1);
        assert_eq!(corpus.reviews[0].label(), Some(SentimentLabel::Negative));
    }

    #[test]
    fn test_missing_rating_column() {
        let result = CsvReviewLoader::default().load("Summary,Review\na,b\n".as_bytes());
        assert!(matches!(result, Err(VerdictError::InvalidInput(_))));
    }

    #[test]
    fn test_stratified_split() {
        let mut labels = vec![SentimentLabel::Positive; 50];
        labels.extend(vec![SentimentLabel::Negative; 20]);
        labels.extend(vec![SentimentLabel::Neutral; 10]);
        let items: Vec<usize> = (0..labels.len()).collect();

        let (train, test) = stratified_split(&items, &labels, &SplitConfig::default()).unwrap();
        assert_eq!(train.len() + test.len(), 80);
        assert_eq!(test.len(), 10 + 4 + 2);

        let mut all: Vec<usize> = train.iter().chain(&test).map(|(i, _)| *i).collect();
        all.sort_unstable();
        assert_eq!(all, items);
        for (item, label) in train.iter().chain(&test) {
            assert_eq!(labels[*item], *label);
        }

        let again = stratified_split(&items, &labels, &SplitConfig::default()).unwrap();
        assert_eq!(again.1, test);
    }
}
