//! Summarization and sentiment capabilities.
//!
//! The pipeline only depends on the two traits here. [`InferenceClient`]
//! implements both against a hosted inference endpoint; tests plug in stubs.

mod inference;

pub use inference::InferenceClient;

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::OracleError;

/// Produces a shorter version of a text.
pub trait Summarizer {
    /// Summarize `text` in roughly `min_words..=max_words` words.
    ///
    /// Callers guarantee `max_words >= min_words`.
    fn summarize(&self, text: &str, min_words: usize, max_words: usize)
        -> Result<String, OracleError>;
}

/// Assigns a sentiment label and confidence to a text.
pub trait SentimentClassifier {
    /// Classify `text`.
    fn classify(&self, text: &str) -> Result<Sentiment, OracleError>;
}

impl<T: Summarizer + ?Sized> Summarizer for Arc<T> {
    fn summarize(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> Result<String, OracleError> {
        (**self).summarize(text, min_words, max_words)
    }
}

impl<T: SentimentClassifier + ?Sized> SentimentClassifier for Arc<T> {
    fn classify(&self, text: &str) -> Result<Sentiment, OracleError> {
        (**self).classify(text)
    }
}

/// Sentiment label. Classifiers may emit labels beyond the two common ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum SentimentLabel {
    /// `POSITIVE`
    Positive,
    /// `NEGATIVE`
    Negative,
    /// Any other label, kept verbatim
    Other(String),
}

impl SentimentLabel {
    /// Parse a classifier label; `positive`/`negative` match case-insensitively.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("positive") {
            SentimentLabel::Positive
        } else if label.eq_ignore_ascii_case("negative") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Other(label.to_string())
        }
    }

    /// Label as written in reports.
    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Other(label) => label,
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}

/// Classifier output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sentiment {
    /// Predicted label
    pub label: SentimentLabel,
    /// Confidence in `[0, 1]`
    pub score: f32,
}

impl Sentiment {
    /// Create a sentiment, clamping the score into `[0, 1]`.
    pub fn new(label: SentimentLabel, score: f32) -> Self {
        let score = if score.is_nan() {
            0.0
        } else {
            score.clamp(0.0, 1.0)
        };
        Self { label, score }
    }
}
