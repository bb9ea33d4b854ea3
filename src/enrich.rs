//! Per-record summarization and sentiment, plus the corpus summary.
//!
//! Each record is enriched in isolation: if either oracle fails for a record,
//! that record is dropped and the failure is logged against its key, and the
//! batch carries on. The corpus summary is computed over the per-record
//! summaries in record order and requires at least one surviving record.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::config::SummaryBudget;
use crate::error::{Error, OracleError, Result};
use crate::oracle::{Sentiment, SentimentClassifier, Summarizer};
use crate::table::{LogicalRecord, Schema, KEY_COLUMN};

/// A logical record with its summary and sentiment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedRecord {
    /// The stitched record
    pub record: LogicalRecord,
    /// Summary of primary and secondary text
    pub summary: String,
    /// Sentiment of primary and secondary text
    pub sentiment: Sentiment,
}

/// Summary over all per-record summaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CorpusSummary(pub String);

impl CorpusSummary {
    /// Summary text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A record dropped because an oracle failed on it.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentFailure {
    /// Key of the dropped record
    pub key: String,
    /// What went wrong
    pub error: OracleError,
}

/// Result of a successful enrichment pass.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichOutcome {
    /// Surviving records, in input order
    pub records: Vec<EnrichedRecord>,
    /// Summary over all record summaries
    pub corpus_summary: CorpusSummary,
    /// Records that were dropped
    pub failures: Vec<EnrichmentFailure>,
}

/// Number of whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// `(min_words, max_words)` for summarizing `text`.
///
/// The maximum is half the input length plus one, capped at `cap`, and never
/// below `min_words`.
pub fn summary_bounds(text: &str, cap: usize, min_words: usize) -> (usize, usize) {
    let max_words = cap.min(word_count(text) / 2 + 1);
    (min_words, max_words.max(min_words))
}

/// Per-record summaries joined with single spaces, in record order.
pub fn corpus_text(records: &[EnrichedRecord]) -> String {
    records
        .iter()
        .map(|r| r.summary.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Applies the summarization and sentiment oracles to stitched records.
pub struct Enricher<'a> {
    summarizer: &'a dyn Summarizer,
    classifier: &'a dyn SentimentClassifier,
    budget: SummaryBudget,
}

impl<'a> Enricher<'a> {
    /// Create an enricher over the given oracles.
    pub fn new(
        summarizer: &'a dyn Summarizer,
        classifier: &'a dyn SentimentClassifier,
        budget: SummaryBudget,
    ) -> Self {
        Self {
            summarizer,
            classifier,
            budget,
        }
    }

    /// Enrich one record.
    pub fn enrich_record(
        &self,
        record: &LogicalRecord,
    ) -> std::result::Result<EnrichedRecord, OracleError> {
        let input = format!("{} {}", record.primary(), record.secondary());
        let (min_words, max_words) =
            summary_bounds(&input, self.budget.record_max_words, self.budget.min_words);

        let summary = self.summarizer.summarize(&input, min_words, max_words)?;
        let sentiment = self.classifier.classify(&input)?;

        Ok(EnrichedRecord {
            record: record.clone(),
            summary,
            sentiment,
        })
    }

    /// Enrich every record, then summarize the corpus.
    ///
    /// Fails with [`Error::NoData`] when no record survives.
    pub fn enrich(&self, records: &[LogicalRecord], schema: &Schema) -> Result<EnrichOutcome> {
        let key_name = schema.name_or(KEY_COLUMN, "key");
        let mut enriched = Vec::with_capacity(records.len());
        let mut failures = Vec::new();

        for record in records {
            match self.enrich_record(record) {
                Ok(result) => enriched.push(result),
                Err(error) => {
                    log::error!("Error processing row {} {}: {}", key_name, record.key(), error);
                    failures.push(EnrichmentFailure {
                        key: record.key().to_string(),
                        error,
                    });
                },
            }
        }

        let labels: BTreeSet<&str> = enriched.iter().map(|r| r.sentiment.label.as_str()).collect();
        log::info!(
            "Enriched {} of {} record(s); sentiments found: {:?}",
            enriched.len(),
            records.len(),
            labels
        );

        let corpus_summary = self.summarize_corpus(&enriched)?;

        Ok(EnrichOutcome {
            records: enriched,
            corpus_summary,
            failures,
        })
    }

    /// Summarize the record summaries, space-joined in record order.
    ///
    /// Fails with [`Error::NoData`] when `records` is empty.
    pub fn summarize_corpus(&self, records: &[EnrichedRecord]) -> Result<CorpusSummary> {
        if records.is_empty() {
            return Err(Error::NoData);
        }

        let corpus = corpus_text(records);
        if corpus.is_empty() {
            log::warn!("All record summaries are empty; corpus summary left blank");
            return Ok(CorpusSummary(String::new()));
        }

        let (min_words, max_words) =
            summary_bounds(&corpus, self.budget.corpus_max_words, self.budget.min_words);
        let text = self
            .summarizer
            .summarize(&corpus, min_words, max_words)
            .map_err(Error::CorpusSummary)?;

        Ok(CorpusSummary(text))
    }
}
