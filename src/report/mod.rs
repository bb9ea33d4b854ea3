//! Report assembly: the tabular row set, visualizations and Markdown.
//!
//! The [`Reporter`] asks the render sink for the three images first; any
//! render failure aborts before a report exists. [`ReportArtifact::persist`]
//! then writes the CSV and Markdown through temporary files so a failed run
//! never leaves a half-written report behind.

mod markdown;

pub use markdown::MarkdownReporter;

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::OutputNames;
use crate::enrich::{CorpusSummary, EnrichedRecord};
use crate::error::Result;
use crate::oracle::SentimentLabel;
use crate::render::{ImageHandle, RenderSink};
use crate::table::{
    Schema, KEY_COLUMN, LOCATOR_COLUMN, PRIMARY_COLUMN, SECONDARY_COLUMN,
};

/// One row of the tabular artifact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// Identifying key
    pub key: String,
    /// Secondary locator
    pub locator: String,
    /// Primary free text
    pub primary: String,
    /// Secondary free text
    pub secondary: String,
    /// Record summary
    pub summary: String,
    /// Sentiment label
    pub sentiment: String,
    /// Sentiment confidence
    pub score: f32,
}

impl ReportRow {
    /// Row for an enriched record.
    pub fn from_enriched(enriched: &EnrichedRecord) -> Self {
        let record = &enriched.record;
        Self {
            key: record.key().to_string(),
            locator: record.locator().to_string(),
            primary: record.primary().to_string(),
            secondary: record.secondary().to_string(),
            summary: enriched.summary.clone(),
            sentiment: enriched.sentiment.label.to_string(),
            score: enriched.sentiment.score,
        }
    }

    fn to_record(&self) -> [String; 7] {
        [
            self.key.clone(),
            self.locator.clone(),
            self.primary.clone(),
            self.secondary.clone(),
            self.summary.clone(),
            self.sentiment.clone(),
            self.score.to_string(),
        ]
    }
}

/// Column names of the tabular artifact, taken from the schema where it has
/// them.
pub fn table_columns(schema: &Schema) -> Vec<String> {
    vec![
        schema.name_or(KEY_COLUMN, "key").to_string(),
        schema.name_or(LOCATOR_COLUMN, "locator").to_string(),
        schema.name_or(PRIMARY_COLUMN, "primary").to_string(),
        schema.name_or(SECONDARY_COLUMN, "secondary").to_string(),
        "Summary".to_string(),
        "sentiment".to_string(),
        "score".to_string(),
    ]
}

/// Count of records per sentiment label.
pub fn label_counts(records: &[EnrichedRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.sentiment.label.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Primary text of every record carrying `label`, in record order.
pub fn texts_with_label(records: &[EnrichedRecord], label: &SentimentLabel) -> Vec<String> {
    records
        .iter()
        .filter(|r| &r.sentiment.label == label)
        .map(|r| r.record.primary().to_string())
        .collect()
}

/// Everything a finished report consists of.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportArtifact {
    /// Header of the tabular artifact
    pub columns: Vec<String>,
    /// One row per enriched record
    pub rows: Vec<ReportRow>,
    /// Corpus summary, verbatim
    pub corpus_summary: String,
    /// Sentiment distribution chart
    pub pie_chart: ImageHandle,
    /// Cloud of positive primary texts
    pub positive_cloud: ImageHandle,
    /// Cloud of negative primary texts
    pub negative_cloud: ImageHandle,
    /// Rendered Markdown document
    pub markdown: String,
}

/// Paths written by [`ReportArtifact::persist`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    /// Markdown report
    pub report: PathBuf,
    /// Delimited row set
    pub table: PathBuf,
}

impl ReportArtifact {
    /// Serialize the row set as CSV.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(&self.columns)?;
        for row in &self.rows {
            csv.write_record(row.to_record())?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Write the CSV and Markdown files into `dir`.
    ///
    /// Both files are staged as temporaries in `dir` and only moved into place
    /// once both were written completely. If the report cannot be moved into
    /// place the freshly written CSV is removed again.
    pub fn persist(&self, dir: &Path, names: &OutputNames) -> Result<WrittenReport> {
        let mut table_tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.write_csv(table_tmp.as_file_mut())?;
        table_tmp.as_file().sync_all()?;

        let mut report_tmp = tempfile::NamedTempFile::new_in(dir)?;
        report_tmp.write_all(self.markdown.as_bytes())?;
        report_tmp.as_file().sync_all()?;

        let table = dir.join(&names.table);
        let report = dir.join(&names.report);
        table_tmp.persist(&table).map_err(|e| e.error)?;
        if let Err(e) = report_tmp.persist(&report) {
            if let Err(cleanup) = std::fs::remove_file(&table) {
                log::warn!("Cannot remove {} after failed write: {}", table.display(), cleanup);
            }
            return Err(e.error.into());
        }

        log::info!("Combined and formatted table saved to {}", table.display());
        log::info!("Markdown report saved to {}", report.display());

        Ok(WrittenReport { report, table })
    }
}

/// Turns enriched records into a report.
pub trait Reporter {
    /// Render visualizations and assemble the report.
    fn report(
        &self,
        enriched: &[EnrichedRecord],
        schema: &Schema,
        corpus_summary: &CorpusSummary,
        render: &dyn RenderSink,
    ) -> Result<ReportArtifact>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::Sentiment;
    use crate::table::LogicalRecord;

    fn enriched(key: &str, primary: &str, label: SentimentLabel) -> EnrichedRecord {
        EnrichedRecord {
            record: LogicalRecord::new(vec![
                key.into(),
                "1.1".into(),
                primary.into(),
                "because".into(),
            ]),
            summary: format!("summary {key}"),
            sentiment: Sentiment::new(label, 0.5),
        }
    }

    #[test]
    fn test_table_columns_use_schema_names() {
        let schema = Schema::new(vec!["Sr.No".into(), "Para".into(), "Suggestion".into()]);
        assert_eq!(
            table_columns(&schema),
            vec!["Sr.No", "Para", "Suggestion", "secondary", "Summary", "sentiment", "score"]
        );
    }

    #[test]
    fn test_label_counts_and_texts() {
        let records = vec![
            enriched("1", "cut tax", SentimentLabel::Positive),
            enriched("2", "raise fees", SentimentLabel::Negative),
            enriched("3", "more parks", SentimentLabel::Positive),
        ];

        let counts = label_counts(&records);
        assert_eq!(counts.get("POSITIVE"), Some(&2));
        assert_eq!(counts.get("NEGATIVE"), Some(&1));

        assert_eq!(
            texts_with_label(&records, &SentimentLabel::Positive),
            vec!["cut tax", "more parks"]
        );
        assert!(texts_with_label(&records, &SentimentLabel::Other("NEUTRAL".into())).is_empty());
    }

    fn artifact() -> ReportArtifact {
        let image = ImageHandle {
            path: PathBuf::from("pie.png"),
            placeholder: false,
        };
        ReportArtifact {
            columns: table_columns(&Schema::new(vec!["Sr.No".into()])),
            rows: vec![ReportRow::from_enriched(&enriched("1", "cut tax", SentimentLabel::Positive))],
            corpus_summary: "summary".into(),
            pie_chart: image.clone(),
            positive_cloud: image.clone(),
            negative_cloud: image,
            markdown: "# Report".into(),
        }
    }

    #[test]
    fn test_persist_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let written = artifact().persist(dir.path(), &OutputNames::default()).unwrap();

        assert_eq!(std::fs::read_to_string(&written.report).unwrap(), "# Report");
        let csv = std::fs::read_to_string(&written.table).unwrap();
        assert!(csv.starts_with("Sr.No,locator,primary,secondary,Summary,sentiment,score\n"));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_failed_report_write_removes_table() {
        let dir = tempfile::tempdir().unwrap();
        let names = OutputNames::default();
        // A non-empty directory where the report should go makes the rename fail.
        let blocker = dir.path().join(&names.report);
        std::fs::create_dir(&blocker).unwrap();
        std::fs::write(blocker.join("keep"), "x").unwrap();

        let result = artifact().persist(dir.path(), &names);

        assert!(matches!(result, Err(crate::error::Error::Io(_))));
        assert!(!dir.path().join(&names.table).exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_report_row() {
        let row = ReportRow::from_enriched(&enriched("4", "text", SentimentLabel::Negative));
        assert_eq!(row.key, "4");
        assert_eq!(row.secondary, "because");
        assert_eq!(row.sentiment, "NEGATIVE");
        assert_eq!(row.to_record()[6], "0.5");
    }
}
