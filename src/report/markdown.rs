//! Markdown report layout.

use std::path::{Path, PathBuf};

use super::{label_counts, table_columns, texts_with_label, ReportArtifact, ReportRow, Reporter};
use crate::enrich::{CorpusSummary, EnrichedRecord};
use crate::error::Result;
use crate::oracle::SentimentLabel;
use crate::render::{ImageHandle, RenderSink};
use crate::table::Schema;

/// Report title.
pub const TITLE: &str = "Report on Comments and Suggestions";

/// Builds the fixed-layout Markdown report.
#[derive(Debug, Clone, Default)]
pub struct MarkdownReporter {
    image_base: Option<PathBuf>,
}

impl MarkdownReporter {
    /// Reporter that references images by the paths the sink returned.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference images relative to `dir` when they live inside it.
    pub fn relative_to(dir: impl Into<PathBuf>) -> Self {
        Self {
            image_base: Some(dir.into()),
        }
    }

    fn image_ref(&self, image: &ImageHandle) -> String {
        let path = match &self.image_base {
            Some(base) => image.path.strip_prefix(base).unwrap_or(&image.path),
            None => image.path.as_path(),
        };
        path_to_markdown(path)
    }

    /// Assemble the document.
    pub fn render_markdown(
        &self,
        rows: &[ReportRow],
        corpus_summary: &str,
        pie_chart: &ImageHandle,
        positive_cloud: &ImageHandle,
        negative_cloud: &ImageHandle,
    ) -> String {
        let mut md = Vec::new();

        md.push(format!("# {TITLE}"));
        md.push("\n## Table of Summaries and Sentiments\n".to_string());

        md.push("| Sr.No | Para Number | Summary | Sentiment |".to_string());
        md.push("|-------|------------|---------|-----------|".to_string());
        for row in rows {
            md.push(format!(
                "| {} | {} | {} | {} |",
                escape_cell(&row.key),
                escape_cell(&row.locator),
                escape_cell(&row.summary),
                escape_cell(&row.sentiment)
            ));
        }

        md.push("\n## Overall Summary\n".to_string());
        md.push(corpus_summary.to_string());

        md.push("\n## Visualizations\n".to_string());
        md.push(format!("### Sentiment Pie Chart\n![]({})\n", self.image_ref(pie_chart)));
        md.push(format!("### Positive Wordcloud\n![]({})\n", self.image_ref(positive_cloud)));
        md.push(format!("### Negative Wordcloud\n![]({})\n", self.image_ref(negative_cloud)));

        md.join("\n")
    }
}

impl Reporter for MarkdownReporter {
    fn report(
        &self,
        enriched: &[EnrichedRecord],
        schema: &Schema,
        corpus_summary: &CorpusSummary,
        render: &dyn RenderSink,
    ) -> Result<ReportArtifact> {
        let rows: Vec<ReportRow> = enriched.iter().map(ReportRow::from_enriched).collect();

        let pie_chart = render.pie_chart(&label_counts(enriched))?;
        let positive_cloud = render.word_cloud(
            &SentimentLabel::Positive,
            &texts_with_label(enriched, &SentimentLabel::Positive),
        )?;
        let negative_cloud = render.word_cloud(
            &SentimentLabel::Negative,
            &texts_with_label(enriched, &SentimentLabel::Negative),
        )?;

        let markdown = self.render_markdown(
            &rows,
            corpus_summary.as_str(),
            &pie_chart,
            &positive_cloud,
            &negative_cloud,
        );

        Ok(ReportArtifact {
            columns: table_columns(schema),
            rows,
            corpus_summary: corpus_summary.as_str().to_string(),
            pie_chart,
            positive_cloud,
            negative_cloud,
            markdown,
        })
    }
}

/// Keep a value inside one Markdown table cell.
fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}

fn path_to_markdown(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/").replace(' ', "%20")
}
