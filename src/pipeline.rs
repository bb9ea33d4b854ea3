//! Stage wiring: extraction, stitching, enrichment, reporting.
//!
//! [`PipelineContext`] holds the oracle handles and is built once per process.
//! [`run_document`] is the direct entry point for a PDF on disk;
//! [`analyze_bytes`] serves callers that hold the upload in memory. Both share
//! [`process`], which never touches the output directory itself.

use std::path::Path;
use std::sync::{Arc, OnceLock};

use crate::config::PipelineConfig;
use crate::enrich::Enricher;
use crate::error::Result;
use crate::extract::{collect_fragments, PdfTableSource, TableSource};
use crate::oracle::{InferenceClient, SentimentClassifier, Summarizer};
use crate::render::{GlyphFont, PngRenderSink, RenderSink};
use crate::report::{MarkdownReporter, ReportArtifact, Reporter};
use crate::table::TableStitcher;

/// Oracle handles and configuration shared by every stage of a run.
pub struct PipelineContext {
    summarizer: Box<dyn Summarizer>,
    classifier: Box<dyn SentimentClassifier>,
    config: PipelineConfig,
    font: OnceLock<GlyphFont>,
}

impl PipelineContext {
    /// Create a context from explicit oracles.
    pub fn new(
        summarizer: Box<dyn Summarizer>,
        classifier: Box<dyn SentimentClassifier>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            summarizer,
            classifier,
            config,
            font: OnceLock::new(),
        }
    }

    /// Create a context that talks to the configured inference endpoint.
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        log::info!(
            "Using summarization model '{}' and sentiment model '{}' at {}",
            config.summary_model,
            config.sentiment_model,
            config.endpoint
        );
        let client = Arc::new(InferenceClient::from_config(config)?);
        Ok(Self::shared(client, config.clone()))
    }

    /// Create a context whose summarizer and classifier are one oracle.
    pub fn shared<O>(oracle: Arc<O>, config: PipelineConfig) -> Self
    where
        O: Summarizer + SentimentClassifier + 'static,
    {
        Self::new(Box::new(Arc::clone(&oracle)), Box::new(oracle), config)
    }

    /// Use `font` for rendering instead of looking one up.
    pub fn with_font(self, font: GlyphFont) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(font);
        Self { font: cell, ..self }
    }

    /// Configuration of this context.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Summarization oracle.
    pub fn summarizer(&self) -> &dyn Summarizer {
        self.summarizer.as_ref()
    }

    /// Sentiment oracle.
    pub fn classifier(&self) -> &dyn SentimentClassifier {
        self.classifier.as_ref()
    }

    fn font(&self) -> &GlyphFont {
        self.font
            .get_or_init(|| GlyphFont::load(self.config.font_path.as_deref()))
    }
}

/// Run every stage over `source`, rendering through `render`.
///
/// Nothing is persisted here; fatal errors surface before any report exists.
pub fn process(
    ctx: &PipelineContext,
    source: &mut dyn TableSource,
    render: &dyn RenderSink,
    reporter: &dyn Reporter,
) -> Result<ReportArtifact> {
    let fragments = collect_fragments(source)?;
    let stitched = TableStitcher::stitch(fragments)?;

    let enricher = Enricher::new(ctx.summarizer(), ctx.classifier(), ctx.config.budget);
    let outcome = enricher.enrich(&stitched.records, &stitched.schema)?;
    if !outcome.failures.is_empty() {
        log::warn!("{} record(s) dropped during enrichment", outcome.failures.len());
    }

    reporter.report(
        &outcome.records,
        &stitched.schema,
        &outcome.corpus_summary,
        render,
    )
}

/// Process the PDF at `input` and write the report set into `out_dir`.
pub fn run_document(
    ctx: &PipelineContext,
    input: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
) -> Result<ReportArtifact> {
    let mut source = PdfTableSource::open(input)?;
    run_source(ctx, &mut source, out_dir.as_ref())
}

/// Process an in-memory PDF and write the report set into `out_dir`.
///
/// Returns the same artifact as [`run_document`]; its `markdown` field is the
/// report text.
pub fn analyze_bytes(
    ctx: &PipelineContext,
    bytes: &[u8],
    out_dir: impl AsRef<Path>,
) -> Result<ReportArtifact> {
    let mut source = PdfTableSource::from_bytes(bytes)?;
    run_source(ctx, &mut source, out_dir.as_ref())
}

/// Process any table source and write the report set into `out_dir`.
pub fn run_source(
    ctx: &PipelineContext,
    source: &mut dyn TableSource,
    out_dir: &Path,
) -> Result<ReportArtifact> {
    std::fs::create_dir_all(out_dir)?;

    let sink = PngRenderSink::with_font(out_dir, &ctx.config, ctx.font().clone());
    let reporter = MarkdownReporter::relative_to(out_dir);

    let artifact = process(ctx, source, &sink, &reporter)?;
    artifact.persist(out_dir, &ctx.config.outputs)?;
    Ok(artifact)
}
