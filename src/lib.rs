// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::type_complexity)]
#![allow(clippy::too_many_arguments)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # Comment Report
//!
//! Batch pipeline that turns a PDF of tabular public comments into a
//! summarized, sentiment-scored report.
//!
//! ## Stages
//!
//! 1. **Extraction**: positioned text from each page is rebuilt into raw table
//!    fragments ([`extract`]).
//! 2. **Stitching**: fragments are merged into schema-aligned logical records,
//!    folding continuation rows into the record they belong to ([`table`]).
//! 3. **Enrichment**: every record is summarized and sentiment-classified, and a
//!    corpus summary is computed over all record summaries ([`enrich`]).
//! 4. **Reporting**: a CSV row set, three PNG visualizations and a Markdown
//!    report are written ([`report`], [`render`]).
//!
//! The summarization model, the sentiment classifier and the image renderer are
//! capability traits ([`oracle::Summarizer`], [`oracle::SentimentClassifier`],
//! [`render::RenderSink`]) held by a [`PipelineContext`].
//!
//! ## Quick Start
//!
//! ```ignore
//! use comment_report::{PipelineConfig, PipelineContext};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::from_env()?;
//! let ctx = PipelineContext::from_config(&config)?;
//! let artifact = comment_report::run_document(&ctx, "econsult.pdf", "out")?;
//! println!("{}", artifact.markdown);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Raw fragments, schema and record stitching
pub mod table;

// PDF table extraction
pub mod extract;

// Summarization and sentiment capabilities
pub mod oracle;

// Per-record enrichment and corpus summary
pub mod enrich;

// Charts and word clouds
pub mod render;

// CSV and Markdown report assembly
pub mod report;

// Stage wiring and entry points
pub mod pipeline;

// Re-exports
pub use config::PipelineConfig;
pub use enrich::{CorpusSummary, EnrichOutcome, EnrichedRecord, Enricher};
pub use error::{Error, Result};
pub use pipeline::{analyze_bytes, run_document, PipelineContext};
pub use report::ReportArtifact;
pub use table::{LogicalRecord, RawTableFragment, Schema, TableStitcher};
