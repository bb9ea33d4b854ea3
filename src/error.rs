//! Error types for the report pipeline.
//!
//! Fatal failures abort a run and surface as [`Error`]. Oracle failures are
//! described by [`OracleError`]; the enricher catches them per record, so they
//! only reach a caller through [`crate::enrich::EnrichmentFailure`].

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fatal errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No fragment ever provided a usable header row
    #[error("No table with a header row and at least one data row was found")]
    Schema,

    /// Every record failed enrichment, so there is nothing to summarize
    #[error("No records survived enrichment; corpus summary is impossible")]
    NoData,

    /// The corpus summary could not be produced
    #[error("Corpus summarization failed: {0}")]
    CorpusSummary(#[source] OracleError),

    /// A visualization could not be produced
    #[error("Render error: {0}")]
    Render(String),

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// PDF could not be opened or parsed
    #[error("PDF error: {0}")]
    Pdf(#[from] pdf_oxide::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures raised by a summarization or sentiment oracle.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OracleError {
    /// The call did not finish within the configured timeout
    #[error("Request timed out after {0}s")]
    Timeout(u64),

    /// The inference endpoint could not be reached
    #[error("Cannot connect to inference endpoint at {0}")]
    Connection(String),

    /// Any other transport-level failure
    #[error("HTTP client error: {0}")]
    Transport(String),

    /// The endpoint answered with a non-success status
    #[error("Inference endpoint returned {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// The response did not have the expected shape
    #[error("Unexpected inference response: {0}")]
    Response(String),

    /// The oracle was asked to process empty text
    #[error("Empty input text")]
    EmptyInput,
}
