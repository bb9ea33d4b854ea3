//! Configuration for a report run.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default Hugging Face style inference endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api-inference.huggingface.co";

/// Default summarization model.
pub const DEFAULT_SUMMARY_MODEL: &str = "facebook/bart-large-cnn";

/// Default sentiment model.
pub const DEFAULT_SENTIMENT_MODEL: &str = "distilbert-base-uncased-finetuned-sst-2-english";

/// Word budgets handed to the summarization oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryBudget {
    /// Upper bound for a per-record summary.
    pub record_max_words: usize,
    /// Upper bound for the corpus summary.
    pub corpus_max_words: usize,
    /// Lower bound requested for every summary.
    pub min_words: usize,
}

impl Default for SummaryBudget {
    fn default() -> Self {
        Self {
            record_max_words: 60,
            corpus_max_words: 100,
            min_words: 15,
        }
    }
}

/// Names of the files written into the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNames {
    /// Markdown report
    pub report: String,
    /// Delimited row set
    pub table: String,
    /// Sentiment distribution chart
    pub pie_chart: String,
    /// Word cloud of positive comments
    pub positive_cloud: String,
    /// Word cloud of negative comments
    pub negative_cloud: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            report: "report.md".to_string(),
            table: "formatted_tables_combined.csv".to_string(),
            pie_chart: "sentiment_pie.png".to_string(),
            positive_cloud: "positive_wordcloud.png".to_string(),
            negative_cloud: "negative_wordcloud.png".to_string(),
        }
    }
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Summary word budgets.
    pub budget: SummaryBudget,

    /// Timeout applied to every oracle call.
    pub oracle_timeout: Duration,

    /// Base URL of the inference service.
    pub endpoint: String,

    /// Bearer token for the inference service, if it needs one.
    pub api_token: Option<String>,

    /// Model used for summaries.
    pub summary_model: String,

    /// Model used for sentiment classification.
    pub sentiment_model: String,

    /// Output file names.
    pub outputs: OutputNames,

    /// Pie chart edge length in pixels.
    pub chart_size: u32,

    /// Word cloud width and height in pixels.
    pub cloud_size: (u32, u32),

    /// Font used for chart labels and cloud words. A system sans-serif font is
    /// used when unset.
    pub font_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create new configuration with defaults.
    pub fn new() -> Self {
        Self {
            budget: SummaryBudget::default(),
            oracle_timeout: Duration::from_secs(120),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            sentiment_model: DEFAULT_SENTIMENT_MODEL.to_string(),
            outputs: OutputNames::default(),
            chart_size: 600,
            cloud_size: (400, 200),
            font_path: None,
        }
    }

    /// Defaults overridden by the `COMMENT_REPORT_*` environment variables.
    ///
    /// Only model selection and the inference endpoint are read from the
    /// environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::new();

        if let Some(endpoint) = lookup("COMMENT_REPORT_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(model) = lookup("COMMENT_REPORT_SUMMARY_MODEL") {
            config.summary_model = model;
        }
        if let Some(model) = lookup("COMMENT_REPORT_SENTIMENT_MODEL") {
            config.sentiment_model = model;
        }
        if let Some(token) = lookup("COMMENT_REPORT_API_TOKEN") {
            if !token.trim().is_empty() {
                config.api_token = Some(token);
            }
        }
        if let Some(secs) = lookup("COMMENT_REPORT_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("COMMENT_REPORT_TIMEOUT_SECS is not a number: {secs}"))
            })?;
            if secs == 0 {
                return Err(Error::Config("COMMENT_REPORT_TIMEOUT_SECS must be positive".into()));
            }
            config.oracle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Set the inference endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the per-call oracle timeout.
    pub fn with_oracle_timeout(mut self, timeout: Duration) -> Self {
        self.oracle_timeout = timeout;
        self
    }

    /// Set the summary word budgets.
    pub fn with_budget(mut self, budget: SummaryBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Set output file names.
    pub fn with_outputs(mut self, outputs: OutputNames) -> Self {
        self.outputs = outputs;
        self
    }

    /// Use a specific font file for rendering.
    pub fn with_font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.budget.record_max_words, 60);
        assert_eq!(config.budget.corpus_max_words, 100);
        assert_eq!(config.budget.min_words, 15);
        assert_eq!(config.summary_model, DEFAULT_SUMMARY_MODEL);
        assert_eq!(config.outputs.report, "report.md");
    }

    #[test]
    fn test_env_overrides_models() {
        let config = PipelineConfig::from_lookup(lookup(&[
            ("COMMENT_REPORT_SUMMARY_MODEL", "sshleifer/distilbart-cnn-12-6"),
            ("COMMENT_REPORT_ENDPOINT", "http://localhost:8080"),
            ("COMMENT_REPORT_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        assert_eq!(config.summary_model, "sshleifer/distilbart-cnn-12-6");
        assert_eq!(config.sentiment_model, DEFAULT_SENTIMENT_MODEL);
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.oracle_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_blank_token_ignored() {
        let config =
            PipelineConfig::from_lookup(lookup(&[("COMMENT_REPORT_API_TOKEN", "  ")])).unwrap();
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_bad_timeout_rejected() {
        let result = PipelineConfig::from_lookup(lookup(&[("COMMENT_REPORT_TIMEOUT_SECS", "soon")]));
        assert!(matches!(result, Err(Error::Config(_))));

        let result = PipelineConfig::from_lookup(lookup(&[("COMMENT_REPORT_TIMEOUT_SECS", "0")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
