//! Stub oracles and sinks shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use comment_report::error::{Error, OracleError, Result};
use comment_report::oracle::{Sentiment, SentimentClassifier, SentimentLabel, Summarizer};
use comment_report::render::{ImageHandle, RenderSink};
use comment_report::render::GlyphFont;
use comment_report::table::RawTableFragment;
use comment_report::{PipelineConfig, PipelineContext};

pub const HEADER: [&str; 4] = ["Sr.No", "Para", "Suggestion", "Justification"];

/// Fragment with the standard header followed by `rows`.
pub fn fragment(rows: &[[&str; 4]]) -> RawTableFragment {
    let mut all = vec![HEADER.to_vec()];
    all.extend(rows.iter().map(|r| r.to_vec()));
    RawTableFragment::from_rows(all)
}

/// Context with stub oracles and block glyphs, so no network or system font
/// is needed.
pub fn stub_context() -> PipelineContext {
    PipelineContext::new(
        Box::new(EchoSummarizer::default()),
        Box::new(KeywordClassifier::default()),
        PipelineConfig::default(),
    )
    .with_font(GlyphFont::blocks())
}

/// Keeps the first few words and records every budget it was given.
#[derive(Default)]
pub struct EchoSummarizer {
    pub calls: RefCell<Vec<(String, usize, usize)>>,
    pub fail_on: Option<String>,
}

impl EchoSummarizer {
    pub fn failing_on(needle: &str) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail_on: Some(needle.to_string()),
        }
    }
}

impl Summarizer for EchoSummarizer {
    fn summarize(
        &self,
        text: &str,
        min_words: usize,
        max_words: usize,
    ) -> std::result::Result<String, OracleError> {
        self.calls
            .borrow_mut()
            .push((text.to_string(), min_words, max_words));
        if let Some(needle) = &self.fail_on {
            if text.contains(needle.as_str()) {
                return Err(OracleError::Timeout(30));
            }
        }
        Ok(text.split_whitespace().take(4).collect::<Vec<_>>().join(" "))
    }
}

/// NEGATIVE when the text mentions "increase", POSITIVE otherwise.
#[derive(Default)]
pub struct KeywordClassifier {
    pub fail_on: Option<String>,
}

impl SentimentClassifier for KeywordClassifier {
    fn classify(&self, text: &str) -> std::result::Result<Sentiment, OracleError> {
        if let Some(needle) = &self.fail_on {
            if text.contains(needle.as_str()) {
                return Err(OracleError::Http {
                    status: 500,
                    body: "boom".to_string(),
                });
            }
        }
        let label = if text.to_lowercase().contains("increase") {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Positive
        };
        Ok(Sentiment::new(label, 0.9))
    }
}

/// Render call as seen by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCall {
    Pie(BTreeMap<String, usize>),
    Cloud(SentimentLabel, Vec<String>),
}

/// Remembers render requests; optionally fails word clouds.
#[derive(Default)]
pub struct RecordingSink {
    pub calls: RefCell<Vec<RenderCall>>,
    pub fail_clouds: bool,
}

impl RenderSink for RecordingSink {
    fn pie_chart(&self, label_counts: &BTreeMap<String, usize>) -> Result<ImageHandle> {
        self.calls
            .borrow_mut()
            .push(RenderCall::Pie(label_counts.clone()));
        Ok(ImageHandle {
            path: PathBuf::from("pie.png"),
            placeholder: false,
        })
    }

    fn word_cloud(&self, label: &SentimentLabel, texts: &[String]) -> Result<ImageHandle> {
        if self.fail_clouds {
            return Err(Error::Render("cloud renderer unavailable".to_string()));
        }
        self.calls
            .borrow_mut()
            .push(RenderCall::Cloud(label.clone(), texts.to_vec()));
        Ok(ImageHandle {
            path: PathBuf::from(format!("{}.png", label.as_str().to_lowercase())),
            placeholder: texts.is_empty(),
        })
    }
}
