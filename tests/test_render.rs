//! Integration tests for the PNG render sink.

use std::collections::BTreeMap;

use comment_report::oracle::SentimentLabel;
use comment_report::render::{GlyphFont, PngRenderSink, RenderSink};
use comment_report::PipelineConfig;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn sink(dir: &std::path::Path) -> PngRenderSink {
    PngRenderSink::with_font(dir, &PipelineConfig::default(), GlyphFont::blocks())
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================================
// Pie chart
// ============================================================================

#[test]
fn test_pie_chart_written() {
    let dir = tempfile::tempdir().unwrap();
    let counts = BTreeMap::from([("POSITIVE".to_string(), 3), ("NEGATIVE".to_string(), 1)]);

    let handle = sink(dir.path()).pie_chart(&counts).unwrap();

    assert_eq!(handle.path, dir.path().join("sentiment_pie.png"));
    assert!(!handle.placeholder);
    let bytes = std::fs::read(&handle.path).unwrap();
    assert!(bytes.starts_with(PNG_MAGIC));
}

#[test]
fn test_pie_chart_without_counts_is_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let handle = sink(dir.path()).pie_chart(&BTreeMap::new()).unwrap();
    assert!(handle.placeholder);
    assert!(handle.path.exists());
}

// ============================================================================
// Word clouds
// ============================================================================

#[test]
fn test_word_cloud_written() {
    let dir = tempfile::tempdir().unwrap();
    let handle = sink(dir.path())
        .word_cloud(
            &SentimentLabel::Positive,
            &texts(&["Reduce tax for small traders", "Tax relief for farmers"]),
        )
        .unwrap();

    assert_eq!(handle.path, dir.path().join("positive_wordcloud.png"));
    assert!(!handle.placeholder);
    assert!(std::fs::read(&handle.path).unwrap().starts_with(PNG_MAGIC));
}

#[test]
fn test_empty_word_cloud_is_placeholder_not_error() {
    let dir = tempfile::tempdir().unwrap();
    let handle = sink(dir.path())
        .word_cloud(&SentimentLabel::Negative, &[])
        .unwrap();

    assert_eq!(handle.path, dir.path().join("negative_wordcloud.png"));
    assert!(handle.placeholder);
    assert!(handle.path.exists());
}

#[test]
fn test_other_label_gets_own_file() {
    let dir = tempfile::tempdir().unwrap();
    let handle = sink(dir.path())
        .word_cloud(&SentimentLabel::Other("NEUTRAL".into()), &texts(&["keep as is"]))
        .unwrap();
    assert_eq!(handle.path, dir.path().join("neutral_wordcloud.png"));
}

#[test]
fn test_missing_directory_is_render_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("does-not-exist");
    let result = sink(&missing).word_cloud(&SentimentLabel::Positive, &texts(&["tax"]));
    assert!(matches!(result, Err(comment_report::Error::Render(_))));
}
