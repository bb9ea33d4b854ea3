//! Visualizations: the sentiment pie chart and per-sentiment word clouds.
//!
//! The pipeline talks to a [`RenderSink`]. [`PngRenderSink`] rasterises with
//! `tiny-skia` and writes PNG files into the output directory.
//!
//! ## Example
//!
//! ```ignore
//! use comment_report::render::{PngRenderSink, RenderSink};
//! use std::collections::BTreeMap;
//!
//! let sink = PngRenderSink::new("out", &Default::default());
//! let counts = BTreeMap::from([("POSITIVE".to_string(), 3), ("NEGATIVE".to_string(), 1)]);
//! let handle = sink.pie_chart(&counts)?;
//! println!("{}", handle.path.display());
//! ```

pub mod cloud;
pub mod font;
pub mod pie;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tiny_skia::Pixmap;

pub use font::GlyphFont;

use crate::config::{OutputNames, PipelineConfig};
use crate::error::{Error, Result};
use crate::oracle::SentimentLabel;

/// A rendered image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    /// Where the image lives
    pub path: PathBuf,
    /// True when there was nothing to draw and a blank image stands in
    pub placeholder: bool,
}

/// Produces image artifacts for the report.
pub trait RenderSink {
    /// Pie chart over sentiment label counts, one slice per label.
    fn pie_chart(&self, label_counts: &BTreeMap<String, usize>) -> Result<ImageHandle>;

    /// Word cloud over the texts of one sentiment. Empty `texts` must yield a
    /// placeholder image, not an error.
    fn word_cloud(&self, label: &SentimentLabel, texts: &[String]) -> Result<ImageHandle>;
}

/// Title drawn above a word cloud.
pub fn cloud_title(label: &SentimentLabel) -> String {
    format!("{} Suggestions Word Cloud", label)
}

/// Writes PNG images into a directory.
pub struct PngRenderSink {
    dir: PathBuf,
    names: OutputNames,
    chart_size: u32,
    cloud_size: (u32, u32),
    font: GlyphFont,
}

impl PngRenderSink {
    /// Create a sink writing into `dir`, loading the configured font.
    pub fn new(dir: impl Into<PathBuf>, config: &PipelineConfig) -> Self {
        Self::with_font(dir, config, GlyphFont::load(config.font_path.as_deref()))
    }

    /// Create a sink with an explicit font.
    pub fn with_font(dir: impl Into<PathBuf>, config: &PipelineConfig, font: GlyphFont) -> Self {
        Self {
            dir: dir.into(),
            names: config.outputs.clone(),
            chart_size: config.chart_size,
            cloud_size: config.cloud_size,
            font,
        }
    }

    /// Directory images are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn cloud_file(&self, label: &SentimentLabel) -> String {
        match label {
            SentimentLabel::Positive => self.names.positive_cloud.clone(),
            SentimentLabel::Negative => self.names.negative_cloud.clone(),
            SentimentLabel::Other(other) => {
                let stem: String = other
                    .chars()
                    .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
                    .collect();
                format!("{stem}_wordcloud.png")
            },
        }
    }

    fn write(&self, pixmap: &Pixmap, name: &str, placeholder: bool) -> Result<ImageHandle> {
        let path = self.dir.join(name);
        let png = pixmap
            .encode_png()
            .map_err(|e| Error::Render(format!("{name}: PNG encoding failed: {e}")))?;
        std::fs::write(&path, png)
            .map_err(|e| Error::Render(format!("{}: {}", path.display(), e)))?;

        log::info!("Saved {}", path.display());
        Ok(ImageHandle { path, placeholder })
    }
}

fn new_pixmap(width: u32, height: u32, what: &str) -> Result<Pixmap> {
    Pixmap::new(width, height)
        .ok_or_else(|| Error::Render(format!("{what}: invalid image size {width}x{height}")))
}

impl RenderSink for PngRenderSink {
    fn pie_chart(&self, label_counts: &BTreeMap<String, usize>) -> Result<ImageHandle> {
        let mut pixmap = new_pixmap(self.chart_size, self.chart_size, "pie chart")?;
        pie::draw(&mut pixmap, label_counts, &self.font);
        let empty = label_counts.values().all(|c| *c == 0);
        self.write(&pixmap, &self.names.pie_chart, empty)
    }

    fn word_cloud(&self, label: &SentimentLabel, texts: &[String]) -> Result<ImageHandle> {
        let (width, height) = self.cloud_size;
        let mut pixmap = new_pixmap(width, height, "word cloud")?;
        let drawn = cloud::draw(&mut pixmap, &cloud_title(label), texts, &self.font);
        if !drawn {
            log::info!("No {} words to draw; writing placeholder cloud", label);
        }
        self.write(&pixmap, &self.cloud_file(label), !drawn)
    }
}

/// Colours shared by the chart and the clouds.
pub(crate) mod palette {
    use tiny_skia::Color;

    /// Qualitative colours for chart slices.
    const CATEGORY: [(u8, u8, u8); 10] = [
        (0x1f, 0x77, 0xb4),
        (0xff, 0x7f, 0x0e),
        (0x2c, 0xa0, 0x2c),
        (0xd6, 0x27, 0x28),
        (0x94, 0x67, 0xbd),
        (0x8c, 0x56, 0x4b),
        (0xe3, 0x77, 0xc2),
        (0x7f, 0x7f, 0x7f),
        (0xbc, 0xbd, 0x22),
        (0x17, 0xbe, 0xcf),
    ];

    /// Dark purple through teal to yellow-green.
    const RAMP: [(u8, u8, u8); 5] = [
        (0x44, 0x01, 0x54),
        (0x3b, 0x52, 0x8b),
        (0x21, 0x91, 0x8c),
        (0x5e, 0xc9, 0x62),
        (0xb5, 0xde, 0x2b),
    ];

    pub fn category(index: usize) -> Color {
        let (r, g, b) = CATEGORY[index % CATEGORY.len()];
        Color::from_rgba8(r, g, b, 255)
    }

    /// Colour for item `index` of `count`, spread along the ramp.
    pub fn sequential(index: usize, count: usize) -> Color {
        let slot = if count <= 1 {
            0
        } else {
            index * (RAMP.len() - 1) / (count - 1)
        };
        let (r, g, b) = RAMP[slot.min(RAMP.len() - 1)];
        Color::from_rgba8(r, g, b, 255)
    }
}
