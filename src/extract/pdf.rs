//! PDF-backed table source.

use std::io::Write;
use std::path::Path;

use pdf_oxide::PdfDocument;

use super::grid::{GridOptions, PlacedText, TableGrid};
use super::TableSource;
use crate::error::Result;
use crate::table::RawTableFragment;

/// Reads tables out of a PDF using the positioned spans of each page.
///
/// Pages are expected in document order, as [`super::collect_fragments`]
/// requests them, so tables can continue across page breaks.
pub struct PdfTableSource {
    doc: PdfDocument,
    grid: TableGrid,
    // Keeps a spooled byte-stream input alive while the document is open.
    _spool: Option<tempfile::NamedTempFile>,
}

impl PdfTableSource {
    /// Open a PDF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Opening {}", path.display());
        Ok(Self {
            doc: PdfDocument::open(path)?,
            grid: TableGrid::default(),
            _spool: None,
        })
    }

    /// Open a PDF held in memory, e.g. an uploaded file.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut spool = tempfile::Builder::new().suffix(".pdf").tempfile()?;
        spool.write_all(bytes)?;
        spool.flush()?;
        log::debug!("Spooled {} byte(s) to {}", bytes.len(), spool.path().display());

        Ok(Self {
            doc: PdfDocument::open(spool.path())?,
            grid: TableGrid::default(),
            _spool: Some(spool),
        })
    }

    /// Override grid reconstruction options.
    pub fn with_options(mut self, options: GridOptions) -> Self {
        self.grid = TableGrid::new(options);
        self
    }
}

impl TableSource for PdfTableSource {
    fn page_count(&mut self) -> Result<usize> {
        Ok(self.doc.page_count()?)
    }

    fn extract_tables(&mut self, page: usize) -> Result<Vec<RawTableFragment>> {
        let spans: Vec<PlacedText> = self
            .doc
            .extract_spans(page)?
            .into_iter()
            .map(|span| {
                PlacedText::new(
                    span.text,
                    span.bbox.x,
                    span.bbox.y,
                    span.bbox.width,
                    span.bbox.height,
                )
            })
            .collect();

        Ok(self.grid.page(&spans))
    }
}
