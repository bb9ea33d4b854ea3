//! Table extraction from PDF pages.
//!
//! A [`TableSource`] hands out raw table fragments page by page. The PDF
//! implementation rebuilds tables from positioned text spans (see [`grid`]);
//! [`MemoryTableSource`] serves pre-built fragments.

pub mod grid;
mod pdf;

pub use grid::{GridOptions, PlacedText, TableGrid};
pub use pdf::PdfTableSource;

use crate::error::Result;
use crate::table::RawTableFragment;

/// Anything that can produce raw table fragments per page.
pub trait TableSource {
    /// Number of pages.
    fn page_count(&mut self) -> Result<usize>;

    /// Tables found on a zero-based page, top to bottom.
    fn extract_tables(&mut self, page: usize) -> Result<Vec<RawTableFragment>>;
}

/// Fragments for every page, in page order then table order.
///
/// A page whose extraction fails is logged and skipped.
pub fn collect_fragments(source: &mut dyn TableSource) -> Result<Vec<RawTableFragment>> {
    let pages = source.page_count()?;
    let mut fragments = Vec::new();

    for page in 0..pages {
        match source.extract_tables(page) {
            Ok(tables) => {
                log::debug!("Page {}: {} table(s)", page + 1, tables.len());
                fragments.extend(tables);
            },
            Err(e) => {
                log::warn!("Skipping page {}: table extraction failed: {}", page + 1, e);
            },
        }
    }

    Ok(fragments)
}

/// In-memory source: one list of fragments per page.
#[derive(Debug, Clone, Default)]
pub struct MemoryTableSource {
    pages: Vec<Vec<RawTableFragment>>,
}

impl MemoryTableSource {
    /// Create a source from per-page fragments.
    pub fn new(pages: Vec<Vec<RawTableFragment>>) -> Self {
        Self { pages }
    }
}

impl TableSource for MemoryTableSource {
    fn page_count(&mut self) -> Result<usize> {
        Ok(self.pages.len())
    }

    fn extract_tables(&mut self, page: usize) -> Result<Vec<RawTableFragment>> {
        Ok(self.pages.get(page).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FlakySource;

    impl TableSource for FlakySource {
        fn page_count(&mut self) -> Result<usize> {
            Ok(3)
        }

        fn extract_tables(&mut self, page: usize) -> Result<Vec<RawTableFragment>> {
            if page == 1 {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "broken content stream",
                )));
            }
            Ok(vec![RawTableFragment::from_rows(vec![vec![format!("page {page}")]])])
        }
    }

    #[test]
    fn test_collect_preserves_page_order() {
        let mut source = MemoryTableSource::new(vec![
            vec![
                RawTableFragment::from_rows(vec![vec!["a"]]),
                RawTableFragment::from_rows(vec![vec!["b"]]),
            ],
            vec![],
            vec![RawTableFragment::from_rows(vec![vec!["c"]])],
        ]);

        let fragments = collect_fragments(&mut source).unwrap();
        let firsts: Vec<_> = fragments
            .iter()
            .map(|f| f.rows[0][0].clone().unwrap())
            .collect();
        assert_eq!(firsts, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_collect_skips_failed_pages() {
        let fragments = collect_fragments(&mut FlakySource).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[1].rows[0][0].as_deref(), Some("page 2"));
    }
}
