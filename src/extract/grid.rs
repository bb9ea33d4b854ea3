//! Rebuild table fragments from positioned text.
//!
//! Spans are clustered into lines by vertical position. The first line with
//! enough horizontally separated cells becomes the header; the left edges of
//! its cells are the column anchors. Each later line becomes a data row, with
//! every span dropped into the right-most anchor at or left of its start.
//! A vertical gap much larger than the typical line height ends the table, and
//! the search for the next header starts again below it.
//!
//! Wrapped cell text shows up as extra lines whose first column is empty,
//! which is exactly the continuation shape the stitcher folds back together.
//! [`TableGrid`] carries the columns of the last table from page to page, so
//! the same holds for text wrapped over a page break.

use crate::table::{RawCell, RawTableFragment};

/// A run of text with its bounding box in page space (y grows upwards).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    /// Text content
    pub text: String,
    /// Left edge
    pub x: f32,
    /// Baseline-ish vertical position
    pub y: f32,
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl PlacedText {
    /// Create a placed span.
    pub fn new(text: impl Into<String>, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            width,
            height,
        }
    }

    fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Tuning knobs for grid reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    /// Vertical distance within which spans share a line. Half the median span
    /// height when unset.
    pub line_tolerance: Option<f32>,
    /// Horizontal gap below which neighbouring header spans form one cell.
    pub column_gap: f32,
    /// Slack when comparing a span start with a column anchor.
    pub anchor_tolerance: f32,
    /// Cells a line needs to count as a header.
    pub min_columns: usize,
    /// Line gap, in median span heights, that ends a table.
    pub table_break: f32,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            line_tolerance: None,
            column_gap: 12.0,
            anchor_tolerance: 3.0,
            min_columns: 2,
            table_break: 4.0,
        }
    }
}

/// Rebuild the tables on one page, with no knowledge of earlier pages.
pub fn build_fragments(spans: &[PlacedText], options: &GridOptions) -> Vec<RawTableFragment> {
    TableGrid::new(options.clone()).page(spans)
}

/// Header text and column anchors of the last table seen.
#[derive(Debug, Clone, PartialEq)]
struct OpenTable {
    header: Vec<String>,
    anchors: Vec<f32>,
}

impl OpenTable {
    fn header_row(&self) -> Vec<RawCell> {
        self.header.iter().cloned().map(Some).collect()
    }

    /// True when `line` reads as more rows of this table rather than a header.
    ///
    /// A line repeating the header text starts a fresh fragment. Any other
    /// line whose cells all start within `slack` of an anchor continues the
    /// table.
    fn continued_by(&self, line: &Line<'_>, gap: f32, slack: f32) -> bool {
        let cells = merge_cells(&line.spans, gap);
        let repeats_header = self
            .header
            .iter()
            .map(String::as_str)
            .eq(cells.iter().map(|(_, text)| text.as_str()));
        if repeats_header {
            return false;
        }
        cells
            .iter()
            .all(|(x, _)| self.anchors.iter().any(|anchor| (anchor - x).abs() <= slack))
    }
}

/// Page-by-page table reconstruction.
///
/// Pages must be fed in document order. The columns of the last table are
/// remembered, so a table that runs onto the next page without repeating its
/// header keeps its layout: the lines at the top of that page become data
/// rows of a fragment headed by the remembered header.
#[derive(Debug, Clone, Default)]
pub struct TableGrid {
    options: GridOptions,
    open: Option<OpenTable>,
}

impl TableGrid {
    /// Create a grid with no table open.
    pub fn new(options: GridOptions) -> Self {
        Self {
            options,
            open: None,
        }
    }

    /// Reconstruction options.
    pub fn options(&self) -> &GridOptions {
        &self.options
    }

    /// Rebuild the tables on the next page.
    pub fn page(&mut self, spans: &[PlacedText]) -> Vec<RawTableFragment> {
        let spans: Vec<&PlacedText> = spans.iter().filter(|s| !s.text.trim().is_empty()).collect();
        if spans.is_empty() {
            return vec![];
        }

        let options = &self.options;
        let height = median_height(&spans);
        let tolerance = options.line_tolerance.unwrap_or(height / 2.0);
        let lines = group_lines(spans, tolerance);

        let mut fragments = Vec::new();
        let mut i = 0;

        if let Some(open) = &self.open {
            if open.continued_by(&lines[0], options.column_gap, options.column_gap) {
                log::debug!(
                    "Table continues from the previous page under {} column(s)",
                    open.anchors.len()
                );
                let mut rows = vec![open.header_row()];
                i = table_rows(&lines, 0, None, &open.anchors, height, options, &mut rows);
                fragments.push(RawTableFragment::new(rows));
            }
        }

        while i < lines.len() {
            let header = merge_cells(&lines[i].spans, options.column_gap);
            if header.len() < options.min_columns {
                i += 1;
                continue;
            }

            let (anchors, texts): (Vec<f32>, Vec<String>) = header.into_iter().unzip();
            let mut rows = vec![texts.iter().cloned().map(Some).collect()];
            let header_y = lines[i].y;
            i = table_rows(&lines, i + 1, Some(header_y), &anchors, height, options, &mut rows);

            fragments.push(RawTableFragment::new(rows));
            self.open = Some(OpenTable {
                header: texts,
                anchors,
            });
        }

        fragments
    }
}

/// Append data rows from `lines[start..]` until a table break. Returns the
/// index of the first line not consumed.
fn table_rows(
    lines: &[Line<'_>],
    start: usize,
    mut last_y: Option<f32>,
    anchors: &[f32],
    height: f32,
    options: &GridOptions,
    rows: &mut Vec<Vec<RawCell>>,
) -> usize {
    let mut i = start;
    while i < lines.len() {
        if let Some(y) = last_y {
            if (y - lines[i].y).abs() > options.table_break * height {
                break;
            }
        }
        rows.push(assign_to_columns(&lines[i].spans, anchors, options.anchor_tolerance));
        last_y = Some(lines[i].y);
        i += 1;
    }
    i
}

struct Line<'a> {
    y: f32,
    spans: Vec<&'a PlacedText>,
}

fn median_height(spans: &[&PlacedText]) -> f32 {
    let mut heights: Vec<f32> = spans.iter().map(|s| s.height).filter(|h| *h > 0.0).collect();
    if heights.is_empty() {
        return 10.0;
    }
    heights.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    heights[heights.len() / 2]
}

/// Top-to-bottom lines, each sorted left to right.
fn group_lines(mut spans: Vec<&PlacedText>, tolerance: f32) -> Vec<Line<'_>> {
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines: Vec<Line> = Vec::new();
    for span in spans {
        match lines.last_mut() {
            Some(line) if (line.y - span.y).abs() <= tolerance => line.spans.push(span),
            _ => lines.push(Line {
                y: span.y,
                spans: vec![span],
            }),
        }
    }

    for line in &mut lines {
        line.spans
            .sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));
    }
    lines
}

/// Join spans closer than `gap` into cells of `(left edge, text)`.
fn merge_cells(spans: &[&PlacedText], gap: f32) -> Vec<(f32, String)> {
    let mut cells: Vec<(f32, f32, String)> = Vec::new();
    for span in spans {
        match cells.last_mut() {
            Some((_, right, text)) if span.x - *right < gap => {
                text.push(' ');
                text.push_str(span.text.trim());
                *right = right.max(span.right());
            },
            _ => cells.push((span.x, span.right(), span.text.trim().to_string())),
        }
    }
    cells.into_iter().map(|(x, _, text)| (x, text)).collect()
}

fn assign_to_columns(spans: &[&PlacedText], anchors: &[f32], tolerance: f32) -> Vec<RawCell> {
    let mut row: Vec<RawCell> = vec![None; anchors.len()];
    for span in spans {
        let column = anchors
            .iter()
            .rposition(|anchor| *anchor <= span.x + tolerance)
            .unwrap_or(0);
        let text = span.text.trim();
        match &mut row[column] {
            Some(cell) => {
                cell.push(' ');
                cell.push_str(text);
            },
            empty => *empty = Some(text.to_string()),
        }
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TableStitcher;

    fn span(text: &str, x: f32, y: f32) -> PlacedText {
        PlacedText::new(text, x, y, text.len() as f32 * 5.0, 10.0)
    }

    fn cells(row: &[RawCell]) -> Vec<&str> {
        row.iter().map(|c| c.as_deref().unwrap_or("")).collect()
    }

    #[test]
    fn test_header_and_rows() {
        let spans = vec![
            span("Sr.No", 10.0, 700.0),
            span("Para", 80.0, 700.0),
            span("Suggestion", 150.0, 700.0),
            span("1", 10.0, 685.0),
            span("1.1", 80.0, 685.0),
            span("Reduce", 150.0, 685.0),
            span("tax", 190.0, 685.0),
            span("further", 150.0, 672.0),
        ];

        let fragments = build_fragments(&spans, &GridOptions::default());
        assert_eq!(fragments.len(), 1);
        let rows = &fragments[0].rows;
        assert_eq!(cells(&rows[0]), vec!["Sr.No", "Para", "Suggestion"]);
        assert_eq!(cells(&rows[1]), vec!["1", "1.1", "Reduce tax"]);
        assert_eq!(rows[2][0], None);
        assert_eq!(cells(&rows[2]), vec!["", "", "further"]);
    }

    #[test]
    fn test_header_words_merge_into_one_cell() {
        let spans = vec![
            span("Para", 80.0, 700.0),
            span("Number", 103.0, 700.0),
            span("Sr.No", 10.0, 700.0),
        ];
        let fragments = build_fragments(&spans, &GridOptions::default());
        assert_eq!(cells(&fragments[0].rows[0]), vec!["Sr.No", "Para Number"]);
    }

    #[test]
    fn test_title_lines_before_header_ignored() {
        let spans = vec![
            span("Comments received", 10.0, 760.0),
            span("Sr.No", 10.0, 740.0),
            span("Para", 80.0, 740.0),
            span("2", 12.0, 728.0),
            span("3.1", 81.0, 728.0),
        ];
        let fragments = build_fragments(&spans, &GridOptions::default());
        assert_eq!(fragments.len(), 1);
        assert_eq!(cells(&fragments[0].rows[0]), vec!["Sr.No", "Para"]);
        assert_eq!(cells(&fragments[0].rows[1]), vec!["2", "3.1"]);
    }

    #[test]
    fn test_large_gap_splits_tables() {
        let spans = vec![
            span("A", 10.0, 700.0),
            span("B", 80.0, 700.0),
            span("1", 10.0, 688.0),
            span("C", 10.0, 500.0),
            span("D", 80.0, 500.0),
            span("2", 10.0, 488.0),
        ];
        let fragments = build_fragments(&spans, &GridOptions::default());
        assert_eq!(fragments.len(), 2);
        assert_eq!(cells(&fragments[1].rows[0]), vec!["C", "D"]);
    }

    fn page_one() -> Vec<PlacedText> {
        vec![
            span("Sr.No", 10.0, 700.0),
            span("Para", 80.0, 700.0),
            span("Suggestion", 150.0, 700.0),
            span("Justification", 300.0, 700.0),
            span("1", 10.0, 685.0),
            span("1.1", 80.0, 685.0),
            span("Reduce", 150.0, 685.0),
            span("Helps", 300.0, 685.0),
        ]
    }

    #[test]
    fn test_table_continues_onto_next_page() {
        let page_two = vec![
            span("tax", 150.0, 760.0),
            span("growth", 300.0, 760.0),
            span("2", 10.0, 745.0),
            span("2.1", 80.0, 745.0),
            span("Increase", 150.0, 745.0),
            span("Supports", 300.0, 745.0),
        ];

        let mut grid = TableGrid::new(GridOptions::default());
        let mut fragments = grid.page(&page_one());
        let second = grid.page(&page_two);

        assert_eq!(second.len(), 1);
        assert_eq!(
            cells(&second[0].rows[0]),
            vec!["Sr.No", "Para", "Suggestion", "Justification"]
        );
        assert_eq!(cells(&second[0].rows[1]), vec!["", "", "tax", "growth"]);
        assert_eq!(cells(&second[0].rows[2]), vec!["2", "2.1", "Increase", "Supports"]);

        fragments.extend(second);
        let stitched = TableStitcher::stitch(fragments).unwrap();
        assert_eq!(stitched.records.len(), 2);
        assert_eq!(stitched.records[0].fields(), &["1", "1.1", "Reduce tax", "Helps growth"]);
        assert_eq!(stitched.records[1].fields(), &["2", "2.1", "Increase", "Supports"]);
    }

    #[test]
    fn test_repeated_header_starts_new_fragment() {
        let page_two = vec![
            span("Sr.No", 10.0, 760.0),
            span("Para", 80.0, 760.0),
            span("Suggestion", 150.0, 760.0),
            span("Justification", 300.0, 760.0),
            span("2", 10.0, 745.0),
            span("2.1", 80.0, 745.0),
            span("Increase", 150.0, 745.0),
            span("Supports", 300.0, 745.0),
        ];

        let mut grid = TableGrid::new(GridOptions::default());
        grid.page(&page_one());
        let second = grid.page(&page_two);

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].rows.len(), 2);
        assert_eq!(cells(&second[0].rows[1]), vec!["2", "2.1", "Increase", "Supports"]);
    }

    #[test]
    fn test_misaligned_page_starts_new_table() {
        let page_two = vec![
            span("Name", 40.0, 760.0),
            span("Comment", 220.0, 760.0),
            span("Asha", 40.0, 745.0),
            span("Agree", 220.0, 745.0),
        ];

        let mut grid = TableGrid::new(GridOptions::default());
        grid.page(&page_one());
        let second = grid.page(&page_two);

        assert_eq!(second.len(), 1);
        assert_eq!(cells(&second[0].rows[0]), vec!["Name", "Comment"]);
        assert_eq!(cells(&second[0].rows[1]), vec!["Asha", "Agree"]);
    }

    #[test]
    fn test_build_fragments_has_no_memory() {
        let continuation = vec![span("tax", 150.0, 760.0), span("growth", 300.0, 760.0)];
        let options = GridOptions::default();
        build_fragments(&page_one(), &options);
        let fragments = build_fragments(&continuation, &options);
        assert_eq!(cells(&fragments[0].rows[0]), vec!["tax", "growth"]);
    }

    #[test]
    fn test_page_without_header() {
        let spans = vec![span("Only prose here", 10.0, 700.0), span("More prose", 10.0, 680.0)];
        assert!(build_fragments(&spans, &GridOptions::default()).is_empty());
        assert!(build_fragments(&[], &GridOptions::default()).is_empty());
    }
}
