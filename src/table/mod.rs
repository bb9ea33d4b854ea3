//! Raw table fragments, the header schema and stitched logical records.
//!
//! Extraction yields one [`RawTableFragment`] per table per page. Tables in
//! comment documents routinely break across pages and split a single entry
//! over several physical rows, so fragments are fed through the
//! [`TableStitcher`] which fixes a [`Schema`] from the first usable header and
//! folds continuation rows back into the [`LogicalRecord`] they belong to.

mod stitcher;

pub use stitcher::{ExtractionSkip, Stitched, TableStitcher};

use serde::Serialize;

/// Column holding the identifying key (e.g. a serial number).
pub const KEY_COLUMN: usize = 0;
/// Column holding the secondary locator (e.g. a paragraph number).
pub const LOCATOR_COLUMN: usize = 1;
/// Column holding the primary free text (e.g. the suggestion).
pub const PRIMARY_COLUMN: usize = 2;
/// Column holding the secondary free text (e.g. the justification).
pub const SECONDARY_COLUMN: usize = 3;

/// A cell as produced by extraction; `None` when the extractor found nothing.
pub type RawCell = Option<String>;

/// One table extracted from one page, before stitching.
///
/// Row 0 is the header candidate, rows `1..` are data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTableFragment {
    /// Rows in top-to-bottom order
    pub rows: Vec<Vec<RawCell>>,
}

impl RawTableFragment {
    /// Create a fragment from extracted rows.
    pub fn new(rows: Vec<Vec<RawCell>>) -> Self {
        Self { rows }
    }

    /// Build a fragment from string rows where every cell is present.
    pub fn from_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|cell| Some(cell.into())).collect())
                .collect(),
        }
    }

    /// Header candidate row.
    pub fn header(&self) -> Option<&[RawCell]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Vec<RawCell>] {
        self.rows.get(1..).unwrap_or(&[])
    }

    /// Number of rows, header included.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the fragment has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Collapse whitespace runs to single spaces and trim; absent cells become `""`.
pub fn normalize_cell(cell: &RawCell) -> String {
    match cell {
        Some(text) => text.split_whitespace().collect::<Vec<_>>().join(" "),
        None => String::new(),
    }
}

/// Normalize every cell of a row.
pub fn normalize_row(row: &[RawCell]) -> Vec<String> {
    row.iter().map(normalize_cell).collect()
}

/// Ordered column names, fixed once per run from the first usable header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// Create a schema from column names.
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Number of columns every record carries.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the schema has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Name of column `index`, or `fallback` when the header is shorter or the
    /// cell was blank.
    pub fn name_or<'a>(&'a self, index: usize, fallback: &'a str) -> &'a str {
        match self.columns.get(index) {
            Some(name) if !name.is_empty() => name,
            _ => fallback,
        }
    }

    /// Pad with empty strings or truncate so the row has exactly `len()` fields.
    pub fn fit(&self, mut fields: Vec<String>) -> Vec<String> {
        fields.resize(self.columns.len(), String::new());
        fields
    }
}

/// One stitched, schema-aligned entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogicalRecord {
    fields: Vec<String>,
}

impl LogicalRecord {
    /// Wrap already schema-fitted fields.
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// All fields in schema order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field `index`, or `""` when the schema is narrower than that.
    pub fn field(&self, index: usize) -> &str {
        self.fields.get(index).map(String::as_str).unwrap_or("")
    }

    /// Identifying key.
    pub fn key(&self) -> &str {
        self.field(KEY_COLUMN)
    }

    /// Secondary locator.
    pub fn locator(&self) -> &str {
        self.field(LOCATOR_COLUMN)
    }

    /// Primary free text.
    pub fn primary(&self) -> &str {
        self.field(PRIMARY_COLUMN)
    }

    /// Secondary free text.
    pub fn secondary(&self) -> &str {
        self.field(SECONDARY_COLUMN)
    }

    /// Append `" " + text` to a free-text column that exists in the schema.
    fn append(&mut self, index: usize, text: &str) {
        if let Some(field) = self.fields.get_mut(index) {
            field.push(' ');
            field.push_str(text);
        }
    }
}
