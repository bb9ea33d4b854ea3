//! Merge raw table fragments into logical records.
//!
//! Rules, applied to fragments in the order they are supplied:
//!
//! - A fragment with fewer than two rows carries no data and is skipped.
//! - The header of the first usable fragment fixes the [`Schema`]; later
//!   headers are read and discarded.
//! - Every data row is normalized and padded or truncated to the schema width.
//! - A row whose first field is non-empty opens a new record, even when the key
//!   repeats an earlier one.
//! - A row whose first field is empty is a continuation: its primary and
//!   secondary text are space-appended to the open record. With no open record
//!   the row is dropped.
//!
//! Stitching is best effort. Malformed input only ever yields fewer records.

use super::{
    normalize_row, LogicalRecord, RawTableFragment, Schema, KEY_COLUMN, PRIMARY_COLUMN,
    SECONDARY_COLUMN,
};
use crate::error::{Error, Result};

/// A fragment that was ignored because it had no data rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSkip {
    /// Position of the fragment in the supplied sequence
    pub fragment: usize,
    /// Number of rows it had
    pub rows: usize,
}

/// Output of a completed stitch.
#[derive(Debug, Clone, PartialEq)]
pub struct Stitched {
    /// Schema fixed from the first usable header
    pub schema: Schema,
    /// Logical records in document order
    pub records: Vec<LogicalRecord>,
    /// Fragments that were skipped
    pub skipped: Vec<ExtractionSkip>,
    /// Continuation rows dropped because no record was open
    pub orphaned_rows: usize,
}

/// Incremental table stitcher.
///
/// Feed fragments with [`push`](Self::push) and call [`finish`](Self::finish)
/// once every page has been read. The open record survives across fragments,
/// so a continuation at the top of a page extends the last record of the
/// previous page.
#[derive(Debug, Default)]
pub struct TableStitcher {
    schema: Option<Schema>,
    records: Vec<LogicalRecord>,
    skipped: Vec<ExtractionSkip>,
    orphaned_rows: usize,
    fragments_seen: usize,
}

impl TableStitcher {
    /// Create an empty stitcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stitch a complete fragment sequence in one call.
    pub fn stitch<I>(fragments: I) -> Result<Stitched>
    where
        I: IntoIterator<Item = RawTableFragment>,
    {
        let mut stitcher = Self::new();
        for fragment in fragments {
            stitcher.push(&fragment);
        }
        stitcher.finish()
    }

    /// The schema, once a usable header has been seen.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// Records stitched so far.
    pub fn records(&self) -> &[LogicalRecord] {
        &self.records
    }

    /// Consume one fragment. Never fails.
    pub fn push(&mut self, fragment: &RawTableFragment) {
        let index = self.fragments_seen;
        self.fragments_seen += 1;

        let header = match fragment.header() {
            Some(header) if fragment.len() >= 2 => header,
            _ => {
                log::warn!(
                    "Skipping table fragment {} with {} row(s): no data rows",
                    index,
                    fragment.len()
                );
                self.skipped.push(ExtractionSkip {
                    fragment: index,
                    rows: fragment.len(),
                });
                return;
            },
        };

        let header = normalize_row(header);
        let schema = match &self.schema {
            Some(schema) => {
                if header.len() != schema.len() {
                    log::debug!(
                        "Fragment {} header has {} columns, schema has {}; rows will be fitted",
                        index,
                        header.len(),
                        schema.len()
                    );
                }
                schema.clone()
            },
            None if header.is_empty() => {
                log::warn!("Skipping table fragment {}: empty header row", index);
                self.skipped.push(ExtractionSkip {
                    fragment: index,
                    rows: fragment.len(),
                });
                return;
            },
            None => {
                log::info!("Schema fixed from fragment {}: {:?}", index, header);
                let schema = Schema::new(header);
                self.schema = Some(schema.clone());
                schema
            },
        };

        for row in fragment.data_rows() {
            let fields = schema.fit(normalize_row(row));

            if !fields[KEY_COLUMN].is_empty() {
                self.records.push(LogicalRecord::new(fields));
                continue;
            }

            match self.records.last_mut() {
                Some(open) => {
                    open.append(PRIMARY_COLUMN, field_or_empty(&fields, PRIMARY_COLUMN));
                    open.append(SECONDARY_COLUMN, field_or_empty(&fields, SECONDARY_COLUMN));
                },
                None => {
                    log::debug!("Dropping continuation row in fragment {}: no open record", index);
                    self.orphaned_rows += 1;
                },
            }
        }
    }

    /// Finish stitching. Fails only when no fragment ever fixed a schema.
    pub fn finish(self) -> Result<Stitched> {
        let schema = self.schema.ok_or(Error::Schema)?;

        log::info!(
            "Stitched {} record(s) from {} fragment(s), {} skipped",
            self.records.len(),
            self.fragments_seen,
            self.skipped.len()
        );

        Ok(Stitched {
            schema,
            records: self.records,
            skipped: self.skipped,
            orphaned_rows: self.orphaned_rows,
        })
    }
}

fn field_or_empty(fields: &[String], index: usize) -> &str {
    fields.get(index).map(String::as_str).unwrap_or("")
}
