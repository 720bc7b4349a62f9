//! Column settings resolution.
//!
//! Derives per-column metadata (which column hosts the tree decoration,
//! sort key/order/type) from header declarations. Spanned cells propagate
//! their attributes to every column they cover; header rows are resolved
//! top to bottom, with lower rows filling in only attributes the rows
//! above left unset.
//!
//! The map is local to one synchronization pass: it is rebuilt from the
//! headers every time and never mutated in place across passes.

use std::collections::BTreeMap;

use trellis_core::logging::targets;

use crate::surface::HeaderCell;

/// Sort direction declared on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// Sort value interpretation declared on a column.
///
/// Passed through to the caller-supplied comparator; the base engine does
/// not interpret it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortType {
    /// Compare values as text.
    #[default]
    Alphabetic,
    /// Compare values as numbers.
    Numeric,
}

/// Resolved settings for one column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSettings {
    /// Whether this column is designated as the tree column.
    pub tree_marker: bool,
    /// Sort key, if declared.
    pub sort: Option<String>,
    /// Sort direction, if declared.
    pub sort_order: Option<SortOrder>,
    /// Sort value type, if declared.
    pub sort_type: Option<SortType>,
}

impl ColumnSettings {
    fn fill_from(&mut self, cell: &HeaderCell) {
        if cell.tree_marker {
            self.tree_marker = true;
        }
        if self.sort.is_none() {
            self.sort = cell.sort.clone();
        }
        if self.sort_order.is_none() {
            self.sort_order = cell.sort_order;
        }
        if self.sort_type.is_none() {
            self.sort_type = cell.sort_type;
        }
    }
}

/// Per-pass map from 1-based column index to resolved settings.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    settings: BTreeMap<usize, ColumnSettings>,
}

impl ColumnMap {
    /// Creates an empty map (no headers, no tree column).
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives column settings from header rows, top to bottom.
    ///
    /// Within a row, cells are laid out left to right by a running column
    /// cursor; a cell spanning `n` columns contributes its attributes to
    /// all `n`. A lower row only fills attributes left unset by the rows
    /// above it.
    pub fn derive(header_rows: &[Vec<HeaderCell>]) -> Self {
        let mut map = Self::new();
        for row in header_rows {
            let mut column = 1usize;
            for cell in row {
                let span = cell.span.max(1);
                for i in 0..span {
                    map.settings
                        .entry(column + i)
                        .or_default()
                        .fill_from(cell);
                }
                column += span;
            }
        }
        tracing::debug!(
            target: targets::COLUMNS,
            columns = map.settings.len(),
            tree_column = ?map.tree_column(),
            "column settings derived"
        );
        map
    }

    /// Settings for a 1-based column index.
    pub fn get(&self, column: usize) -> Option<&ColumnSettings> {
        self.settings.get(&column)
    }

    /// The lowest 1-based column index carrying the tree marker.
    pub fn tree_column(&self) -> Option<usize> {
        self.settings
            .iter()
            .find(|(_, settings)| settings.tree_marker)
            .map(|(index, _)| *index)
    }
}
