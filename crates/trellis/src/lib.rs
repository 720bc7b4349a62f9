//! Trellis renders a flat collection of tabular rows as a hierarchical tree.
//!
//! The engine infers parent/child relationships from loosely-specified
//! per-row declarations, enforces placement constraints, derives a
//! deterministic display order, and maintains the visual decoration
//! (indentation, connector lines, expand/collapse controls) needed to show
//! the hierarchy — rebuilding the tree in full on every structural change
//! but re-deriving decoration incrementally.
//!
//! The rendering surface itself is an external collaborator: the host
//! implements [`TableSurface`] and Trellis drives it through annotations,
//! reorderings, visibility changes and decoration patches. Change
//! notification flows the other way through [`ChangeFeed`] signals.
//!
//! # Example
//!
//! ```ignore
//! use trellis::{ChangeFeed, TreeTable, TreeTableOptions};
//!
//! let feed = ChangeFeed::default();
//! let table = TreeTable::build(surface, TreeTableOptions::default(), feed.clone());
//!
//! // External mutation of the row collection...
//! feed.changes.emit(trellis::TableChange::Rows);
//!
//! table.lock().toggle("chapter-2");
//! ```

pub mod builder;
pub mod columns;
pub mod constraints;
pub mod decorate;
pub mod diagnostics;
pub mod engine;
pub mod flatten;
pub mod options;
pub mod surface;
pub mod toggle;
pub mod tree;

#[cfg(test)]
mod test_util;

pub use columns::{ColumnMap, ColumnSettings, SortOrder, SortType};
pub use decorate::{Connector, ControlState, Decoration, DecorationPatch};
pub use diagnostics::Diagnostic;
pub use engine::TreeTable;
pub use flatten::{DisplayRow, SortComparator};
pub use options::{InsertOrder, TreeTableOptions};
pub use surface::{ChangeFeed, HeaderCell, RowDecl, RowHandle, TableChange, TableSurface};
pub use tree::{ROOT_ID, Tree, TreeNode, WalkControl};
