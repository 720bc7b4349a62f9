//! The seam between the engine and its host environment.
//!
//! The host owns the actual table presentation (DOM, terminal grid,
//! widget tree — the engine does not care). It hands the engine row and
//! header declarations, applies the decoration patches the engine emits,
//! and notifies the engine of external mutation through a [`ChangeFeed`].

use std::sync::Arc;

use trellis_core::Signal;

use crate::columns::{SortOrder, SortType};
use crate::decorate::DecorationPatch;

/// Opaque handle to one presentation row, issued by the host surface.
///
/// Handles identify rows across a single pass; identity across passes is
/// re-associated by row id, not by handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowHandle(u64);

impl RowHandle {
    /// Creates a handle from a host-chosen raw value.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value this handle was created from.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// One row's declared tree attributes, read fresh from the surface on
/// every structural pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowDecl {
    /// Handle to the presentation row.
    pub handle: RowHandle,
    /// Stable row identity. Generated by the engine when absent.
    pub id: Option<String>,
    /// Declared parent id.
    pub parent: Option<String>,
    /// Overriding parent id; takes precedence over every other hint.
    pub fixed_parent: Option<String>,
    /// Required-ancestor id; the row is relocated under it if its ancestor
    /// chain does not already include it.
    pub limit_parent: Option<String>,
}

impl RowDecl {
    /// Creates a declaration carrying no tree attributes.
    pub fn new(handle: RowHandle) -> Self {
        Self {
            handle,
            id: None,
            parent: None,
            fixed_parent: None,
            limit_parent: None,
        }
    }

    /// Sets the row id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the declared parent.
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Sets the overriding parent.
    pub fn with_fixed_parent(mut self, parent: impl Into<String>) -> Self {
        self.fixed_parent = Some(parent.into());
        self
    }

    /// Sets the required ancestor.
    pub fn with_limit_parent(mut self, parent: impl Into<String>) -> Self {
        self.limit_parent = Some(parent.into());
        self
    }
}

/// One header cell's declared attributes.
///
/// A cell may span several columns; spanned columns all receive the cell's
/// attributes during column-settings resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderCell {
    /// Number of columns this cell covers. Treated as at least 1.
    pub span: usize,
    /// Designates the tree column.
    pub tree_marker: bool,
    /// Sort key name, if any.
    pub sort: Option<String>,
    /// Declared sort direction.
    pub sort_order: Option<SortOrder>,
    /// Declared sort value type.
    pub sort_type: Option<SortType>,
}

impl HeaderCell {
    /// Creates a plain single-column header cell.
    pub fn new() -> Self {
        Self {
            span: 1,
            ..Default::default()
        }
    }

    /// Sets the column span.
    pub fn with_span(mut self, span: usize) -> Self {
        self.span = span;
        self
    }

    /// Marks this cell's columns as the tree column.
    pub fn with_tree_marker(mut self) -> Self {
        self.tree_marker = true;
        self
    }

    /// Sets the sort key.
    pub fn with_sort(mut self, key: impl Into<String>) -> Self {
        self.sort = Some(key.into());
        self
    }

    /// Sets the sort direction.
    pub fn with_sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = Some(order);
        self
    }

    /// Sets the sort value type.
    pub fn with_sort_type(mut self, ty: SortType) -> Self {
        self.sort_type = Some(ty);
        self
    }
}

/// What kind of external mutation a change notification reports.
///
/// Every kind triggers the same full synchronization pass; the distinction
/// exists for logging and host bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableChange {
    /// Rows were added, removed or reordered in the collection.
    Rows,
    /// Header cells changed.
    Headers,
    /// Per-row tree attributes changed in place.
    Attributes,
}

/// The change-notification signals a host must provide.
///
/// `changes` reports structural/attribute mutation of the row collection
/// or headers and drives a full pass while the engine is active.
/// `viewport` reports rendered-geometry changes (resize, orientation) and
/// drives a decoration-only pass regardless of active state, since
/// connector geometry depends on layout, not structure.
///
/// Both signals are blocked by the engine for the duration of its own
/// passes, so host observers may report the engine's writes without
/// feeding back into it.
#[derive(Clone)]
pub struct ChangeFeed {
    /// Structural/attribute change notifications.
    pub changes: Arc<Signal<TableChange>>,
    /// Viewport geometry change notifications.
    pub viewport: Arc<Signal<()>>,
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self {
            changes: Arc::new(Signal::new()),
            viewport: Arc::new(Signal::new()),
        }
    }
}

/// The rendering surface the engine drives.
///
/// Implementations are expected to be cheap to query; the engine reads the
/// full declaration set on every structural pass. All mutating methods are
/// fire-and-forget: the surface cannot reject an operation, mirroring the
/// engine's no-fatal-errors contract.
pub trait TableSurface: Send {
    /// Header rows, top to bottom, cells left to right.
    fn header_rows(&self) -> Vec<Vec<HeaderCell>>;

    /// Row declarations in current display order.
    fn row_declarations(&self) -> Vec<RowDecl>;

    /// Writes a generated id back onto a row that declared none.
    fn annotate_id(&mut self, row: RowHandle, id: &str);

    /// Writes the resolved parent id onto a row.
    fn annotate_parent(&mut self, row: RowHandle, parent: &str);

    /// Flags or unflags a row as an error row.
    fn mark_error(&mut self, row: RowHandle, error: bool);

    /// Reorders the presentation rows to the given sequence.
    fn set_row_order(&mut self, order: &[RowHandle]);

    /// Shows or hides a row.
    fn set_row_visible(&mut self, row: RowHandle, visible: bool);

    /// Applies one decoration patch to a row's tree-column cell.
    fn apply(&mut self, row: RowHandle, patch: &DecorationPatch);

    /// Removes every wrapper structure the engine ever installed, across
    /// the whole table. Invoked when the tree column moves or disappears.
    fn clear_decorations(&mut self);

    /// Vertical offset of a row's tree-column cell in rendered
    /// coordinates. Used for connector geometry only.
    fn row_top(&self, row: RowHandle) -> f32;
}
