//! In-crate test fixture: a recording table surface.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use crate::decorate::DecorationPatch;
use crate::surface::{HeaderCell, RowDecl, RowHandle, TableSurface};

/// Default rendered row height used when no explicit top is set.
const ROW_HEIGHT: f32 = 20.0;

/// A `TableSurface` that records everything the engine does to it.
#[derive(Default)]
pub struct MockSurface {
    pub headers: Vec<Vec<HeaderCell>>,
    pub rows: Vec<RowDecl>,
    pub id_annotations: HashMap<RowHandle, String>,
    pub parent_annotations: HashMap<RowHandle, String>,
    pub error_flags: HashSet<RowHandle>,
    pub order: Vec<RowHandle>,
    pub visibility: HashMap<RowHandle, bool>,
    pub patches: Vec<(RowHandle, DecorationPatch)>,
    pub clear_count: usize,
    pub row_tops: HashMap<RowHandle, f32>,
    pub decl_reads: Cell<usize>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose single header row marks `tree_col` (1-based) as the
    /// tree column among `columns` columns.
    pub fn with_tree_column(columns: usize, tree_col: usize) -> Self {
        let mut surface = Self::new();
        surface.headers = vec![
            (1..=columns)
                .map(|i| {
                    if i == tree_col {
                        HeaderCell::new().with_tree_marker()
                    } else {
                        HeaderCell::new()
                    }
                })
                .collect(),
        ];
        surface
    }

    pub fn push_row(&mut self, decl: RowDecl) {
        self.rows.push(decl);
    }

    fn row_mut(&mut self, handle: RowHandle) -> Option<&mut RowDecl> {
        self.rows.iter_mut().find(|row| row.handle == handle)
    }
}

impl TableSurface for MockSurface {
    fn header_rows(&self) -> Vec<Vec<HeaderCell>> {
        self.headers.clone()
    }

    fn row_declarations(&self) -> Vec<RowDecl> {
        self.decl_reads.set(self.decl_reads.get() + 1);
        self.rows.clone()
    }

    fn annotate_id(&mut self, row: RowHandle, id: &str) {
        self.id_annotations.insert(row, id.to_string());
        if let Some(decl) = self.row_mut(row) {
            decl.id = Some(id.to_string());
        }
    }

    fn annotate_parent(&mut self, row: RowHandle, parent: &str) {
        self.parent_annotations.insert(row, parent.to_string());
        if let Some(decl) = self.row_mut(row) {
            decl.parent = Some(parent.to_string());
        }
    }

    fn mark_error(&mut self, row: RowHandle, error: bool) {
        if error {
            self.error_flags.insert(row);
        } else {
            self.error_flags.remove(&row);
        }
    }

    fn set_row_order(&mut self, order: &[RowHandle]) {
        self.order = order.to_vec();
    }

    fn set_row_visible(&mut self, row: RowHandle, visible: bool) {
        self.visibility.insert(row, visible);
    }

    fn apply(&mut self, row: RowHandle, patch: &DecorationPatch) {
        self.patches.push((row, patch.clone()));
    }

    fn clear_decorations(&mut self) {
        self.clear_count += 1;
    }

    fn row_top(&self, row: RowHandle) -> f32 {
        if let Some(top) = self.row_tops.get(&row) {
            return *top;
        }
        let position = if self.order.is_empty() {
            self.rows.iter().position(|decl| decl.handle == row)
        } else {
            self.order.iter().position(|handle| *handle == row)
        };
        position.unwrap_or(0) as f32 * ROW_HEIGHT
    }
}
