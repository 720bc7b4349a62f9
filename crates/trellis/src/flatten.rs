//! Display-order derivation.
//!
//! Produces the authoritative display sequence by pre-order depth-first
//! traversal, with error rows relocated after all well-formed rows. An
//! optional caller-supplied comparator reorders sibling lists when the
//! tree column declares a sort key; the base engine ships none.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::builder::ErrorRow;
use crate::columns::{ColumnSettings, SortOrder, SortType};
use crate::surface::{RowDecl, RowHandle};
use crate::tree::{ROOT_ID, Tree, WalkControl};

/// One row of the flattened display sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    /// Handle to the presentation row.
    pub handle: RowHandle,
    /// Row id.
    pub id: String,
    /// Tree depth; top-level rows are depth 0. Error rows report 0.
    pub depth: usize,
    /// Whether this is a relocated error row.
    pub error: bool,
}

/// Extension hook comparing two rows under a declared sort type.
///
/// Receives the rows' declarations; implementations typically look cell
/// values up in the host by handle.
pub type SortComparator = Arc<dyn Fn(&RowDecl, &RowDecl, SortType) -> Ordering + Send + Sync>;

/// Re-orders every sibling list by the comparator, honoring the declared
/// sort direction. Sorting is stable, so equal rows keep declaration
/// order.
pub fn sort_siblings(
    tree: &mut Tree,
    decls: &HashMap<String, RowDecl>,
    settings: &ColumnSettings,
    comparator: &SortComparator,
) {
    let sort_type = settings.sort_type.unwrap_or_default();
    let descending = settings.sort_order == Some(SortOrder::Descending);

    let mut parents: Vec<String> = vec![ROOT_ID.to_string()];
    tree.walk(&mut |node, _| {
        if !node.children.is_empty() {
            parents.push(node.id.clone());
        }
        WalkControl::Continue
    });

    for parent in parents {
        let mut children: Vec<String> = tree.children_of(&parent).to_vec();
        children.sort_by(|a, b| {
            let (Some(da), Some(db)) = (decls.get(a), decls.get(b)) else {
                return Ordering::Equal;
            };
            let ordering = comparator(da, db, sort_type);
            if descending { ordering.reverse() } else { ordering }
        });
        tree.replace_children(&parent, children);
    }
}

/// Flattens the tree to the display sequence: every non-error node exactly
/// once in pre-order, then the error rows in their relative declaration
/// order.
pub fn flatten(tree: &Tree, errors: &[ErrorRow]) -> Vec<DisplayRow> {
    let mut out = Vec::with_capacity(tree.len() + errors.len());
    tree.walk(&mut |node, depth| {
        out.push(DisplayRow {
            handle: node.handle,
            id: node.id.clone(),
            depth,
            error: false,
        });
        WalkControl::Continue
    });
    for error in errors {
        out.push(DisplayRow {
            handle: error.handle,
            id: error.id.clone(),
            depth: 0,
            error: true,
        });
    }
    out
}
