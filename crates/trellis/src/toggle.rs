//! Expand/collapse state and the visibility cascade.
//!
//! Toggling a node flips its open flag and cascades visibility over its
//! descendants with a bounded walk: every visited row is shown or hidden
//! according to the toggled node's new state, and a visited child that is
//! itself closed is not descended into — its subtree keeps whatever
//! visibility it had, so reopening reveals only direct open descendants.

use std::collections::HashMap;

use crate::surface::TableSurface;
use crate::tree::{Tree, WalkControl};

/// Flips a node's open state and cascades row visibility. Returns the new
/// open state, or `None` for an unknown id.
///
/// `open_state` is the engine's id-keyed carry-over map; the new state is
/// recorded there so it survives the next rebuild.
pub fn toggle<S: TableSurface>(
    tree: &mut Tree,
    surface: &mut S,
    open_state: &mut HashMap<String, bool>,
    id: &str,
) -> Option<bool> {
    let node = tree.get_mut(id)?;
    node.open = !node.open;
    let open = node.open;
    open_state.insert(id.to_string(), open);

    for child in tree.children_of(id).to_vec() {
        tree.walk_from(&child, &mut |descendant, _| {
            surface.set_row_visible(descendant.handle, open);
            if descendant.open {
                WalkControl::Continue
            } else {
                WalkControl::SkipChildren
            }
        });
    }

    Some(open)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::surface::{RowDecl, RowHandle};
    use crate::test_util::MockSurface;
    use std::sync::Arc;
    use trellis_core::Signal;

    /// root -> p -> [c1(open), c2(closed) -> g1]
    fn scenario() -> (MockSurface, Tree, HashMap<String, bool>) {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("p"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("c1").with_parent("p"));
        surface.push_row(RowDecl::new(RowHandle::new(2)).with_id("c2").with_parent("p"));
        surface.push_row(RowDecl::new(RowHandle::new(3)).with_id("g1").with_parent("c2"));

        let mut open_state = HashMap::new();
        open_state.insert("c2".to_string(), false);
        let diagnostics = Arc::new(Signal::new());
        let tree = build(&mut surface, &open_state, &diagnostics).tree;
        (surface, tree, open_state)
    }

    #[test]
    fn test_close_hides_children_but_not_closed_grandchildren() {
        let (mut surface, mut tree, mut open_state) = scenario();

        assert_eq!(toggle(&mut tree, &mut surface, &mut open_state, "p"), Some(false));
        assert_eq!(surface.visibility.get(&RowHandle::new(1)), Some(&false));
        assert_eq!(surface.visibility.get(&RowHandle::new(2)), Some(&false));
        // g1 sits under the closed c2; its visibility must not be touched.
        assert_eq!(surface.visibility.get(&RowHandle::new(3)), None);
    }

    #[test]
    fn test_reopen_reveals_direct_children_only() {
        let (mut surface, mut tree, mut open_state) = scenario();

        toggle(&mut tree, &mut surface, &mut open_state, "p");
        surface.visibility.clear();

        assert_eq!(toggle(&mut tree, &mut surface, &mut open_state, "p"), Some(true));
        assert_eq!(surface.visibility.get(&RowHandle::new(1)), Some(&true));
        assert_eq!(surface.visibility.get(&RowHandle::new(2)), Some(&true));
        // c2 stays closed, so g1 is still not revealed.
        assert_eq!(surface.visibility.get(&RowHandle::new(3)), None);
    }

    #[test]
    fn test_open_chain_cascades_through() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("a"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("b").with_parent("a"));
        surface.push_row(RowDecl::new(RowHandle::new(2)).with_id("c").with_parent("b"));

        let mut open_state = HashMap::new();
        let diagnostics = Arc::new(Signal::new());
        let mut tree = build(&mut surface, &open_state, &diagnostics).tree;

        toggle(&mut tree, &mut surface, &mut open_state, "a");
        assert_eq!(surface.visibility.get(&RowHandle::new(1)), Some(&false));
        assert_eq!(surface.visibility.get(&RowHandle::new(2)), Some(&false));
    }

    #[test]
    fn test_toggle_unknown_id_is_noop() {
        let (mut surface, mut tree, mut open_state) = scenario();
        assert_eq!(toggle(&mut tree, &mut surface, &mut open_state, "ghost"), None);
        assert!(surface.visibility.is_empty());
    }

    #[test]
    fn test_new_state_recorded_for_carry_over() {
        let (mut surface, mut tree, mut open_state) = scenario();
        toggle(&mut tree, &mut surface, &mut open_state, "p");
        assert_eq!(open_state.get("p"), Some(&false));
    }
}
