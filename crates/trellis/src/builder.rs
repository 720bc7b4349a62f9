//! Tree construction from flat row declarations.
//!
//! One forward pass classifies every row — resolving its id and parent —
//! followed by a linking pass that attaches each node to its parent's
//! children list in declaration order. Rules that need the whole graph
//! (fixed-parent, limit-parent) are applied afterwards by the constraint
//! enforcer.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use trellis_core::Signal;
use trellis_core::logging::targets;

use crate::diagnostics::Diagnostic;
use crate::surface::{RowDecl, RowHandle, TableSurface};
use crate::tree::{ROOT_ID, Tree, TreeNode};

/// Counter for generating row ids for rows that declared none.
static GENERATED_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_generated_id(taken: &HashSet<String>) -> String {
    loop {
        let n = GENERATED_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let id = format!("row-{n}");
        if !taken.contains(&id) {
            return id;
        }
    }
}

/// A row excluded from the tree and relocated to the end of the display
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRow {
    /// Handle to the presentation row.
    pub handle: RowHandle,
    /// The (duplicated) id the row declared.
    pub id: String,
    /// Position of the row in the declared sequence.
    pub decl_index: usize,
}

/// Result of one build pass.
#[derive(Debug, Default)]
pub struct BuildOutcome {
    /// The node graph, rooted at the synthetic root.
    pub tree: Tree,
    /// Excluded rows in declaration order.
    pub errors: Vec<ErrorRow>,
    /// Declarations by resolved id, for downstream sorting hooks.
    pub decls: HashMap<String, RowDecl>,
}

/// Builds the node graph from the surface's current row declarations.
///
/// Side effects on the surface keep repeat passes deterministic: generated
/// ids and resolved parents are written back as annotations, and error
/// flags are set or cleared per row.
///
/// `open_state` carries expand/collapse state forward from the previous
/// pass, matched by id; unknown ids default to open.
pub fn build<S: TableSurface>(
    surface: &mut S,
    open_state: &HashMap<String, bool>,
    diagnostics: &Arc<Signal<Diagnostic>>,
) -> BuildOutcome {
    let rows = surface.row_declarations();

    let mut taken: HashSet<String> = rows.iter().filter_map(|row| row.id.clone()).collect();
    taken.insert(ROOT_ID.to_string());

    let mut outcome = BuildOutcome::default();
    // Ancestor context for rows carrying no parent hint of their own: the
    // parent value of the nearest preceding row that declared one.
    let mut inherited_parent: Option<String> = None;
    let mut order: Vec<String> = Vec::with_capacity(rows.len());

    for (index, decl) in rows.into_iter().enumerate() {
        if let Some(id) = &decl.id {
            if id == ROOT_ID || outcome.tree.get(id).is_some() {
                tracing::warn!(
                    target: targets::BUILDER,
                    id = %id,
                    row = index,
                    "duplicate row id, excluding row from tree"
                );
                diagnostics.emit(Diagnostic::DuplicateId {
                    id: id.clone(),
                    row: index,
                });
                surface.mark_error(decl.handle, true);
                outcome.errors.push(ErrorRow {
                    handle: decl.handle,
                    id: id.clone(),
                    decl_index: index,
                });
                continue;
            }
        }

        let id = match decl.id.clone() {
            Some(id) => id,
            None => {
                let id = next_generated_id(&taken);
                taken.insert(id.clone());
                surface.annotate_id(decl.handle, &id);
                id
            }
        };

        // Parent priority: fixed > declared > limit > positional > root.
        let mut parent = decl
            .fixed_parent
            .clone()
            .or_else(|| decl.parent.clone())
            .or_else(|| decl.limit_parent.clone())
            .or_else(|| inherited_parent.clone())
            .unwrap_or_else(|| ROOT_ID.to_string());

        // Later unparented rows inherit the declared value, even when this
        // row's own placement gets redirected below.
        if let Some(declared) = decl.fixed_parent.clone().or_else(|| decl.parent.clone()) {
            inherited_parent = Some(declared);
        }

        if parent == id {
            tracing::warn!(
                target: targets::BUILDER,
                id = %id,
                "row declares itself as parent, attaching to root"
            );
            diagnostics.emit(Diagnostic::SelfParent { id: id.clone() });
            parent = ROOT_ID.to_string();
        }

        surface.mark_error(decl.handle, false);

        outcome.tree.insert(TreeNode {
            id: id.clone(),
            parent,
            fixed_parent: decl.fixed_parent.clone(),
            limit_parent: decl.limit_parent.clone(),
            children: Vec::new(),
            open: open_state.get(&id).copied().unwrap_or(true),
            handle: decl.handle,
            decl_index: index,
        });
        order.push(id.clone());
        outcome.decls.insert(id, decl);
    }

    // Link children in declaration order. Parents may be declared after
    // their children, which is why linking runs as a second pass.
    for id in order {
        let parent = outcome
            .tree
            .get(&id)
            .map(|node| node.parent.clone())
            .unwrap_or_else(|| ROOT_ID.to_string());
        let parent = if outcome.tree.contains(&parent) {
            parent
        } else {
            tracing::warn!(
                target: targets::BUILDER,
                id = %id,
                parent = %parent,
                "parent not present in collection, attaching to root"
            );
            diagnostics.emit(Diagnostic::UnknownParent {
                id: id.clone(),
                parent,
            });
            if let Some(node) = outcome.tree.get_mut(&id) {
                node.parent = ROOT_ID.to_string();
            }
            ROOT_ID.to_string()
        };
        outcome.tree.attach_child(&parent, &id);
        if let Some(node) = outcome.tree.get(&id) {
            surface.annotate_parent(node.handle, &parent);
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::MockSurface;

    fn run(surface: &mut MockSurface) -> BuildOutcome {
        let diagnostics = Arc::new(Signal::new());
        build(surface, &HashMap::new(), &diagnostics)
    }

    #[test]
    fn test_flat_rows_attach_to_root() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("a"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("b"));
        let outcome = run(&mut surface);
        assert_eq!(outcome.tree.root_children(), ["a", "b"]);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_duplicate_id_excluded_and_flagged() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("a"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("x"));
        surface.push_row(RowDecl::new(RowHandle::new(2)).with_id("x"));
        let outcome = run(&mut surface);

        assert_eq!(outcome.tree.len(), 2);
        assert!(outcome.tree.get("x").is_some());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].handle, RowHandle::new(2));
        assert!(surface.error_flags.contains(&RowHandle::new(2)));
    }

    #[test]
    fn test_duplicate_id_emits_diagnostic() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("x"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("x"));

        let diagnostics = Arc::new(Signal::new());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        diagnostics.connect(move |d: &Diagnostic| seen_clone.lock().push(d.clone()));

        build(&mut surface, &HashMap::new(), &diagnostics);
        assert_eq!(
            *seen.lock(),
            vec![Diagnostic::DuplicateId {
                id: "x".to_string(),
                row: 1
            }]
        );
    }

    #[test]
    fn test_missing_id_generated_and_annotated() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)));
        let outcome = run(&mut surface);

        assert_eq!(outcome.tree.len(), 1);
        let annotated = surface.id_annotations.get(&RowHandle::new(0)).unwrap();
        assert!(outcome.tree.get(annotated).is_some());
        assert!(annotated.starts_with("row-"));
    }

    #[test]
    fn test_generated_id_skips_declared_collisions() {
        let reserved = GENERATED_ID_COUNTER.load(Ordering::Relaxed);
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id(format!("row-{reserved}")));
        surface.push_row(RowDecl::new(RowHandle::new(1)));
        let outcome = run(&mut surface);

        let generated = surface.id_annotations.get(&RowHandle::new(1)).unwrap();
        assert_ne!(generated, &format!("row-{reserved}"));
        assert_eq!(outcome.tree.len(), 2);
    }

    #[test]
    fn test_self_parent_redirected_to_root() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("a").with_parent("a"));
        let outcome = run(&mut surface);
        assert_eq!(outcome.tree.get("a").unwrap().parent, ROOT_ID);
        assert_eq!(outcome.tree.root_children(), ["a"]);
    }

    #[test]
    fn test_positional_inference_inherits_preceding_parent_value() {
        // Two unparented rows after a row with declared parent "x" become
        // siblings of that row, preserving declaration order.
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("x"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("a").with_parent("x"));
        surface.push_row(RowDecl::new(RowHandle::new(2)).with_id("b"));
        surface.push_row(RowDecl::new(RowHandle::new(3)).with_id("c"));
        let outcome = run(&mut surface);

        assert_eq!(outcome.tree.children_of("x"), ["a", "b", "c"]);
    }

    #[test]
    fn test_rows_before_any_parented_row_fall_back_to_root() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("a"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("b").with_parent("a"));
        let outcome = run(&mut surface);
        assert_eq!(outcome.tree.get("a").unwrap().parent, ROOT_ID);
    }

    #[test]
    fn test_forward_parent_reference_links() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("child").with_parent("late"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("late"));
        let outcome = run(&mut surface);
        assert_eq!(outcome.tree.children_of("late"), ["child"]);
    }

    #[test]
    fn test_orphan_parent_degrades_to_root() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("a").with_parent("ghost"));
        let outcome = run(&mut surface);
        assert_eq!(outcome.tree.get("a").unwrap().parent, ROOT_ID);
        assert_eq!(
            surface.parent_annotations.get(&RowHandle::new(0)).unwrap(),
            ROOT_ID
        );
    }

    #[test]
    fn test_fixed_parent_takes_priority() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("p"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("q"));
        surface.push_row(
            RowDecl::new(RowHandle::new(2))
                .with_id("a")
                .with_parent("q")
                .with_fixed_parent("p"),
        );
        let outcome = run(&mut surface);
        assert_eq!(outcome.tree.get("a").unwrap().parent, "p");
    }

    #[test]
    fn test_limit_parent_used_when_no_other_hint() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("p"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("a").with_limit_parent("p"));
        let outcome = run(&mut surface);
        assert_eq!(outcome.tree.get("a").unwrap().parent, "p");
    }

    #[test]
    fn test_open_state_carried_by_id() {
        let mut surface = MockSurface::new();
        surface.push_row(RowDecl::new(RowHandle::new(0)).with_id("a"));
        surface.push_row(RowDecl::new(RowHandle::new(1)).with_id("b"));

        let mut open_state = HashMap::new();
        open_state.insert("a".to_string(), false);
        let diagnostics = Arc::new(Signal::new());
        let outcome = build(&mut surface, &open_state, &diagnostics);

        assert!(!outcome.tree.get("a").unwrap().open);
        assert!(outcome.tree.get("b").unwrap().open);
    }
}
