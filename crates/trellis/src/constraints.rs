//! Cross-cutting placement rules.
//!
//! Applied after the build pass, because they need the whole graph:
//! fixed-parent unconditionally pins a node's parent, and limit-parent
//! relocates a node under a required ancestor its chain is missing.

use std::sync::Arc;

use trellis_core::Signal;
use trellis_core::logging::targets;

use crate::diagnostics::Diagnostic;
use crate::surface::TableSurface;
use crate::tree::{ROOT_ID, Tree, WalkControl};

/// Enforces fixed-parent and limit-parent rules over the built tree.
///
/// A `limit_parent` naming a missing node is ignored; one naming the node
/// itself or one of its own descendants would construct a cycle and is
/// likewise ignored. Both cases emit a diagnostic.
pub fn enforce<S: TableSurface>(
    tree: &mut Tree,
    surface: &mut S,
    diagnostics: &Arc<Signal<Diagnostic>>,
) {
    // Snapshot the visit order first; reparenting mutates sibling lists.
    let mut order = Vec::with_capacity(tree.len());
    tree.walk(&mut |node, _| {
        order.push(node.id.clone());
        WalkControl::Continue
    });

    for id in order {
        let Some(node) = tree.get(&id) else { continue };
        let fixed = node.fixed_parent.clone();
        let limit = node.limit_parent.clone();
        let current_parent = node.parent.clone();
        let handle = node.handle;

        if let Some(fixed) = fixed {
            // Fixed and limit are mutually exclusive; fixed wins.
            if let Some(node) = tree.get_mut(&id) {
                node.limit_parent = None;
            }
            if fixed != id && tree.contains(&fixed) && current_parent != fixed {
                tree.reparent(&id, &fixed);
                surface.annotate_parent(handle, &fixed);
            }
            continue;
        }

        let Some(limit) = limit else { continue };

        if !tree.contains(&limit) {
            tracing::warn!(
                target: targets::CONSTRAINTS,
                id = %id,
                limit = %limit,
                "limit-parent not present in collection, ignoring"
            );
            diagnostics.emit(Diagnostic::UnknownParent {
                id: id.clone(),
                parent: limit,
            });
            continue;
        }

        if tree.ancestors(&id).iter().any(|ancestor| *ancestor == limit) {
            continue; // requirement already satisfied
        }

        let cycle = limit == id
            || tree
                .ancestors(&limit)
                .iter()
                .any(|ancestor| *ancestor == id);
        if cycle {
            tracing::warn!(
                target: targets::CONSTRAINTS,
                id = %id,
                limit = %limit,
                "limit-parent would create a cycle, ignoring"
            );
            diagnostics.emit(Diagnostic::CyclicLimitParent {
                id: id.clone(),
                limit,
            });
            continue;
        }

        tree.reparent(&id, &limit);
        surface.annotate_parent(handle, &limit);
    }
}
