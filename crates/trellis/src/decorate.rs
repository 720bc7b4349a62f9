//! Decoration computation and diffing.
//!
//! For every node in traversal order the engine computes the decoration
//! its tree-column cell should carry — wrapper structure, indentation
//! margin, expand/collapse control, connector geometry — and diffs it
//! against the previous pass's state. The surface only sees patches for
//! rows whose decoration actually changed, so re-running a pass on an
//! unchanged tree applies nothing.
//!
//! Connector geometry is computed in a second phase, after controls have
//! been attached, because inserting a control can change a cell's rendered
//! size.

use std::collections::{HashMap, HashSet};

use trellis_core::logging::targets;

use crate::surface::TableSurface;
use crate::tree::{ROOT_ID, Tree, WalkControl};

/// Vertical inset between a parent row's cell top and the connector's
/// lower end.
const CONNECTOR_INSET: f32 = 5.0;

/// Connector line state for one row.
#[derive(Debug, Clone, PartialEq)]
pub struct Connector {
    /// Whether the line is drawn. The structure stays in place either way
    /// so lines can be re-enabled without rebuilding.
    pub visible: bool,
    /// Vertical extent of the line, from the parent row's cell to this
    /// row's marker.
    pub height: f32,
    /// Upward shift placing the line's top at the parent row.
    pub rise: f32,
}

impl Connector {
    fn hidden() -> Self {
        Self {
            visible: false,
            height: 0.0,
            rise: 0.0,
        }
    }
}

/// Expand/collapse control state for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlState {
    /// The glyph state class the engine set. Patches name it exactly so
    /// client-supplied classes are never touched.
    pub glyph_class: String,
}

/// Desired decoration of one row's tree-column cell.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoration {
    /// 1-based index of the decorated column.
    pub tree_column: usize,
    /// Leading margin of the offset container, `depth * indent`.
    pub indent: f32,
    /// Expand/collapse control; present iff the node has children.
    pub control: Option<ControlState>,
    /// Connector line geometry.
    pub connector: Connector,
}

/// One structural change to a row's tree-column cell.
#[derive(Debug, Clone, PartialEq)]
pub enum DecorationPatch {
    /// Wrap the cell's content in an entry container and prepend an offset
    /// container (with the given leading margin) holding a connector
    /// placeholder.
    Wrap { column: usize, indent: f32 },
    /// Change the offset container's leading margin.
    SetIndent { indent: f32 },
    /// Attach an expand/collapse control carrying the given glyph class.
    AttachControl { glyph_class: String },
    /// Swap glyph state classes. `remove` names exactly the class the
    /// engine set previously; nothing else may be stripped.
    SetControlGlyph { remove: String, add: String },
    /// Remove the expand/collapse control.
    DetachControl,
    /// Update connector visibility and geometry.
    SetConnector {
        visible: bool,
        height: f32,
        rise: f32,
    },
}

/// Inputs the decorator needs for one pass.
#[derive(Debug, Clone, Copy)]
pub struct DecorationContext<'a> {
    /// The tree column, if one is designated.
    pub tree_column: Option<usize>,
    /// Indent unit in pixels per depth level.
    pub indent: f32,
    /// Whether connector lines are drawn.
    pub show_lines: bool,
    /// Glyph class for open nodes.
    pub open_glyph: &'a str,
    /// Glyph class for closed nodes.
    pub closed_glyph: &'a str,
}

/// The diffing decorator. Holds the previous pass's decoration state,
/// keyed by row id so it survives tree rebuilds.
#[derive(Debug, Default)]
pub struct Decorator {
    cache: HashMap<String, Decoration>,
    decorated_column: Option<usize>,
}

impl Decorator {
    /// Creates a decorator with no prior state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoration currently recorded for a row id.
    pub fn decoration(&self, id: &str) -> Option<&Decoration> {
        self.cache.get(id)
    }

    /// Runs one decoration pass over the tree, diffing against the
    /// previous pass and applying only the differences to the surface.
    pub fn run<S: TableSurface>(&mut self, tree: &Tree, surface: &mut S, ctx: &DecorationContext) {
        let Some(column) = ctx.tree_column else {
            // No tree column designated: purge anything left from one.
            if self.decorated_column.is_some() {
                tracing::debug!(target: targets::DECORATE, "tree column removed, purging wrappers");
                surface.clear_decorations();
                self.cache.clear();
                self.decorated_column = None;
            }
            return;
        };

        // Stale wrappers from an obsolete column must never persist.
        if self.decorated_column.is_some_and(|previous| previous != column) {
            tracing::debug!(
                target: targets::DECORATE,
                previous = self.decorated_column,
                current = column,
                "tree column moved, purging wrappers"
            );
            surface.clear_decorations();
            self.cache.clear();
        }
        self.decorated_column = Some(column);

        // Phase 1: structure — wrappers, indentation, controls.
        let mut patched = 0usize;
        tree.walk(&mut |node, depth| {
            let indent = depth as f32 * ctx.indent;
            let control = if node.children.is_empty() {
                None
            } else {
                Some(ControlState {
                    glyph_class: if node.open {
                        ctx.open_glyph.to_string()
                    } else {
                        ctx.closed_glyph.to_string()
                    },
                })
            };

            match self.cache.get_mut(&node.id) {
                None => {
                    surface.apply(node.handle, &DecorationPatch::Wrap { column, indent });
                    if let Some(control) = &control {
                        surface.apply(
                            node.handle,
                            &DecorationPatch::AttachControl {
                                glyph_class: control.glyph_class.clone(),
                            },
                        );
                    }
                    patched += 1;
                    self.cache.insert(
                        node.id.clone(),
                        Decoration {
                            tree_column: column,
                            indent,
                            control,
                            connector: Connector::hidden(),
                        },
                    );
                }
                Some(previous) => {
                    if previous.indent != indent {
                        surface.apply(node.handle, &DecorationPatch::SetIndent { indent });
                        previous.indent = indent;
                        patched += 1;
                    }
                    match (&previous.control, &control) {
                        (None, Some(new)) => {
                            surface.apply(
                                node.handle,
                                &DecorationPatch::AttachControl {
                                    glyph_class: new.glyph_class.clone(),
                                },
                            );
                            patched += 1;
                        }
                        (Some(_), None) => {
                            surface.apply(node.handle, &DecorationPatch::DetachControl);
                            patched += 1;
                        }
                        (Some(old), Some(new)) if old.glyph_class != new.glyph_class => {
                            surface.apply(
                                node.handle,
                                &DecorationPatch::SetControlGlyph {
                                    remove: old.glyph_class.clone(),
                                    add: new.glyph_class.clone(),
                                },
                            );
                            patched += 1;
                        }
                        _ => {}
                    }
                    previous.control = control;
                    previous.tree_column = column;
                }
            }
            WalkControl::Continue
        });

        // Phase 2: connector geometry, now that controls have settled the
        // rendered layout.
        tree.walk(&mut |node, _| {
            let connector = if ctx.show_lines && node.parent != ROOT_ID {
                match tree.get(&node.parent) {
                    Some(parent) => {
                        let height = surface.row_top(node.handle)
                            - surface.row_top(parent.handle)
                            - CONNECTOR_INSET;
                        Connector {
                            visible: true,
                            height,
                            rise: height,
                        }
                    }
                    None => Connector::hidden(),
                }
            } else {
                Connector::hidden()
            };

            if let Some(previous) = self.cache.get_mut(&node.id) {
                if previous.connector != connector {
                    surface.apply(
                        node.handle,
                        &DecorationPatch::SetConnector {
                            visible: connector.visible,
                            height: connector.height,
                            rise: connector.rise,
                        },
                    );
                    previous.connector = connector;
                    patched += 1;
                }
            }
            WalkControl::Continue
        });

        // Rows gone from the collection take their cells with them.
        let mut present = HashSet::new();
        tree.walk(&mut |node, _| {
            present.insert(node.id.clone());
            WalkControl::Continue
        });
        self.cache.retain(|id, _| present.contains(id));

        tracing::debug!(target: targets::DECORATE, patched, rows = self.cache.len(), "decoration pass complete");
    }
}
