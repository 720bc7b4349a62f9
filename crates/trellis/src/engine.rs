//! Pass orchestration and the public engine surface.
//!
//! A [`TreeTable`] owns its [`TableSurface`] and drives it through two
//! kinds of passes:
//!
//! - a **full pass** (`update`): resolve column settings, rebuild the
//!   tree from the row declarations, enforce placement constraints,
//!   apply the sort hook, flatten to display order, reflow the surface,
//!   then decorate;
//! - a **decoration-only pass** (`redecorate`): diff and patch decoration
//!   against the already-built tree, used for toggles, option changes
//!   and viewport geometry changes.
//!
//! While either pass runs, both host change signals are blocked, so the
//! engine's own writes to the surface can never feed back into it as
//! "external" changes. Passes are serialized by the mutex wrapping the
//! engine; notifications arriving in sequence each run one complete pass.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use trellis_core::{ConnectionId, Signal};
use trellis_core::logging::targets;

use crate::builder::{self, ErrorRow};
use crate::columns::ColumnMap;
use crate::constraints;
use crate::decorate::{DecorationContext, Decorator};
use crate::diagnostics::Diagnostic;
use crate::flatten::{self, DisplayRow, SortComparator};
use crate::options::{InsertOrder, TreeTableOptions};
use crate::surface::{ChangeFeed, RowDecl, RowHandle, TableChange, TableSurface};
use crate::toggle;
use crate::tree::Tree;

/// The tree-table engine.
///
/// Constructed via [`TreeTable::build`], which returns the engine behind
/// an `Arc<Mutex<_>>` so change-notification slots can reach it.
pub struct TreeTable<S> {
    surface: S,
    options: TreeTableOptions,
    feed: ChangeFeed,
    diagnostics: Arc<Signal<Diagnostic>>,
    comparator: Option<SortComparator>,

    // Per-pass products. The tree and column map are rebuilt on every
    // full pass; only the decorator's cache and the open-state map carry
    // information across rebuilds, keyed by row id.
    columns: ColumnMap,
    tree: Tree,
    errors: Vec<ErrorRow>,
    decls: HashMap<String, RowDecl>,
    display: Vec<DisplayRow>,
    open_state: HashMap<String, bool>,
    decorator: Decorator,

    self_ref: Weak<Mutex<TreeTable<S>>>,
    structure_conn: Option<ConnectionId>,
    viewport_conn: Option<ConnectionId>,
}

impl<S: TableSurface + 'static> TreeTable<S> {
    /// Builds an engine over a surface, wires its change subscriptions and
    /// runs the initial full pass.
    pub fn build(surface: S, options: TreeTableOptions, feed: ChangeFeed) -> Arc<Mutex<Self>> {
        let active = options.active;
        let table = Arc::new(Mutex::new(Self {
            surface,
            options,
            feed: feed.clone(),
            diagnostics: Arc::new(Signal::new()),
            comparator: None,
            columns: ColumnMap::new(),
            tree: Tree::new(),
            errors: Vec::new(),
            decls: HashMap::new(),
            display: Vec::new(),
            open_state: HashMap::new(),
            decorator: Decorator::new(),
            self_ref: Weak::new(),
            structure_conn: None,
            viewport_conn: None,
        }));

        let mut this = table.lock();
        this.self_ref = Arc::downgrade(&table);

        // Connector geometry depends on rendered layout, so viewport
        // changes are observed for the lifetime of the engine whether or
        // not it is active; they trigger a decoration-only pass.
        let weak = Arc::downgrade(&table);
        this.viewport_conn = Some(feed.viewport.connect(move |_| {
            if let Some(table) = weak.upgrade() {
                table.lock().redecorate();
            }
        }));

        if active {
            this.set_active(true);
        }
        this.update();
        drop(this);

        table
    }

    /// Runs a full synchronization pass.
    pub fn update(&mut self) {
        self.guarded(Self::full_pass);
    }

    /// Runs a decoration-only pass against the current tree.
    pub fn redecorate(&mut self) {
        self.guarded(Self::decoration_pass);
    }

    /// Toggles a node's open state, cascades visibility, and resyncs
    /// decoration. Returns the new open state, or `None` for an unknown
    /// id. Does not rebuild the tree.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        self.guarded(|this| {
            let open = toggle::toggle(&mut this.tree, &mut this.surface, &mut this.open_state, id)?;
            this.decoration_pass();
            Some(open)
        })
    }

    // =========================================================================
    // Options
    // =========================================================================

    /// Whether external change notifications are observed.
    pub fn is_active(&self) -> bool {
        self.structure_conn.is_some()
    }

    /// Starts or stops observing the host's change signal.
    ///
    /// Deactivation unsubscribes immediately; no further automatic passes
    /// occur until [`update`](Self::update) is called explicitly.
    pub fn set_active(&mut self, state: bool) {
        if state == self.is_active() {
            self.options.active = state;
            return;
        }
        self.options.active = state;
        if state {
            let weak = self.self_ref.clone();
            let id = self.feed.changes.connect(move |change: &TableChange| {
                if let Some(table) = weak.upgrade() {
                    tracing::debug!(target: targets::ENGINE, change = ?change, "external change, resynchronizing");
                    table.lock().update();
                }
            });
            self.structure_conn = Some(id);
        } else if let Some(id) = self.structure_conn.take() {
            self.feed.changes.disconnect(id);
        }
    }

    /// Whether tree constraints apply without a designated tree column.
    pub fn force_tree_constraints(&self) -> bool {
        self.options.force_tree_constraints
    }

    /// Sets forced tree constraints. Takes effect on the next full pass.
    pub fn set_force_tree_constraints(&mut self, state: bool) {
        self.options.force_tree_constraints = state;
    }

    /// Whether connector lines are drawn.
    pub fn show_lines(&self) -> bool {
        self.options.show_lines
    }

    /// Sets connector-line drawing; refreshes decoration when `immediate`.
    pub fn set_show_lines(&mut self, state: bool, immediate: bool) {
        self.options.show_lines = state;
        if immediate {
            self.redecorate();
        }
    }

    /// The indent unit in pixels per depth level.
    pub fn indent(&self) -> f32 {
        self.options.indent
    }

    /// Sets the indent unit; refreshes decoration when `immediate`.
    pub fn set_indent(&mut self, value: f32, immediate: bool) {
        self.options.indent = value;
        if immediate {
            self.redecorate();
        }
    }

    /// Glyph style class for open nodes.
    pub fn node_open_glyph(&self) -> &str {
        &self.options.node_open_glyph
    }

    /// Glyph style class for closed nodes.
    pub fn node_closed_glyph(&self) -> &str {
        &self.options.node_closed_glyph
    }

    /// Sets the open glyph class; refreshes decoration when `immediate`.
    pub fn set_node_open_glyph(&mut self, class: impl Into<String>, immediate: bool) {
        self.options.node_open_glyph = class.into();
        if immediate {
            self.redecorate();
        }
    }

    /// Sets the closed glyph class; refreshes decoration when `immediate`.
    pub fn set_node_closed_glyph(&mut self, class: impl Into<String>, immediate: bool) {
        self.options.node_closed_glyph = class.into();
        if immediate {
            self.redecorate();
        }
    }

    /// Sets both glyph classes; refreshes decoration when `immediate`.
    pub fn set_node_glyphs(
        &mut self,
        open: impl Into<String>,
        closed: impl Into<String>,
        immediate: bool,
    ) {
        self.options.node_open_glyph = open.into();
        self.options.node_closed_glyph = closed.into();
        if immediate {
            self.redecorate();
        }
    }

    /// The reserved insertion-order mode.
    pub fn insert_order(&self) -> InsertOrder {
        self.options.insert_order
    }

    /// Stores the reserved insertion-order mode. Not yet consulted.
    pub fn set_insert_order(&mut self, order: InsertOrder) {
        self.options.insert_order = order;
    }

    /// Installs the sibling sort comparator. Takes effect on the next
    /// full pass, and only when the tree column declares a sort key.
    pub fn set_sort_comparator(&mut self, comparator: SortComparator) {
        self.comparator = Some(comparator);
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The advisory diagnostics channel.
    pub fn diagnostics(&self) -> Arc<Signal<Diagnostic>> {
        Arc::clone(&self.diagnostics)
    }

    /// The display sequence produced by the last pass.
    pub fn display_order(&self) -> &[DisplayRow] {
        &self.display
    }

    /// A node's open state, or `None` for an unknown id.
    pub fn is_open(&self, id: &str) -> Option<bool> {
        self.tree.get(id).map(|node| node.open)
    }

    /// Read access to the surface, for hosts that own richer state there.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    // =========================================================================
    // Passes
    // =========================================================================

    /// Blocks both host signals for the duration of `f`, so the engine's
    /// own surface writes are never observed as external changes.
    fn guarded<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.feed.changes.set_blocked(true);
        self.feed.viewport.set_blocked(true);
        let result = f(self);
        self.feed.changes.set_blocked(false);
        self.feed.viewport.set_blocked(false);
        result
    }

    fn full_pass(&mut self) {
        tracing::debug!(target: targets::ENGINE, "full synchronization pass");

        self.columns = ColumnMap::derive(&self.surface.header_rows());
        let tree_column = self.columns.tree_column();

        let outcome = builder::build(&mut self.surface, &self.open_state, &self.diagnostics);
        self.tree = outcome.tree;
        self.errors = outcome.errors;
        self.decls = outcome.decls;
        self.open_state = self
            .tree
            .iter()
            .map(|node| (node.id.clone(), node.open))
            .collect();

        let constrained = self.options.force_tree_constraints || tree_column.is_some();
        if constrained {
            constraints::enforce(&mut self.tree, &mut self.surface, &self.diagnostics);
        }

        if let (Some(column), Some(comparator)) = (tree_column, self.comparator.clone()) {
            if let Some(settings) = self.columns.get(column) {
                if settings.sort.is_some() {
                    flatten::sort_siblings(&mut self.tree, &self.decls, settings, &comparator);
                }
            }
        }

        self.display = flatten::flatten(&self.tree, &self.errors);

        // Without a tree column or forced constraints the declared order
        // stands; the constraints don't matter.
        if constrained {
            let order: Vec<RowHandle> = self.display.iter().map(|row| row.handle).collect();
            self.surface.set_row_order(&order);
        }

        self.decoration_pass();
    }

    fn decoration_pass(&mut self) {
        let ctx = DecorationContext {
            tree_column: self.columns.tree_column(),
            indent: self.options.indent,
            show_lines: self.options.show_lines,
            open_glyph: &self.options.node_open_glyph,
            closed_glyph: &self.options.node_closed_glyph,
        };
        self.decorator.run(&self.tree, &mut self.surface, &ctx);
    }
}

impl<S> Drop for TreeTable<S> {
    fn drop(&mut self) {
        if let Some(id) = self.structure_conn.take() {
            self.feed.changes.disconnect(id);
        }
        if let Some(id) = self.viewport_conn.take() {
            self.feed.viewport.disconnect(id);
        }
    }
}
