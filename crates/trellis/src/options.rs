//! Engine configuration.

/// How undecorated rows relate to their declared position. Reserved for a
/// future insertion-order mode; accepted and stored but not yet consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertOrder {
    /// Declaration order.
    #[default]
    Ascending,
    /// Reverse declaration order.
    Descending,
}

/// Default option values.
pub mod defaults {
    /// Indent unit in pixels per depth level.
    pub const INDENT: f32 = 15.0;
    /// Glyph style class for open nodes.
    pub const OPEN_GLYPH: &str = "tree-open";
    /// Glyph style class for closed nodes.
    pub const CLOSED_GLYPH: &str = "tree-closed";
}

/// Table-level options.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeTableOptions {
    /// Whether to observe external change notifications.
    pub active: bool,
    /// Reserved insertion-order mode.
    pub insert_order: InsertOrder,
    /// Whether to impose tree constraints even when no tree column is
    /// designated.
    pub force_tree_constraints: bool,
    /// Whether to draw connector lines.
    pub show_lines: bool,
    /// Glyph style class for open nodes.
    pub node_open_glyph: String,
    /// Glyph style class for closed nodes.
    pub node_closed_glyph: String,
    /// Indent unit in pixels per depth level.
    pub indent: f32,
}

impl Default for TreeTableOptions {
    fn default() -> Self {
        Self {
            active: false,
            insert_order: InsertOrder::default(),
            force_tree_constraints: false,
            show_lines: true,
            node_open_glyph: defaults::OPEN_GLYPH.to_string(),
            node_closed_glyph: defaults::CLOSED_GLYPH.to_string(),
            indent: defaults::INDENT,
        }
    }
}

impl TreeTableOptions {
    /// Creates the default option set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the active flag.
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets forced tree constraints.
    pub fn with_force_tree_constraints(mut self, force: bool) -> Self {
        self.force_tree_constraints = force;
        self
    }

    /// Sets connector-line drawing.
    pub fn with_show_lines(mut self, show: bool) -> Self {
        self.show_lines = show;
        self
    }

    /// Sets the indent unit.
    pub fn with_indent(mut self, indent: f32) -> Self {
        self.indent = indent;
        self
    }

    /// Sets both glyph style classes.
    pub fn with_glyphs(mut self, open: impl Into<String>, closed: impl Into<String>) -> Self {
        self.node_open_glyph = open.into();
        self.node_closed_glyph = closed.into();
        self
    }
}
