//! Advisory diagnostics.
//!
//! No engine operation raises a fatal error; malformed input is recovered
//! from and rendering continues. Each recovery is reported here — logged
//! through `tracing` and emitted on the engine's diagnostics signal — so
//! callers can distinguish recovered input from clean input if they care.

/// One recovered-from input problem.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    /// A row declared an id already taken; the row was excluded from the
    /// tree and relocated to the end of the display order.
    #[error("duplicate row id `{id}` at row {row}; row excluded from tree")]
    DuplicateId {
        /// The duplicated id.
        id: String,
        /// Declaration index of the excluded row.
        row: usize,
    },

    /// A row named itself as its parent; it was attached to root.
    #[error("row `{id}` declares itself as parent; attached to root")]
    SelfParent {
        /// The offending row id.
        id: String,
    },

    /// A parent or limit-parent reference named no row in the collection;
    /// the reference was dropped.
    #[error("row `{id}` references unknown parent `{parent}`; attached to root")]
    UnknownParent {
        /// The referencing row id.
        id: String,
        /// The dangling reference.
        parent: String,
    },

    /// A limit-parent named the row itself or one of its descendants;
    /// honoring it would construct a cycle, so it was ignored.
    #[error("row `{id}` limit-parent `{limit}` would create a cycle; ignored")]
    CyclicLimitParent {
        /// The constrained row id.
        id: String,
        /// The rejected required-ancestor id.
        limit: String,
    },
}
