//! Logging facilities for Trellis.
//!
//! Trellis uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!     // ...
//! }
//! ```
//!
//! All recoveries from malformed input (duplicate ids, self-parents, and
//! the like) are advisory log events at `warn` level, never errors; filter
//! by the targets below to observe a specific subsystem.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core signal/slot system target.
    pub const SIGNAL: &str = "trellis_core::signal";
    /// Tree construction target.
    pub const BUILDER: &str = "trellis::builder";
    /// Constraint enforcement target.
    pub const CONSTRAINTS: &str = "trellis::constraints";
    /// Column settings resolution target.
    pub const COLUMNS: &str = "trellis::columns";
    /// Decoration/diff target.
    pub const DECORATE: &str = "trellis::decorate";
    /// Engine pass orchestration target.
    pub const ENGINE: &str = "trellis::engine";
}
