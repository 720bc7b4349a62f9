//! Core systems for Trellis.
//!
//! This crate provides the pieces of Trellis that are independent of any
//! table semantics:
//!
//! - A type-safe signal/slot mechanism ([`Signal`]) used for change
//!   notification between a host environment and the tree-table engine.
//! - Logging target constants ([`logging::targets`]) for filtering
//!   `tracing` output by subsystem.

pub mod logging;
pub mod signal;

pub use signal::{AnySignal, ConnectionGuard, ConnectionId, Signal};
