//! Signal/slot system for Trellis.
//!
//! This module provides a type-safe signal/slot mechanism for communication
//! between a host environment and the tree-table engine. Signals are emitted
//! when state changes, and connected slots (callbacks) are invoked in
//! response.
//!
//! Slots are always invoked directly, in the emitting thread, synchronously
//! to completion. The engine is single-threaded and event-driven, so there
//! is no queued or cross-thread invocation machinery here.
//!
//! # Blocking
//!
//! A signal can be temporarily blocked via [`Signal::set_blocked`]. While
//! blocked, emissions are dropped. The engine relies on this to suspend
//! observation of a collection while it mutates that collection itself.
//!
//! # Example
//!
//! ```
//! use trellis_core::Signal;
//!
//! let changed = Signal::<String>::new();
//!
//! let conn_id = changed.connect(|text| {
//!     println!("changed to: {}", text);
//! });
//!
//! changed.emit("hello".to_string());
//! changed.disconnect(conn_id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via
    /// [`Signal::disconnect`]. The ID remains valid until the connection is
    /// explicitly disconnected or the signal is dropped.
    pub struct ConnectionId;
}

/// Internal storage for a single connection.
struct Connection<Args> {
    /// The slot function to invoke.
    slot: Arc<dyn Fn(&Args) + Send + Sync>,
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked in the current
/// thread with the provided arguments.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for
///   signals with no arguments.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Connection<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot
    /// later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Connection {
            slot: Arc::new(slot),
        })
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false`
    /// otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing. This is the mechanism
    /// by which the engine avoids observing its own mutations: block,
    /// mutate, unblock.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in the current thread.
    ///
    /// If the signal is blocked, this does nothing.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "trellis_core::signal", "signal blocked, skipping emit");
            return;
        }

        // Clone the slots out so slots may connect/disconnect reentrantly.
        let slots: Vec<_> = self
            .connections
            .lock()
            .iter()
            .map(|(_, conn)| conn.slot.clone())
            .collect();

        tracing::trace!(target: "trellis_core::signal", connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }

    /// Connect a slot with automatic disconnection when the guard is
    /// dropped.
    ///
    /// The guard holds a shared reference to this signal, so the connection
    /// is cleaned up even if the signal outlives the receiver.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: Arc::clone(self),
            id: Some(id),
        }
    }
}

/// Type-erased view of a signal, independent of its argument type.
///
/// This allows blocking a heterogeneous set of signals for the duration of
/// an operation without knowing their argument types.
pub trait AnySignal: Send + Sync {
    /// Check if blocked.
    fn is_blocked(&self) -> bool;

    /// Set blocked state.
    fn set_blocked(&self, blocked: bool);
}

impl<Args: 'static> AnySignal for Signal<Args> {
    fn is_blocked(&self) -> bool {
        Signal::is_blocked(self)
    }

    fn set_blocked(&self, blocked: bool) {
        Signal::set_blocked(self, blocked);
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// Created via [`Signal::connect_scoped`]. Useful for RAII-style connection
/// management, ensuring connections are cleaned up when the receiver goes
/// out of scope.
///
/// # Example
///
/// ```
/// use trellis_core::Signal;
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
///
/// let signal = Arc::new(Signal::<i32>::new());
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43); // nothing happens, connection was dropped
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<Args: 'static> {
    signal: Arc<Signal<Args>>,
    id: Option<ConnectionId>,
}

impl<Args: 'static> ConnectionGuard<Args> {
    /// Disconnect immediately instead of waiting for drop.
    pub fn disconnect_now(&mut self) {
        if let Some(id) = self.id.take() {
            self.signal.disconnect(id);
        }
    }
}

impl<Args: 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.signal.disconnect(id);
        }
    }
}

static_assertions::assert_impl_all!(Signal<()>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<()>: Send, Sync);
