//! Transaction contract
//!
//! The hook engine never owns the database transaction; it receives one from
//! the surrounding pipeline and only needs to tell writable from read-only
//! and to derive a write-disabled view over the same transaction.

use std::sync::Arc;

/// A shared handle to the request's database transaction.
pub type Tx = Arc<dyn Transaction>;

/// The transaction surface the hook engine consumes.
///
/// Rollback/end event wiring stays with the caller, who invokes
/// [`crate::hooks::rollback_request_hooks`] when the transaction aborts.
pub trait Transaction: Send + Sync {
    /// Whether writes through this handle are disabled.
    fn is_read_only(&self) -> bool;

    /// A read-only view over the same underlying transaction.
    ///
    /// Must return a handle for which `is_read_only()` is true; a handle
    /// that is already read-only may return itself.
    fn as_read_only(self: Arc<Self>) -> Tx;
}

/// A write-disabled wrapper over an existing transaction handle.
///
/// Implementors of [`Transaction`] can use this as their `as_read_only`
/// result when they have no cheaper view of their own.
pub struct ReadOnlyView {
    inner: Tx,
}

impl ReadOnlyView {
    pub fn new(inner: Tx) -> Arc<Self> {
        Arc::new(Self { inner })
    }

    /// The wrapped, writable handle.
    pub fn inner(&self) -> &Tx {
        &self.inner
    }
}

impl Transaction for ReadOnlyView {
    fn is_read_only(&self) -> bool {
        true
    }

    fn as_read_only(self: Arc<Self>) -> Tx {
        self
    }
}
