//! Scoped override of the static configuration.
//!
//! `StaticConfigContext::open(|c| ...)`:
//! - snapshots the current global values,
//! - hands the closure a blank (all-zero) `StaticConfigValues`,
//! - writes the result into the global store (every field, no merging).
//!
//! The previous values come back on `close()` or on `Drop` (end of block, `?`,
//! panic unwinding). `close` consumes the handle, so a scope cannot be closed twice.
//!
//! Scopes on different threads are serialized by a process-wide lock. A thread
//! takes it when its first scope opens and releases it when its last scope
//! closes; nested scopes on the same thread re-enter without locking. The
//! handle is !Send and must be dropped on the opening thread.
//! Scopes are expected to close in LIFO order; an out-of-order close is logged
//! and still restores its own snapshot (last writer wins).

use std::cell::{Cell, RefCell};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::Result;
use log::{debug, warn};

use crate::config::StaticConfigValues;
use crate::global;

static SCOPE_LOCK: Mutex<()> = Mutex::new(());
static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // Number of live ScopeLock's on this thread (including scopes still in their closure).
    static LOCK_DEPTH: Cell<usize> = const { Cell::new(0) };
    // Held by the thread while LOCK_DEPTH > 0, whatever order its scopes close in.
    static HELD_GUARD: RefCell<Option<MutexGuard<'static, ()>>> = const { RefCell::new(None) };
    // Ids of active scopes on this thread, innermost last.
    static ACTIVE_SCOPES: RefCell<Vec<u64>> = const { RefCell::new(Vec::new()) };
}

/// Per-thread re-entrant hold on `SCOPE_LOCK`.
struct ScopeLock {
    _not_send: PhantomData<*const ()>,
}

impl ScopeLock {
    fn acquire() -> Self {
        if LOCK_DEPTH.with(|d| d.get()) == 0 {
            // A test that panicked inside a scope poisons the lock after its
            // snapshot was already restored, so the poison carries no state.
            let guard = SCOPE_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
            HELD_GUARD.with(|g| *g.borrow_mut() = Some(guard));
        }
        LOCK_DEPTH.with(|d| d.set(d.get() + 1));
        Self {
            _not_send: PhantomData,
        }
    }
}

impl Drop for ScopeLock {
    fn drop(&mut self) {
        let depth = LOCK_DEPTH.with(|d| {
            let n = d.get().saturating_sub(1);
            d.set(n);
            n
        });
        if depth == 0 {
            let guard = HELD_GUARD.with(|g| g.borrow_mut().take());
            drop(guard);
        }
    }
}

/// Active override of the global static configuration.
///
/// ```
/// use staticcfg::{global, StaticConfigContext};
///
/// let ctx = StaticConfigContext::open(|c| {
///     c.case_sensitive = true;
/// });
/// assert!(global::case_sensitive());
/// assert_eq!(global::request_query_form_multipart_limit(), 0);
/// ctx.close();
/// ```
#[must_use = "the override is reverted as soon as the context is dropped"]
pub struct StaticConfigContext {
    id: u64,
    previous: StaticConfigValues,
    applied: StaticConfigValues,
    // dropped after Drop::drop has restored `previous`
    _lock: ScopeLock,
}

impl StaticConfigContext {
    /// Open a scope; `closure` fills a blank bag with the override values.
    ///
    /// A panic in `closure` propagates; nothing has been applied at that point.
    pub fn open<F>(closure: F) -> Self
    where
        F: FnOnce(&mut StaticConfigValues),
    {
        let lock = ScopeLock::acquire();
        let previous = global::snapshot();
        let mut temporary = StaticConfigValues::zeroed();
        closure(&mut temporary);
        Self::activate(lock, previous, temporary)
    }

    /// Like `open`, but the closure may fail. On error the global store is left
    /// untouched and the error is returned as is.
    pub fn try_open<F>(closure: F) -> Result<Self>
    where
        F: FnOnce(&mut StaticConfigValues) -> Result<()>,
    {
        let lock = ScopeLock::acquire();
        let previous = global::snapshot();
        let mut temporary = StaticConfigValues::zeroed();
        closure(&mut temporary)?;
        Ok(Self::activate(lock, previous, temporary))
    }

    /// Open a scope with exactly `values`.
    pub fn with_values(values: StaticConfigValues) -> Self {
        Self::open(|c| *c = values)
    }

    /// Run `body` under the override and restore afterwards, on every exit path.
    pub fn scoped<F, B, R>(closure: F, body: B) -> R
    where
        F: FnOnce(&mut StaticConfigValues),
        B: FnOnce(&StaticConfigValues) -> R,
    {
        let ctx = Self::open(closure);
        let out = body(&ctx.applied);
        ctx.close();
        out
    }

    fn activate(
        lock: ScopeLock,
        previous: StaticConfigValues,
        applied: StaticConfigValues,
    ) -> Self {
        global::apply(&applied);

        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        let depth = ACTIVE_SCOPES.with(|s| {
            let mut s = s.borrow_mut();
            s.push(id);
            s.len()
        });
        debug!(
            "static config scope #{} opened (depth {}), changed {:?}",
            id,
            depth,
            previous.diff(&applied)
        );

        Self {
            id,
            previous,
            applied,
            _lock: lock,
        }
    }

    /// Values captured at open; restored on close.
    pub fn previous(&self) -> &StaticConfigValues {
        &self.previous
    }

    /// Values written into the global store at open.
    pub fn applied(&self) -> &StaticConfigValues {
        &self.applied
    }

    /// Restore the captured values and end the scope.
    pub fn close(self) {
        drop(self);
    }
}

impl Drop for StaticConfigContext {
    fn drop(&mut self) {
        global::apply(&self.previous);

        let in_order = ACTIVE_SCOPES.with(|s| {
            let mut s = s.borrow_mut();
            if s.last() == Some(&self.id) {
                s.pop();
                true
            } else {
                s.retain(|&id| id != self.id);
                false
            }
        });
        if in_order {
            debug!("static config scope #{} closed", self.id);
        } else {
            warn!(
                "static config scope #{} closed out of order; inner scopes will restore stale values",
                self.id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_scopes_on_one_thread_do_not_deadlock() {
        let outer = StaticConfigContext::open(|c| c.enable_head_routing = true);
        {
            let _inner = StaticConfigContext::open(|c| c.request_query_form_multipart_limit = 5);
            assert!(!global::enable_head_routing());
            assert_eq!(LOCK_DEPTH.with(|d| d.get()), 2);
        }
        assert!(global::enable_head_routing());
        assert_eq!(LOCK_DEPTH.with(|d| d.get()), 1);
        outer.close();
        assert_eq!(LOCK_DEPTH.with(|d| d.get()), 0);
    }

    #[test]
    fn closure_opening_a_scope_reenters() {
        let ctx = StaticConfigContext::open(|c| {
            let inner = StaticConfigContext::open(|i| i.case_sensitive = true);
            c.case_sensitive = global::case_sensitive();
            inner.close();
        });
        assert!(global::case_sensitive());
        ctx.close();
    }

    fn thread_holds_lock() -> bool {
        HELD_GUARD.with(|g| g.borrow().is_some())
    }

    #[test]
    fn out_of_order_close_keeps_thread_lock_until_last_scope() {
        let a = StaticConfigContext::open(|c| c.enable_head_routing = true);
        let b = StaticConfigContext::open(|c| c.enable_request_tracing = true);
        assert!(thread_holds_lock());

        a.close();
        assert_eq!(LOCK_DEPTH.with(|d| d.get()), 1);
        assert!(thread_holds_lock());

        b.close();
        assert_eq!(LOCK_DEPTH.with(|d| d.get()), 0);
        assert!(!thread_holds_lock());
    }
}
