//! Synchronization utilities for lazily materialized entity state.
//!
//! # Key Components
//!
//! - [`InstallOnce`] - A create-once slot whose value is computed outside of any lock and
//!   installed only if the slot is still empty
//!
//! # Design Principles
//!
//! - **Detached Computation**: The (possibly expensive) computation never runs while a lock
//!   is held, so it may freely read other lazy state
//! - **Single Winner**: Concurrent first accesses may each compute a value, exactly one is
//!   installed and every caller observes that same instance
//! - **Never Recomputed**: Once a value is installed it is returned for the lifetime of the slot

use std::sync::OnceLock;

use tracing::trace;

/// A lazily installed value with single-winner semantics.
///
/// Unlike [`OnceLock::get_or_init`], which blocks concurrent callers while the initializer
/// runs, [`InstallOnce::get_or_install`] lets every racing caller run its own computation and
/// then attempts a "set if still uninitialized". Losers drop their result and read the
/// installed one.
///
/// # Examples
///
/// ```rust
/// use dotmeta::utils::synchronization::InstallOnce;
/// use std::sync::Arc;
///
/// let slot: InstallOnce<Arc<Vec<u32>>> = InstallOnce::new();
/// let first = slot.get_or_install(|| Arc::new(vec![1, 2, 3]));
/// let second = slot.get_or_install(|| Arc::new(vec![4]));
/// assert!(Arc::ptr_eq(first, second));
/// ```
pub struct InstallOnce<T> {
    value: OnceLock<T>,
}

impl<T> InstallOnce<T> {
    /// Creates an empty slot.
    #[must_use]
    pub const fn new() -> Self {
        InstallOnce {
            value: OnceLock::new(),
        }
    }

    /// Creates a slot that already holds `value`.
    #[must_use]
    pub fn with_value(value: T) -> Self {
        let slot = InstallOnce::new();
        let _ = slot.value.set(value);
        slot
    }

    /// Returns the installed value, computing and installing it on first access.
    ///
    /// `compute` runs without any lock held. If another caller installs a value first, the
    /// computed one is dropped and the installed one is returned.
    pub fn get_or_install<F>(&self, compute: F) -> &T
    where
        F: FnOnce() -> T,
    {
        if let Some(value) = self.value.get() {
            return value;
        }

        let computed = compute();

        let mut installed = false;
        let value = self.value.get_or_init(|| {
            installed = true;
            computed
        });

        if !installed {
            trace!("lazy value lost the install race, using the installed instance");
        }

        value
    }

    /// Returns the installed value, if any.
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Returns `true` once a value has been installed.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }
}

impl<T> Default for InstallOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for InstallOnce<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallOnce")
            .field("value", &self.value.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Arc, Barrier,
        },
        thread,
    };

    #[test]
    fn computes_once_when_uncontended() {
        let calls = AtomicUsize::new(0);
        let slot = InstallOnce::new();

        for _ in 0..3 {
            let value = slot.get_or_install(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                42
            });
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(slot.is_initialized());
    }

    #[test]
    fn with_value_skips_computation() {
        let slot = InstallOnce::with_value("ready");
        assert_eq!(*slot.get_or_install(|| "computed"), "ready");
    }

    #[test]
    fn concurrent_callers_observe_one_instance() {
        const THREADS: usize = 8;

        let slot: Arc<InstallOnce<Arc<Vec<usize>>>> = Arc::new(InstallOnce::new());
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|index| {
                let slot = Arc::clone(&slot);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    Arc::clone(slot.get_or_install(|| Arc::new(vec![index])))
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let installed = slot.get().unwrap();
        for result in &results {
            assert!(Arc::ptr_eq(result, installed));
        }
    }
}
