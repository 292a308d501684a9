//! Reference-counted multicast receive resource
//!
//! Some platforms drop multicast traffic unless an app holds an explicit lock
//! (Android's `WifiManager.MulticastLock`). Discovery sessions share one
//! [`MulticastLock`]; the platform hook is enabled when the first session
//! acquires it and disabled when the last one releases it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Platform side of the multicast lock
pub trait MulticastHook: Send + Sync {
    /// Start receiving multicast traffic
    fn enable(&self);
    /// Stop receiving multicast traffic
    fn disable(&self);
}

struct LockState {
    holders: Mutex<usize>,
    hook: Option<Box<dyn MulticastHook>>,
}

/// Shared, reference-counted multicast lock
#[derive(Clone)]
pub struct MulticastLock {
    state: Arc<LockState>,
}

impl Default for MulticastLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MulticastLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MulticastLock")
            .field("holders", &self.holders())
            .field("hook", &self.state.hook.is_some())
            .finish()
    }
}

impl MulticastLock {
    /// A lock with no platform hook; only the count is tracked
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(LockState {
                holders: Mutex::new(0),
                hook: None,
            }),
        }
    }

    /// A lock driving `hook` on the first acquire and last release
    #[must_use]
    pub fn with_hook(hook: impl MulticastHook + 'static) -> Self {
        Self {
            state: Arc::new(LockState {
                holders: Mutex::new(0),
                hook: Some(Box::new(hook)),
            }),
        }
    }

    fn count(&self) -> MutexGuard<'_, usize> {
        self.state
            .holders
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a hold on the lock for one session
    #[must_use]
    pub fn acquire(&self) -> MulticastGuard {
        let mut guard = MulticastGuard {
            lock: self.clone(),
            held: false,
        };
        guard.acquire();
        guard
    }

    /// Number of sessions currently holding the lock
    #[must_use]
    pub fn holders(&self) -> usize {
        *self.count()
    }

    /// Whether any session holds the lock
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.holders() > 0
    }

    fn increment(&self) {
        let mut holders = self.count();
        *holders += 1;
        if *holders == 1 {
            tracing::debug!("Multicast lock acquired");
            if let Some(hook) = &self.state.hook {
                hook.enable();
            }
        }
    }

    fn decrement(&self) {
        let mut holders = self.count();
        *holders = holders.saturating_sub(1);
        if *holders == 0 {
            tracing::debug!("Multicast lock released");
            if let Some(hook) = &self.state.hook {
                hook.disable();
            }
        }
    }
}

/// One session's hold on a [`MulticastLock`]
///
/// `acquire` and `release` are idempotent; dropping the guard releases it.
#[derive(Debug)]
pub struct MulticastGuard {
    lock: MulticastLock,
    held: bool,
}

impl MulticastGuard {
    /// Re-take the hold if it was released
    pub fn acquire(&mut self) {
        if !self.held {
            self.lock.increment();
            self.held = true;
        }
    }

    /// Give up the hold; later calls do nothing
    pub fn release(&mut self) {
        if self.held {
            self.held = false;
            self.lock.decrement();
        }
    }

    /// Whether this guard currently holds the lock
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.held
    }
}

impl Drop for MulticastGuard {
    fn drop(&mut self) {
        self.release();
    }
}
