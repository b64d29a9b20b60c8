//! Binary semaphore with cross-thread release

use parking_lot::{Condvar, Mutex};

/// A binary semaphore built from a `parking_lot` mutex and condvar.
///
/// Unlike a mutex guard, the held/free state is plain data, so the thread
/// that releases the semaphore does not have to be the thread that acquired
/// it. The readers-writers protocol depends on this: the first reader of a
/// cohort acquires the resource lock and the *last* reader, usually a
/// different thread, releases it.
///
/// Waiters are woken in condvar wait order; parking_lot's eventual fairness
/// applies to the internal mutex.
#[derive(Debug, Default)]
pub struct BinarySemaphore {
    held: Mutex<bool>,
    freed: Condvar,
}

impl BinarySemaphore {
    /// Create a new semaphore in the free state.
    pub const fn new() -> Self {
        Self {
            held: Mutex::new(false),
            freed: Condvar::new(),
        }
    }

    /// Acquire the semaphore, blocking until it is free.
    pub fn acquire(&self) {
        let mut held = self.held.lock();
        while *held {
            self.freed.wait(&mut held);
        }
        *held = true;
    }

    /// Acquire the semaphore without blocking. Returns `true` on success.
    pub fn try_acquire(&self) -> bool {
        let mut held = self.held.lock();
        if *held {
            false
        } else {
            *held = true;
            true
        }
    }

    /// Release the semaphore, waking one waiter.
    ///
    /// # Panics
    ///
    /// Panics if the semaphore is not currently held. Releasing a free
    /// semaphore is a protocol violation on the caller's side, not a
    /// recoverable condition.
    pub fn release(&self) {
        let mut held = self.held.lock();
        assert!(*held, "release of a binary semaphore that is not held");
        *held = false;
        drop(held);
        self.freed.notify_one();
    }

    /// Whether the semaphore is currently held.
    pub fn is_held(&self) -> bool {
        *self.held.lock()
    }
}
