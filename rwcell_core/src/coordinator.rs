//! The two-lock readers-writer entry/exit protocol.
//!
//! This module implements the classic first-readers-writers coordination
//! scheme: a counter mutex (`count_lock`) serializes reader bookkeeping, and
//! a binary resource lock represents "a writer, or at least one reader,
//! currently owns the shared value". The first reader of a cohort takes the
//! resource lock on behalf of every reader that piles in behind it; the last
//! reader out releases it. Writers take and release the resource lock
//! directly.
//!
//! # Reader Preference
//!
//! This is the **reader-preference** variant: a reader that arrives while
//! any reader is active joins the cohort immediately, even if a writer is
//! already waiting on the resource lock. Under sustained reader arrival a
//! writer can therefore starve indefinitely. That bias is inherent to the
//! classic algorithm and is kept on purpose; see
//! [`NativeCoordinator`](crate::native::NativeCoordinator) for a
//! fairness-hardened alternative.
//!
//! | Scenario                    | Behavior                                   |
//! |-----------------------------|--------------------------------------------|
//! | No writer active            | Readers enter immediately                  |
//! | Writer active               | First reader blocks; cohort queues behind  |
//! | Readers active, writer waits| New readers still enter (preference bias)  |
//! | Last reader leaves          | Resource lock released, a writer may enter |

use crate::semaphore::BinarySemaphore;
use parking_lot::Mutex;

/// Entry/exit protocol for shared-value access.
///
/// Implementations enforce the readers-writer exclusion invariant: at any
/// instant either any number of readers hold read access and no writer holds
/// write access, or exactly one writer holds write access and no reader
/// holds read access.
///
/// Misuse (an exit without a matching enter) is a contract violation and
/// panics rather than returning an error.
pub trait Coordinator: Send + Sync {
    /// Obtain read access, blocking while a writer holds the resource.
    ///
    /// Returns the number of readers holding access after this call,
    /// including the caller, captured atomically with the caller's own
    /// registration.
    fn enter_read(&self) -> usize;

    /// Give up read access obtained via [`enter_read`](Self::enter_read).
    fn exit_read(&self);

    /// Obtain exclusive write access, blocking while any reader or another
    /// writer holds the resource.
    fn enter_write(&self);

    /// Give up write access obtained via [`enter_write`](Self::enter_write).
    fn exit_write(&self);

    /// Number of readers currently holding read access.
    fn reader_count(&self) -> usize;
}

/// The classic hand-rolled two-lock coordinator.
///
/// `count_lock` guards the reader counter; the resource lock is a
/// [`BinarySemaphore`] because the thread that releases it (the last reader
/// of a cohort) is generally not the thread that acquired it (the first
/// reader).
///
/// Both locks are infallible to construct, so a coordinator cannot fail to
/// initialize.
#[derive(Debug, Default)]
pub struct AccessCoordinator {
    count_lock: Mutex<usize>,
    resource_lock: BinarySemaphore,
}

impl AccessCoordinator {
    /// Create a coordinator with no readers and no writer active.
    pub const fn new() -> Self {
        Self {
            count_lock: Mutex::new(0),
            resource_lock: BinarySemaphore::new(),
        }
    }

    /// Whether the resource lock is currently held by a reader cohort or a
    /// writer. Diagnostic only; the answer may be stale by the time the
    /// caller looks at it.
    pub fn resource_held(&self) -> bool {
        self.resource_lock.is_held()
    }
}

impl Coordinator for AccessCoordinator {
    fn enter_read(&self) -> usize {
        let mut count = self.count_lock.lock();
        *count += 1;
        if *count == 1 {
            // First reader in: lock writers out on behalf of the whole
            // cohort. Blocking here while holding count_lock is what stalls
            // later readers behind an active writer.
            self.resource_lock.acquire();
        }
        *count
    }

    fn exit_read(&self) {
        let mut count = self.count_lock.lock();
        assert!(*count > 0, "exit_read without a matching enter_read");
        *count -= 1;
        if *count == 0 {
            // Last reader out: let a waiting writer proceed.
            self.resource_lock.release();
        }
    }

    fn enter_write(&self) {
        self.resource_lock.acquire();
    }

    fn exit_write(&self) {
        self.resource_lock.release();
    }

    fn reader_count(&self) -> usize {
        *self.count_lock.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_single_reader_cycle() {
        let coord = AccessCoordinator::new();
        assert_eq!(coord.reader_count(), 0);

        assert_eq!(coord.enter_read(), 1);
        assert_eq!(coord.reader_count(), 1);
        assert!(coord.resource_held());

        coord.exit_read();
        assert_eq!(coord.reader_count(), 0);
        assert!(!coord.resource_held());
    }

    #[test]
    fn test_reader_cohort_shares_resource_lock() {
        let coord = AccessCoordinator::new();

        assert_eq!(coord.enter_read(), 1);
        assert_eq!(coord.enter_read(), 2);
        assert_eq!(coord.enter_read(), 3);
        assert!(coord.resource_held());

        coord.exit_read();
        coord.exit_read();
        // Cohort still active, resource stays locked.
        assert!(coord.resource_held());

        coord.exit_read();
        assert!(!coord.resource_held());
    }

    #[test]
    fn test_writer_cycle() {
        let coord = AccessCoordinator::new();

        coord.enter_write();
        assert!(coord.resource_held());
        assert_eq!(coord.reader_count(), 0);

        coord.exit_write();
        assert!(!coord.resource_held());
    }

    #[test]
    #[should_panic(expected = "exit_read without a matching enter_read")]
    fn test_unbalanced_exit_read_panics() {
        let coord = AccessCoordinator::new();
        coord.exit_read();
    }

    #[test]
    #[should_panic(expected = "not held")]
    fn test_unbalanced_exit_write_panics() {
        let coord = AccessCoordinator::new();
        coord.exit_write();
    }

    /// A writer cannot enter while any reader is active, and a late reader
    /// still enters ahead of the waiting writer. This is the documented
    /// starvation-prone preference, demonstrated rather than fixed.
    #[test]
    fn test_reader_preference_over_waiting_writer() {
        let coord = Arc::new(AccessCoordinator::new());
        let writer_entered = Arc::new(AtomicBool::new(false));

        assert_eq!(coord.enter_read(), 1);

        let writer_coord = Arc::clone(&coord);
        let writer_flag = Arc::clone(&writer_entered);
        let writer = thread::spawn(move || {
            writer_coord.enter_write();
            writer_flag.store(true, Ordering::Release);
            writer_coord.exit_write();
        });

        // Give the writer time to park on the resource lock. The protocol,
        // not the sleep, guarantees it cannot enter while we hold read
        // access.
        thread::sleep(Duration::from_millis(50));
        assert!(!writer_entered.load(Ordering::Acquire));

        // A second reader joins the cohort immediately despite the waiting
        // writer.
        assert_eq!(coord.enter_read(), 2);
        assert!(!writer_entered.load(Ordering::Acquire));

        coord.exit_read();
        coord.exit_read();

        writer.join().unwrap();
        assert!(writer_entered.load(Ordering::Acquire));
        assert_eq!(coord.reader_count(), 0);
    }

    #[test]
    fn test_writer_blocks_first_reader() {
        let coord = Arc::new(AccessCoordinator::new());
        coord.enter_write();

        let reader_coord = Arc::clone(&coord);
        let reader = thread::spawn(move || {
            let seen = reader_coord.enter_read();
            reader_coord.exit_read();
            seen
        });

        thread::sleep(Duration::from_millis(50));
        assert!(!reader.is_finished());

        coord.exit_write();
        assert_eq!(reader.join().unwrap(), 1);
    }

    proptest! {
        /// Count conservation: for any balanced enter/exit sequence the
        /// reader count tracks the model exactly and drains back to zero.
        #[test]
        fn prop_reader_count_matches_model(ops in proptest::collection::vec(any::<bool>(), 0..64)) {
            let coord = AccessCoordinator::new();
            let mut depth = 0_usize;

            for enter in ops {
                if enter {
                    depth += 1;
                    prop_assert_eq!(coord.enter_read(), depth);
                } else if depth > 0 {
                    depth -= 1;
                    coord.exit_read();
                }
                prop_assert_eq!(coord.reader_count(), depth);
                prop_assert_eq!(coord.resource_held(), depth > 0);
            }

            while depth > 0 {
                coord.exit_read();
                depth -= 1;
            }
            prop_assert_eq!(coord.reader_count(), 0);
            prop_assert!(!coord.resource_held());
        }
    }
}
