//! Coordinator variant backed by a native readers-writer lock.
//!
//! Exists as a comparison point for [`AccessCoordinator`]: same entry/exit
//! surface and the same exclusion invariant, but the lock fairness policy is
//! whatever `parking_lot::RwLock` implements (writers are not starved by a
//! continuous stream of readers). The equivalence tests exercise both
//! implementations through the shared [`Coordinator`] trait.

use crate::coordinator::Coordinator;
use parking_lot::RwLock;
use std::mem;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Readers-writer coordination delegated to `parking_lot::RwLock<()>`.
///
/// Guards are forgotten on entry and force-unlocked on exit so the lock can
/// be driven through the explicit `enter_*`/`exit_*` protocol instead of
/// lexically scoped guards. The reader count is tracked separately because
/// the native lock does not expose its own.
#[derive(Debug, Default)]
pub struct NativeCoordinator {
    lock: RwLock<()>,
    readers: AtomicUsize,
}

impl NativeCoordinator {
    /// Create a coordinator with no readers and no writer active.
    pub const fn new() -> Self {
        Self {
            lock: RwLock::new(()),
            readers: AtomicUsize::new(0),
        }
    }
}

impl Coordinator for NativeCoordinator {
    fn enter_read(&self) -> usize {
        mem::forget(self.lock.read());
        self.readers.fetch_add(1, Ordering::AcqRel) + 1
    }

    fn exit_read(&self) {
        assert!(
            self.readers.load(Ordering::Acquire) > 0,
            "exit_read without a matching enter_read"
        );
        self.readers.fetch_sub(1, Ordering::AcqRel);
        // Safety: a read lock obtained in enter_read is still outstanding
        // for this caller; its guard was forgotten on entry.
        unsafe { self.lock.force_unlock_read() };
    }

    fn enter_write(&self) {
        mem::forget(self.lock.write());
    }

    fn exit_write(&self) {
        // Safety: the write lock obtained in enter_write is outstanding; its
        // guard was forgotten on entry.
        unsafe { self.lock.force_unlock_write() };
    }

    fn reader_count(&self) -> usize {
        self.readers.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_reader_cycle() {
        let coord = NativeCoordinator::new();
        assert_eq!(coord.enter_read(), 1);
        assert_eq!(coord.enter_read(), 2);
        assert_eq!(coord.reader_count(), 2);

        coord.exit_read();
        coord.exit_read();
        assert_eq!(coord.reader_count(), 0);

        // Writer can enter once readers have drained.
        coord.enter_write();
        coord.exit_write();
    }

    #[test]
    fn test_writer_excludes_reader() {
        let coord = Arc::new(NativeCoordinator::new());
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

    #[test]
    #[should_panic(expected = "exit_read without a matching enter_read")]
    fn test_unbalanced_exit_read_panics() {
        let coord = NativeCoordinator::new();
        coord.exit_read();
    }
}
