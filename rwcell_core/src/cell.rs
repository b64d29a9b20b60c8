//! The protected shared value.
//!
//! [`RwCell`] bundles one [`Coordinator`] instance with the value it
//! protects, so the whole aggregate is explicitly owned and passed around;
//! there are no ambient globals. The value itself carries no locking logic:
//! its access discipline is the caller's adherence to the coordinator
//! protocol, either through the raw `unsafe` accessors or through the RAII
//! guards layered on top.

use crate::coordinator::{AccessCoordinator, Coordinator};
use std::cell::UnsafeCell;
use std::ops::{Deref, DerefMut};

/// A single shared value guarded by a readers-writer coordinator.
///
/// Two access styles are offered:
///
/// - the explicit protocol: [`enter_read`](RwCell::enter_read) /
///   [`read`](RwCell::read) / [`exit_read`](RwCell::exit_read) (and the
///   write-side equivalents), mirroring how the coordination scheme is
///   classically presented;
/// - RAII guards: [`read_guard`](RwCell::read_guard) and
///   [`write_guard`](RwCell::write_guard), which pair the exit with guard
///   drop and expose the value through `Deref`.
///
/// # Example
///
/// ```
/// use rwcell_core::RwCell;
///
/// let cell = RwCell::new(0_i64);
///
/// {
///     let mut guard = cell.write_guard();
///     *guard = 42;
/// }
///
/// let guard = cell.read_guard();
/// assert_eq!(*guard, 42);
/// assert_eq!(guard.readers_at_entry(), 1);
/// ```
#[derive(Debug)]
pub struct RwCell<T, C: Coordinator = AccessCoordinator> {
    coordinator: C,
    value: UnsafeCell<T>,
}

// Same bounds as a lock type: handing the cell across threads moves T,
// sharing it hands out &T to concurrent readers.
unsafe impl<T: Send, C: Coordinator> Send for RwCell<T, C> {}
unsafe impl<T: Send + Sync, C: Coordinator> Sync for RwCell<T, C> {}

impl<T> RwCell<T> {
    /// Create a cell protected by the classic two-lock [`AccessCoordinator`].
    pub const fn new(value: T) -> Self {
        Self {
            coordinator: AccessCoordinator::new(),
            value: UnsafeCell::new(value),
        }
    }
}

impl<T, C: Coordinator> RwCell<T, C> {
    /// Create a cell protected by the given coordinator.
    pub fn with_coordinator(value: T, coordinator: C) -> Self {
        Self {
            coordinator,
            value: UnsafeCell::new(value),
        }
    }

    /// Obtain read access. See [`Coordinator::enter_read`].
    pub fn enter_read(&self) -> usize {
        self.coordinator.enter_read()
    }

    /// Give up read access. See [`Coordinator::exit_read`].
    pub fn exit_read(&self) {
        self.coordinator.exit_read();
    }

    /// Obtain exclusive write access. See [`Coordinator::enter_write`].
    pub fn enter_write(&self) {
        self.coordinator.enter_write();
    }

    /// Give up write access. See [`Coordinator::exit_write`].
    pub fn exit_write(&self) {
        self.coordinator.exit_write();
    }

    /// Number of readers currently holding read access.
    pub fn reader_count(&self) -> usize {
        self.coordinator.reader_count()
    }

    /// Copy the current value out of the cell.
    ///
    /// # Safety
    ///
    /// The caller must hold read or write access, that is, be between a
    /// matching `enter_read`/`exit_read` or `enter_write`/`exit_write` pair
    /// on this cell's coordinator. The coordinator's release/acquire
    /// ordering is what makes the read race-free.
    pub unsafe fn read(&self) -> T
    where
        T: Copy,
    {
        unsafe { *self.value.get() }
    }

    /// Overwrite the stored value entirely.
    ///
    /// # Safety
    ///
    /// The caller must hold write access, i.e. be between a matching
    /// `enter_write`/`exit_write` pair on this cell's coordinator.
    pub unsafe fn write(&self, value: T) {
        unsafe { *self.value.get() = value };
    }

    /// Acquire read access and return a guard that releases it on drop.
    pub fn read_guard(&self) -> ReadGuard<'_, T, C> {
        let readers_at_entry = self.coordinator.enter_read();
        ReadGuard {
            cell: self,
            readers_at_entry,
        }
    }

    /// Acquire write access and return a guard that releases it on drop.
    pub fn write_guard(&self) -> WriteGuard<'_, T, C> {
        self.coordinator.enter_write();
        WriteGuard { cell: self }
    }

    /// Mutable access through exclusive ownership; no coordination needed.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    /// Consume the cell and return the inner value.
    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

/// Shared read access to an [`RwCell`], released on drop.
#[must_use = "read access is released as soon as the guard is dropped"]
pub struct ReadGuard<'a, T, C: Coordinator> {
    cell: &'a RwCell<T, C>,
    readers_at_entry: usize,
}

impl<T, C: Coordinator> ReadGuard<'_, T, C> {
    /// The reader count observed when this guard entered, including this
    /// reader itself. Captured under the coordinator's counter lock, so it
    /// reflects the guard's own registration exactly.
    pub fn readers_at_entry(&self) -> usize {
        self.readers_at_entry
    }
}

impl<T, C: Coordinator> Deref for ReadGuard<'_, T, C> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // Safety: read access is held for the guard's lifetime; the
        // coordinator keeps writers out.
        unsafe { &*self.cell.value.get() }
    }
}

impl<T, C: Coordinator> Drop for ReadGuard<'_, T, C> {
    fn drop(&mut self) {
        self.cell.coordinator.exit_read();
    }
}

/// Exclusive write access to an [`RwCell`], released on drop.
#[must_use = "write access is released as soon as the guard is dropped"]
pub struct WriteGuard<'a, T, C: Coordinator> {
    cell: &'a RwCell<T, C>,
}

impl<T, C: Coordinator> Deref for WriteGuard<'_, T, C> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        // Safety: write access is exclusive for the guard's lifetime.
        unsafe { &*self.cell.value.get() }
    }
}

impl<T, C: Coordinator> DerefMut for WriteGuard<'_, T, C> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // Safety: write access is exclusive for the guard's lifetime.
        unsafe { &mut *self.cell.value.get() }
    }
}

impl<T, C: Coordinator> Drop for WriteGuard<'_, T, C> {
    fn drop(&mut self) {
        self.cell.coordinator.exit_write();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::native::NativeCoordinator;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_explicit_protocol_roundtrip() {
        let cell = RwCell::new(0_i64);

        cell.enter_write();
        // Safety: write access held.
        unsafe { cell.write(7) };
        cell.exit_write();

        let readers = cell.enter_read();
        assert_eq!(readers, 1);
        // Safety: read access held.
        let value = unsafe { cell.read() };
        cell.exit_read();

        assert_eq!(value, 7);
        assert_eq!(cell.reader_count(), 0);
    }

    #[test]
    fn test_guards_release_on_drop() {
        let cell = RwCell::new(1_i64);

        {
            let guard = cell.read_guard();
            assert_eq!(*guard, 1);
            assert_eq!(cell.reader_count(), 1);
        }
        assert_eq!(cell.reader_count(), 0);

        {
            let mut guard = cell.write_guard();
            *guard = 2;
        }

        let guard = cell.read_guard();
        assert_eq!(*guard, 2);
    }

    #[test]
    fn test_readers_at_entry_counts_cohort() {
        let cell = RwCell::new(0_i64);

        let first = cell.read_guard();
        let second = cell.read_guard();
        assert_eq!(first.readers_at_entry(), 1);
        assert_eq!(second.readers_at_entry(), 2);

        drop(first);
        drop(second);
        assert_eq!(cell.reader_count(), 0);
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut cell = RwCell::new(5_i64);
        *cell.get_mut() = 6;
        assert_eq!(cell.into_inner(), 6);
    }

    #[test]
    fn test_shared_across_threads() {
        let cell = Arc::new(RwCell::new(0_i64));

        {
            let mut guard = cell.write_guard();
            *guard = 99;
        }

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cell = Arc::clone(&cell);
                thread::spawn(move || *cell.read_guard())
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 99);
        }
    }

    #[test]
    fn test_native_coordinator_backend() {
        let cell = RwCell::with_coordinator(3_i64, NativeCoordinator::new());

        {
            let mut guard = cell.write_guard();
            *guard += 1;
        }

        let guard = cell.read_guard();
        assert_eq!(*guard, 4);
        assert_eq!(guard.readers_at_entry(), 1);
    }
}
