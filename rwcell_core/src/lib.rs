//! # Readers-Writers Coordination Core
//!
//! First-readers-writers coordination over a single shared value: any
//! number of readers may read concurrently, a writer gets exclusive access,
//! and readers and writers never overlap. The crate reproduces the classic
//! two-lock protocol (a counter mutex plus a binary resource lock) rather
//! than hiding it behind a library readers-writer lock, because the
//! hand-rolled coordination *is* the point.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────────────────┐
//! │  Writer task ├────►│  RwCell<T>                    │
//! └──────────────┘     │  ┌─────────────────────────┐  │
//! ┌──────────────┐     │  │ AccessCoordinator       │  │
//! │  Reader task ├────►│  │  count_lock (reader #)  │  │
//! └──────────────┘     │  │  resource_lock (binary) │  │
//! ┌──────────────┐     │  └─────────────────────────┘  │
//! │  Reader task ├────►│  value: UnsafeCell<T>         │
//! └──────────────┘     └───────────────────────────────┘
//! ```
//!
//! The coordinator is the leaf: it knows nothing about the value. The cell
//! bundles one coordinator with the value it protects, so the whole
//! aggregate is explicitly owned; there are no ambient globals.
//!
//! ## The Protocol
//!
//! - A reader locks `count_lock`, increments the reader counter, and, if it
//!   is the first of its cohort, acquires `resource_lock` on behalf of all
//!   readers. On exit it decrements, and the *last* reader out releases
//!   `resource_lock`.
//! - A writer acquires and releases `resource_lock` directly.
//!
//! No task ever acquires the two locks out of order, so the protocol cannot
//! deadlock.
//!
//! ## Starvation Warning
//!
//! This is the **reader-preference** variant: while any reader is active,
//! newly arriving readers join the cohort immediately, ahead of any waiting
//! writer. Under sustained reader arrival a writer can wait forever. That
//! is the documented behavior of the classic algorithm, preserved
//! deliberately; [`NativeCoordinator`] exists as a fairness-hardened
//! comparison point and is shown behaviorally equivalent (for the safety
//! properties) in the test suite.
//!
//! ## Usage
//!
//! Guard style:
//!
//! ```
//! use rwcell_core::RwCell;
//!
//! let cell = RwCell::new(0_i64);
//!
//! {
//!     let mut guard = cell.write_guard();
//!     *guard = 42;
//! }
//!
//! assert_eq!(*cell.read_guard(), 42);
//! ```
//!
//! Explicit protocol style, as the scheme is classically presented:
//!
//! ```
//! use rwcell_core::RwCell;
//!
//! let cell = RwCell::new(0_i64);
//!
//! cell.enter_write();
//! // Safety: write access is held.
//! unsafe { cell.write(7) };
//! cell.exit_write();
//!
//! let readers = cell.enter_read();
//! assert_eq!(readers, 1);
//! // Safety: read access is held.
//! let value = unsafe { cell.read() };
//! cell.exit_read();
//! assert_eq!(value, 7);
//! ```
//!
//! ## Simulation
//!
//! [`run_simulation`] spawns a configurable number of reader and writer
//! threads (reference deployment: 3 writers, 10 readers), each performing
//! one jittered access, and returns their reports:
//!
//! ```
//! use rwcell_core::{run_simulation, RwCell, SimConfig};
//! use std::sync::Arc;
//!
//! let config = SimConfig {
//!     jitter_min_ms: 0,
//!     jitter_max_ms: 0,
//!     ..SimConfig::default()
//! };
//! let cell = Arc::new(RwCell::new(0_i64));
//! let reports = run_simulation(Arc::clone(&cell), &config).unwrap();
//! assert_eq!(reports.writes.len(), config.writers);
//! assert_eq!(reports.reads.len(), config.readers);
//! ```
//!
//! ## Thread Safety
//!
//! - [`RwCell`] is `Send`/`Sync` under the same bounds as a lock type.
//! - [`AccessCoordinator`] and [`NativeCoordinator`] are freely shared.
//! - Misuse of the protocol (an exit without a matching enter) panics; it
//!   is a programming-contract violation, not a runtime error.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod cell;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod jitter;
pub mod native;
pub mod semaphore;
pub mod tasks;

pub use cell::{ReadGuard, RwCell, WriteGuard};
pub use config::{ConfigError, ConfigLoader, LogLevel, SimConfig};
pub use coordinator::{AccessCoordinator, Coordinator};
pub use error::{SimError, SimResult};
pub use jitter::{Jitter, ValueSource};
pub use native::NativeCoordinator;
pub use semaphore::BinarySemaphore;
pub use tasks::{ReadReport, SimReports, WriteReport, run_reader, run_simulation, run_writer};

/// Initialize tracing for test and example binaries.
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_thread_names(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
