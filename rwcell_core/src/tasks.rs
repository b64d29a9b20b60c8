//! Reader and writer task bodies and thread orchestration.
//!
//! Each task sleeps a random arrival jitter, announces itself, performs
//! exactly one coordinated access to the shared cell, and reports what it
//! saw or wrote. Orchestration spawns the configured number of writer and
//! reader threads, joins them all, and collects the reports.

use crate::cell::RwCell;
use crate::config::SimConfig;
use crate::coordinator::Coordinator;
use crate::error::{SimError, SimResult};
use crate::jitter::{Jitter, ValueSource};
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::info;

// ─── Task Reports ───────────────────────────────────────────────────

/// What one reader observed during its single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadReport {
    /// Reader task index.
    pub reader_id: usize,
    /// Readers holding access the instant this one entered, itself
    /// included. Captured under the coordinator's counter lock.
    pub readers_at_entry: usize,
    /// Value read from the shared cell.
    pub value: i64,
}

/// What one writer published during its single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteReport {
    /// Writer task index.
    pub writer_id: usize,
    /// Value written to the shared cell.
    pub value: i64,
}

/// Reports from a completed simulation run.
#[derive(Debug, Clone, Default)]
pub struct SimReports {
    /// One report per writer, in writer-index order.
    pub writes: Vec<WriteReport>,
    /// One report per reader, in reader-index order.
    pub reads: Vec<ReadReport>,
}

// ─── Task Bodies ────────────────────────────────────────────────────

/// One reader's lifecycle: jitter, announce, read under the protocol.
pub fn run_reader<C: Coordinator>(
    id: usize,
    cell: &RwCell<i64, C>,
    jitter: &mut Jitter,
) -> ReadReport {
    jitter.pause();
    info!(reader = id, "waiting");

    let readers_at_entry = cell.enter_read();
    info!(reader = id, readers = readers_at_entry, "reading");

    // Safety: read access is held between enter_read and exit_read.
    let value = unsafe { cell.read() };
    info!(reader = id, value, "read complete");
    cell.exit_read();

    ReadReport {
        reader_id: id,
        readers_at_entry,
        value,
    }
}

/// One writer's lifecycle: jitter, announce, write under the protocol.
pub fn run_writer<C: Coordinator>(
    id: usize,
    cell: &RwCell<i64, C>,
    jitter: &mut Jitter,
    values: &mut ValueSource,
) -> WriteReport {
    jitter.pause();
    info!(writer = id, "waiting");

    cell.enter_write();
    let value = values.next_value();
    // Safety: write access is held between enter_write and exit_write.
    unsafe { cell.write(value) };
    info!(writer = id, value, "write complete");
    cell.exit_write();

    WriteReport {
        writer_id: id,
        value,
    }
}

// ─── Orchestration ──────────────────────────────────────────────────

/// Spawn the configured writer and reader threads against one shared cell,
/// join them all, and collect their reports.
///
/// Writer threads are spawned first, matching the classic presentation; the
/// arrival *order* at the cell is still decided by jitter and the scheduler.
/// If any spawn fails, threads created so far are joined before the error
/// is returned, so the caller never leaks running tasks.
pub fn run_simulation<C>(cell: Arc<RwCell<i64, C>>, config: &SimConfig) -> SimResult<SimReports>
where
    C: Coordinator + 'static,
{
    config.validate()?;
    let (jitter_min, jitter_max) = config.jitter_bounds();

    let mut writer_handles: Vec<JoinHandle<WriteReport>> = Vec::with_capacity(config.writers);
    let mut reader_handles: Vec<JoinHandle<ReadReport>> = Vec::with_capacity(config.readers);

    for index in 0..config.writers {
        let cell = Arc::clone(&cell);
        let mut jitter = Jitter::from_seed(
            task_seed(config.seed, "writer-jitter", index),
            jitter_min,
            jitter_max,
        );
        let mut values = ValueSource::from_seed(task_seed(config.seed, "writer-value", index));

        let spawned = thread::Builder::new()
            .name(format!("writer-{index}"))
            .spawn(move || run_writer(index, &cell, &mut jitter, &mut values));

        match spawned {
            Ok(handle) => writer_handles.push(handle),
            Err(source) => {
                join_abandoned(writer_handles, reader_handles);
                return Err(SimError::Spawn {
                    role: "writer",
                    index,
                    source,
                });
            }
        }
    }

    for index in 0..config.readers {
        let cell = Arc::clone(&cell);
        let mut jitter = Jitter::from_seed(
            task_seed(config.seed, "reader-jitter", index),
            jitter_min,
            jitter_max,
        );

        let spawned = thread::Builder::new()
            .name(format!("reader-{index}"))
            .spawn(move || run_reader(index, &cell, &mut jitter));

        match spawned {
            Ok(handle) => reader_handles.push(handle),
            Err(source) => {
                join_abandoned(writer_handles, reader_handles);
                return Err(SimError::Spawn {
                    role: "reader",
                    index,
                    source,
                });
            }
        }
    }

    let writes = writer_handles.into_iter().map(join_task).collect();
    let reads = reader_handles.into_iter().map(join_task).collect();

    Ok(SimReports { writes, reads })
}

/// Per-task RNG seed derived from the base seed, the task role, and the
/// task index, so every task draws an independent deterministic stream.
fn task_seed(base: u64, lane: &str, index: usize) -> u64 {
    let mut hasher = DefaultHasher::new();
    (base, lane, index).hash(&mut hasher);
    hasher.finish()
}

fn join_task<R>(handle: JoinHandle<R>) -> R {
    match handle.join() {
        Ok(report) => report,
        // A task panic is a protocol-contract violation; surface it.
        Err(panic) => std::panic::resume_unwind(panic),
    }
}

/// Join tasks that were spawned before a later spawn failed. Their reports
/// are discarded; the point is not to leak running threads.
fn join_abandoned(
    writers: Vec<JoinHandle<WriteReport>>,
    readers: Vec<JoinHandle<ReadReport>>,
) {
    for handle in writers {
        let _ = handle.join();
    }
    for handle in readers {
        let _ = handle.join();
    }
}
