//! Observer-side view of a running experiment.

use parking_lot::Mutex;

/// One progress update published by the worker.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Fraction of the budget consumed, in `[0, 1]`.
    pub fraction: f64,
    /// The algorithm's status line.
    pub status: String,
}

/// Single-slot, overwrite-on-publish channel.
///
/// The worker never blocks on a slow observer: a new update replaces any
/// unread one, so only the latest is ever delivered.
#[derive(Debug, Default)]
pub struct ProgressSlot {
    slot: Mutex<Option<Progress>>,
}

impl ProgressSlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `progress`, dropping any unread update.
    pub fn publish(&self, progress: Progress) {
        *self.slot.lock() = Some(progress);
    }

    /// Takes the latest unread update, leaving the slot empty.
    pub fn take(&self) -> Option<Progress> {
        self.slot.lock().take()
    }

    /// The latest unread update, without consuming it.
    pub fn peek(&self) -> Option<Progress> {
        self.slot.lock().clone()
    }
}

/// Append-only execution log.
#[derive(Debug, Default)]
pub struct ExecutionLog {
    lines: Mutex<Vec<String>>,
}

impl ExecutionLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a line.
    pub fn append(&self, line: impl Into<String>) {
        self.lines.lock().push(line.into());
    }

    /// Number of lines written so far.
    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    /// Whether nothing was logged yet.
    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    /// Copy of every line.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Lines from index `from` on, for observers that poll incrementally.
    pub fn lines_since(&self, from: usize) -> Vec<String> {
        let lines = self.lines.lock();
        lines.get(from..).map(<[String]>::to_vec).unwrap_or_default()
    }
}

/// Progress and log shared between the worker and its observers.
#[derive(Debug, Default)]
pub struct ExperimentMonitor {
    progress: ProgressSlot,
    log: ExecutionLog,
}

impl ExperimentMonitor {
    /// Creates a monitor with an empty slot and log.
    pub fn new() -> Self {
        Self::default()
    }

    /// The progress slot.
    pub fn progress(&self) -> &ProgressSlot {
        &self.progress
    }

    /// The execution log.
    pub fn log(&self) -> &ExecutionLog {
        &self.log
    }

    pub(crate) fn report(&self, fraction: f64, status: String) {
        self.log.append(status.clone());
        self.progress.publish(Progress { fraction, status });
    }
}
