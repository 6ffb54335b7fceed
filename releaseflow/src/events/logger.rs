//! Task logger trait and implementations.

use crate::core::TaskStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, Level};

/// A single task lifecycle log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Stage the task belongs to.
    pub stage_name: String,
    /// Task that produced the entry.
    pub task_name: String,
    /// Lifecycle status.
    pub status: TaskStatus,
    /// Log message.
    pub message: String,
    /// When the entry was created.
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    /// Creates a new entry stamped with the current time.
    #[must_use]
    pub fn new(
        stage_name: impl Into<String>,
        task_name: impl Into<String>,
        status: TaskStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            task_name: task_name.into(),
            status,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Logging capability handed to every task invocation.
///
/// Tasks receive the logger through their context instead of reaching for
/// global state, which keeps them testable in isolation.
pub trait TaskLogger: Send + Sync {
    /// Records a log entry. Must never fail.
    fn log(&self, entry: LogEntry);
}

/// A logger that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpTaskLogger;

impl TaskLogger for NoOpTaskLogger {
    fn log(&self, _entry: LogEntry) {}
}

/// A logger that forwards entries to `tracing`.
#[derive(Debug, Clone)]
pub struct TracingTaskLogger {
    level: Level,
}

impl Default for TracingTaskLogger {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl TracingTaskLogger {
    /// Creates a tracing logger with the specified level.
    #[must_use]
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    /// Creates a debug-level logger.
    #[must_use]
    pub fn debug() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl TaskLogger for TracingTaskLogger {
    fn log(&self, entry: LogEntry) {
        if self.level == Level::DEBUG {
            debug!(
                stage = %entry.stage_name,
                task = %entry.task_name,
                status = %entry.status,
                "{}", entry.message
            );
        } else {
            info!(
                stage = %entry.stage_name,
                task = %entry.task_name,
                status = %entry.status,
                "{}", entry.message
            );
        }
    }
}

/// A logger that keeps every entry in memory, for tests.
#[derive(Debug, Default)]
pub struct CollectingTaskLogger {
    entries: parking_lot::RwLock<Vec<LogEntry>>,
}

impl CollectingTaskLogger {
    /// Creates a new collecting logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected entries in emission order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().clone()
    }

    /// Returns just the messages, in emission order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.message.clone()).collect()
    }

    /// Returns the entries produced by one task.
    #[must_use]
    pub fn entries_for_task(&self, task_name: &str) -> Vec<LogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.task_name == task_name)
            .cloned()
            .collect()
    }

    /// Returns the number of collected entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Clears all collected entries.
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl TaskLogger for CollectingTaskLogger {
    fn log(&self, entry: LogEntry) {
        self.entries.write().push(entry);
    }
}
