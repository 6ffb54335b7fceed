//! Task logging.
//!
//! Every task invocation is handed an [`Arc<dyn TaskLogger>`](TaskLogger)
//! through its context. The logger is the only shared resource in a run;
//! tasks execute one at a time, so entries arrive strictly ordered.

mod logger;

pub use logger::{CollectingTaskLogger, LogEntry, NoOpTaskLogger, TaskLogger, TracingTaskLogger};

use std::sync::Arc;

/// Returns the logger used when none is configured.
#[must_use]
pub fn default_logger() -> Arc<dyn TaskLogger> {
    Arc::new(TracingTaskLogger::default())
}
