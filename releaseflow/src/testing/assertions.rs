//! Assertions over task logs and build errors.

use crate::core::TaskStatus;
use crate::errors::BuildError;
use crate::events::CollectingTaskLogger;

/// Asserts that `task` logged a skip.
pub fn assert_task_skipped(logger: &CollectingTaskLogger, task: &str) {
    let entries = logger.entries_for_task(task);
    assert!(
        entries.iter().any(|e| e.status == TaskStatus::Skipped),
        "Expected task '{}' to be skipped, got: {:?}",
        task,
        entries.iter().map(|e| &e.message).collect::<Vec<_>>()
    );
}

/// Asserts that `task` ran to completion.
pub fn assert_task_succeeded(logger: &CollectingTaskLogger, task: &str) {
    let entries = logger.entries_for_task(task);
    assert!(
        entries.iter().any(|e| e.status == TaskStatus::Succeeded),
        "Expected task '{}' to succeed, got: {:?}",
        task,
        entries.iter().map(|e| &e.message).collect::<Vec<_>>()
    );
}

/// Asserts that `task` never logged anything.
pub fn assert_task_not_run(logger: &CollectingTaskLogger, task: &str) {
    let entries = logger.entries_for_task(task);
    assert!(
        entries.is_empty(),
        "Expected task '{}' not to run, got: {:?}",
        task,
        entries.iter().map(|e| &e.message).collect::<Vec<_>>()
    );
}

/// Asserts the provenance and message of a build error.
pub fn assert_build_error(err: &BuildError, stage: &str, task: &str, message: &str) {
    assert_eq!(
        (err.stage_name.as_str(), err.task_name.as_str(), err.message.as_str()),
        (stage, task, message),
        "Unexpected build error: {err}"
    );
}
