//! The context bundle handed to a task body.

use crate::core::TaskStatus;
use crate::errors::BuildError;
use crate::events::{LogEntry, TaskLogger};
use std::fmt;
use std::sync::Arc;

/// Everything a task body gets to work with.
pub struct TaskContext<I> {
    stage_name: String,
    task_name: String,
    input: I,
    logger: Arc<dyn TaskLogger>,
}

impl<I> TaskContext<I> {
    /// Creates a new task context.
    #[must_use]
    pub fn new(
        stage_name: impl Into<String>,
        task_name: impl Into<String>,
        input: I,
        logger: Arc<dyn TaskLogger>,
    ) -> Self {
        Self {
            stage_name: stage_name.into(),
            task_name: task_name.into(),
            input,
            logger,
        }
    }

    /// Name of the enclosing stage.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// Name of this task.
    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// The task input.
    #[must_use]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Consumes the context, returning the input.
    #[must_use]
    pub fn into_input(self) -> I {
        self.input
    }

    /// The injected logger.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn TaskLogger> {
        &self.logger
    }

    /// Builds a [`BuildError`] carrying this task's provenance.
    #[must_use]
    pub fn create_build_error(&self, message: impl Into<String>) -> BuildError {
        BuildError::new(message, &self.stage_name, &self.task_name)
    }

    /// Normalizes any boundary error into a [`BuildError`].
    #[must_use]
    pub fn wrap_error(&self, err: impl fmt::Display) -> BuildError {
        self.create_build_error(err.to_string())
    }

    /// Reports progress from inside the task body.
    pub fn log(&self, message: impl Into<String>) {
        self.logger.log(LogEntry::new(
            &self.stage_name,
            &self.task_name,
            TaskStatus::Running,
            message,
        ));
    }
}

impl<I: fmt::Debug> fmt::Debug for TaskContext<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("stage_name", &self.stage_name)
            .field("task_name", &self.task_name)
            .field("input", &self.input)
            .finish_non_exhaustive()
    }
}
