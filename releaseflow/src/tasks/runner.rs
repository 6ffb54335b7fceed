//! The task runner: skip predicates, lifecycle logging and error propagation
//! around a single task body.

use super::{SkipPredicate, Step, TaskContext};
use crate::core::TaskStatus;
use crate::errors::BuildError;
use crate::events::{default_logger, LogEntry, TaskLogger};
use async_trait::async_trait;
use futures::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

type TaskFn<I, O> = Box<dyn Fn(TaskContext<I>) -> BoxFuture<'static, Result<O, BuildError>> + Send + Sync>;
type SummaryFn<O> = Box<dyn Fn(&O) -> String + Send + Sync>;

/// A task body wrapped with skip predicates and lifecycle logging.
pub struct TaskRunner<I, O> {
    stage_name: String,
    task_name: String,
    task: TaskFn<I, O>,
    skip_predicates: Vec<SkipPredicate<I, O>>,
    summary: Option<SummaryFn<O>>,
    logger: Arc<dyn TaskLogger>,
}

impl<I, O> TaskRunner<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    /// Creates a runner for `task` with no skip predicates.
    pub fn new<F, Fut>(stage_name: impl Into<String>, task_name: impl Into<String>, task: F) -> Self
    where
        F: Fn(TaskContext<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, BuildError>> + Send + 'static,
    {
        Self {
            stage_name: stage_name.into(),
            task_name: task_name.into(),
            task: Box::new(move |ctx: TaskContext<I>| -> BoxFuture<'static, Result<O, BuildError>> {
                Box::pin(task(ctx))
            }),
            skip_predicates: Vec::new(),
            summary: None,
            logger: default_logger(),
        }
    }

    /// Appends a skip predicate. Predicates are evaluated in the order added.
    #[must_use]
    pub fn skip_if(mut self, predicate: SkipPredicate<I, O>) -> Self {
        self.skip_predicates.push(predicate);
        self
    }

    /// Appends several skip predicates.
    #[must_use]
    pub fn with_skip_predicates(mut self, predicates: impl IntoIterator<Item = SkipPredicate<I, O>>) -> Self {
        self.skip_predicates.extend(predicates);
        self
    }

    /// Sets the function describing a successful output in the
    /// `"Finished."` entry.
    #[must_use]
    pub fn with_summary<F>(mut self, summary: F) -> Self
    where
        F: Fn(&O) -> String + Send + Sync + 'static,
    {
        self.summary = Some(Box::new(summary));
        self
    }

    /// Sets the logger handed to the task.
    #[must_use]
    pub fn with_logger(mut self, logger: Arc<dyn TaskLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// The enclosing stage name.
    #[must_use]
    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }

    /// The task name.
    #[must_use]
    pub fn task_name(&self) -> &str {
        &self.task_name
    }

    /// Runs the task against `input`.
    ///
    /// The first skip predicate with an opinion short-circuits the body and
    /// its default result is returned. Failures from the body are returned
    /// unchanged.
    pub async fn run(&self, input: I) -> Result<O, BuildError> {
        self.execute(input).await
    }

    async fn execute(&self, input: I) -> Result<O, BuildError> {
        if let Some(decision) = self.skip_predicates.iter().find_map(|p| p(&input)) {
            self.log(
                TaskStatus::Skipped,
                format!("Skipping task {}: {}", self.task_name, decision.message),
            );
            return Ok(decision.default_result);
        }

        self.log(TaskStatus::Started, "Starting...");

        let ctx = TaskContext::new(
            self.stage_name.clone(),
            self.task_name.clone(),
            input,
            Arc::clone(&self.logger),
        );
        let output = (self.task)(ctx).await?;

        let message = match &self.summary {
            Some(summary) => format!("Finished. {}", summary(&output)),
            None => "Finished.".to_string(),
        };
        self.log(TaskStatus::Succeeded, message);

        Ok(output)
    }

    fn log(&self, status: TaskStatus, message: impl Into<String>) {
        self.logger
            .log(LogEntry::new(&self.stage_name, &self.task_name, status, message));
    }
}

impl<I, O> fmt::Debug for TaskRunner<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRunner")
            .field("stage_name", &self.stage_name)
            .field("task_name", &self.task_name)
            .field("skip_predicates", &self.skip_predicates.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl<T> Step<T> for TaskRunner<T, T>
where
    T: Send + 'static,
{
    fn name(&self) -> &str {
        &self.task_name
    }

    async fn run(&self, input: T) -> Result<T, BuildError> {
        self.execute(input).await
    }
}
