//! Tasks: the smallest executable units of a release pipeline.
//!
//! A task is a body function wrapped by a [`TaskRunner`] that evaluates
//! skip predicates, logs the task lifecycle and hands failures back
//! unchanged. Anything implementing [`Step`] can be chained into a stage.

mod context;
mod runner;
mod skip;

pub use context::TaskContext;
pub use runner::TaskRunner;
pub use skip::{skip_unless, skip_when, SkipDecision, SkipPredicate};

use crate::errors::BuildError;
use async_trait::async_trait;
use std::fmt::Debug;

/// A unit that maps a value of type `T` to a new one, or fails.
///
/// Both tasks and stages are steps, which is what lets stages nest.
#[async_trait]
pub trait Step<T>: Send + Sync + Debug {
    /// Returns the name of the step.
    fn name(&self) -> &str;

    /// Runs the step.
    async fn run(&self, input: T) -> Result<T, BuildError>;
}
