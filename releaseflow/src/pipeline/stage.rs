//! Sequential, fail-fast stage composition.

use crate::errors::BuildError;
use crate::tasks::Step;
use async_trait::async_trait;
use std::fmt;
use std::time::Instant;
use tracing::debug;

/// An ordered list of steps sharing one value type.
///
/// Running a stage threads the value through every step in order. The first
/// failure ends the stage; later steps never run and nothing is rolled back.
/// A stage is itself a [`Step`], so stages nest.
pub struct Stage<T> {
    name: String,
    steps: Vec<Box<dyn Step<T>>>,
}

impl<T: Send + 'static> Stage<T> {
    /// Creates an empty stage. An empty stage returns its input unchanged.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// Appends a step.
    #[must_use]
    pub fn step(mut self, step: impl Step<T> + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Appends an already boxed step.
    #[must_use]
    pub fn boxed_step(mut self, step: Box<dyn Step<T>>) -> Self {
        self.steps.push(step);
        self
    }

    /// Returns the stage name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of direct steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the stage has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Names of the direct steps, in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Runs every step in order, stopping at the first failure.
    pub async fn run(&self, input: T) -> Result<T, BuildError> {
        self.execute(input).await
    }

    async fn execute(&self, input: T) -> Result<T, BuildError> {
        let start = Instant::now();
        debug!(stage = %self.name, steps = self.steps.len(), "Stage started");

        let mut current = input;
        for step in &self.steps {
            current = match step.run(current).await {
                Ok(next) => next,
                Err(err) => {
                    debug!(stage = %self.name, step = %step.name(), error = %err, "Stage aborted");
                    return Err(err);
                }
            };
        }

        debug!(
            stage = %self.name,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Stage completed"
        );
        Ok(current)
    }
}

impl<T> fmt::Debug for Stage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .finish()
    }
}

#[async_trait]
impl<T: Send + 'static> Step<T> for Stage<T> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: T) -> Result<T, BuildError> {
        self.execute(input).await
    }
}
