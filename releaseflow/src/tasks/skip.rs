//! Skip decisions and predicates.

/// Outcome of a skip predicate that wants the task bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDecision<O> {
    /// Why the task is skipped.
    pub message: String,
    /// Value the task yields instead of running.
    pub default_result: O,
}

impl<O> SkipDecision<O> {
    /// Creates a new skip decision.
    #[must_use]
    pub fn new(message: impl Into<String>, default_result: O) -> Self {
        Self {
            message: message.into(),
            default_result,
        }
    }
}

/// A pure function deciding whether a task is bypassed for `input`.
///
/// `None` means "no opinion"; the first `Some` in a task's predicate list
/// wins.
pub type SkipPredicate<I, O> = Box<dyn Fn(&I) -> Option<SkipDecision<O>> + Send + Sync>;

/// Skips the task when `condition` holds, passing the input through.
pub fn skip_when<T, F>(message: impl Into<String>, condition: F) -> SkipPredicate<T, T>
where
    T: Clone + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    let message = message.into();
    Box::new(move |input: &T| {
        condition(input).then(|| SkipDecision::new(message.clone(), input.clone()))
    })
}

/// Skips the task unless `condition` holds, passing the input through.
pub fn skip_unless<T, F>(message: impl Into<String>, condition: F) -> SkipPredicate<T, T>
where
    T: Clone + 'static,
    F: Fn(&T) -> bool + Send + Sync + 'static,
{
    skip_when(message, move |input: &T| !condition(input))
}
