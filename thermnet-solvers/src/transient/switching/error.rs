use std::error::Error as StdError;

use super::ConfigError;

/// Errors that prevent the switching solver from running.
///
/// Failing to converge is not an error: it is reported through
/// [`Status::Failed`](super::Status::Failed) along with the partial output.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("invalid time span [{start}, {end}]: bounds must be finite with start <= end")]
    Span { start: f64, end: f64 },

    #[error("evaluation times must be finite, non-decreasing, and inside the time span")]
    EvalTimes,

    #[error("initial state has {actual} components but the system has {expected}")]
    Dimension { expected: usize, actual: usize },

    #[error("system error: {0}")]
    System(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn system<E: StdError + Send + Sync + 'static>(err: E) -> Self {
        Self::System(Box::new(err))
    }
}
