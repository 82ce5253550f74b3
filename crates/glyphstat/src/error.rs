use thiserror::Error;

/// Failure of a metric that needs non-empty input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetricError {
    #[error("corpus has no lines")]
    EmptyCorpus,
    #[error("{metric} of an empty series is undefined")]
    EmptySeries { metric: &'static str },
    #[error("{metric} needs at least {needed} values, got {got}")]
    InsufficientData {
        metric: &'static str,
        needed: usize,
        got: usize,
    },
}
