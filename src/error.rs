use thiserror::Error;

/// Failures raised before any solving work starts. Infeasible and unbounded
/// outcomes are statuses on the result types, not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
