use thiserror::Error;

// Unified error type for fixate.
//
// Numerical non-convergence is not an error: `iterate_*` reports it through
// its boolean return value. Errors are reserved for programming mistakes
// caught at construction time.

#[derive(Error, Debug)]
pub enum FixError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
