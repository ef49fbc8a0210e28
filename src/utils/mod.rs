pub mod convergence;
pub use convergence::{IterStats, Residuals};
