//! fixate: damped fixed point iteration on hierarchical time slabs
//!
//! This crate provides the nonlinear-solve core of a multi-adaptive ODE
//! integrator: a bounded fixed point iteration over a three-level hierarchy
//! (time slab / element group / element) that switches between iteration
//! strategies (non-stiff, damped, adaptively damped) in response to observed
//! convergence behavior.

pub mod config;
pub mod controller;
pub mod core;
pub mod error;
pub mod hierarchy;
pub mod strategy;
pub mod utils;

// Re-exports for convenience
pub use config::*;
pub use controller::*;
pub use core::*;
pub use error::*;
pub use hierarchy::*;
pub use strategy::*;
pub use utils::*;

// Re-export IterStats at the crate root for convenience
pub use utils::convergence::IterStats;
