//! Iteration limits, tolerances and damping parameters.
//!
//! All parameters are supplied once at controller construction and are
//! immutable afterwards. Invalid values are rejected by `validate` before
//! any iteration starts.

use num_traits::Float;

use crate::error::FixError;
use crate::strategy::StrategyKind;

/// What happens to the iteration counter at the level that detected
/// divergence when the active strategy is switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchPolicy {
    /// Keep accumulating against the same `maxiter` budget (strict bound).
    Accumulate,
    /// Restart the counter for the new regime. Still bounded overall: the
    /// escalation chain is strict, so at most one restart per variant.
    Restart,
}

/// Iteration limits & tolerances.
#[derive(Debug, Clone)]
pub struct IterConfig<T> {
    /// Maximum number of outer iterations per hierarchy level.
    pub maxiter: usize,
    /// Divergence threshold on the rate estimate r_curr / r_prev.
    pub maxdiv: T,
    /// Largest contraction rate still counted as progress.
    pub maxconv: T,
    /// Absolute residual tolerance for convergence.
    pub tol: T,
    /// Local damped sweeps per element update.
    pub lits: usize,
    /// Number of state components the RHS may read. The controller sizes its
    /// component workspace to cover this extent in addition to the iterated
    /// node's own components; 0 means the node alone determines the extent.
    pub components: usize,
    /// Initial damping factor for damped regimes entered without history.
    pub theta0: T,
    /// Lower clamp on the damping factor.
    pub theta_min: T,
    /// Strategy restored at every public `iterate_*` entry.
    pub initial: StrategyKind,
    /// Counter policy on a divergence-triggered strategy switch.
    pub switch_policy: SwitchPolicy,
}

impl<T: Float + From<f64>> Default for IterConfig<T> {
    fn default() -> Self {
        Self {
            maxiter: 100,
            maxdiv: (1e3).into(),
            maxconv: (0.95).into(),
            tol: (1e-8).into(),
            lits: 3,
            components: 0,
            theta0: (0.5).into(),
            theta_min: (1e-3).into(),
            initial: StrategyKind::NonStiff,
            switch_policy: SwitchPolicy::Accumulate,
        }
    }
}

impl<T: Float + From<f64>> IterConfig<T> {
    pub fn with_tol(mut self, tol: T) -> Self {
        self.tol = tol;
        self
    }
    pub fn with_maxiter(mut self, maxiter: usize) -> Self {
        self.maxiter = maxiter;
        self
    }
    pub fn with_maxdiv(mut self, maxdiv: T) -> Self {
        self.maxdiv = maxdiv;
        self
    }
    pub fn with_maxconv(mut self, maxconv: T) -> Self {
        self.maxconv = maxconv;
        self
    }
    pub fn with_lits(mut self, lits: usize) -> Self {
        self.lits = lits;
        self
    }
    pub fn with_components(mut self, components: usize) -> Self {
        self.components = components;
        self
    }
    pub fn with_initial(mut self, initial: StrategyKind) -> Self {
        self.initial = initial;
        self
    }
    pub fn with_switch_policy(mut self, policy: SwitchPolicy) -> Self {
        self.switch_policy = policy;
        self
    }

    /// Precondition check, run once at controller construction.
    pub fn validate(&self) -> Result<(), FixError> {
        if self.maxiter == 0 {
            return Err(FixError::InvalidConfig("maxiter must be at least 1"));
        }
        if !(self.tol > T::zero()) || !self.tol.is_finite() {
            return Err(FixError::InvalidConfig("tol must be positive and finite"));
        }
        if !(self.maxdiv > T::one()) {
            return Err(FixError::InvalidConfig("maxdiv must exceed 1"));
        }
        if !(self.maxconv > T::zero() && self.maxconv < T::one()) {
            return Err(FixError::InvalidConfig("maxconv must lie in (0, 1)"));
        }
        if self.lits == 0 {
            return Err(FixError::InvalidConfig("lits must be at least 1"));
        }
        if !(self.theta_min > T::zero() && self.theta_min <= self.theta0 && self.theta0 <= T::one()) {
            return Err(FixError::InvalidConfig(
                "damping bounds must satisfy 0 < theta_min <= theta0 <= 1",
            ));
        }
        Ok(())
    }
}
