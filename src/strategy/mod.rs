//! Iteration strategies: the closed set of numerical regimes.
//!
//! The original state-machine design (context + polymorphic state) is
//! expressed as a tagged enum with an explicit dispatch table of the
//! per-level hooks: `start`, `update`, `stabilize`, `converged`, `diverged`.
//! One variant is active per controller at a time, shared by all three
//! hierarchy levels; a switch at any depth is global for the remainder of
//! the call.
//!
//! Variants differ only in damping schedule, divergence sensitivity, and
//! update ordering. Escalation chain: non-stiff -> damped -> adaptively
//! damped.

pub mod adaptive;
pub mod damped;
pub mod nonstiff;

use num_traits::Float;

use crate::config::IterConfig;
use crate::hierarchy::Level;
use crate::utils::Residuals;

/// Update ordering policy within one group pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Gauss-Jacobi: elements read only previous-pass sibling values.
    Independent,
    /// Gauss-Seidel: elements observe already-updated siblings, in insertion
    /// order.
    Sequential,
}

/// Per-pass update parameters produced by the active strategy.
#[derive(Debug, Clone, Copy)]
pub struct UpdatePolicy<T> {
    pub mode: Mode,
    /// Damping factor: v <- theta * f(v) + (1 - theta) * v.
    pub theta: T,
}

/// Discriminant of the variant set, used for configuration and switching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    NonStiff,
    Damped,
    AdaptiveDamped,
}

/// The active iteration regime with its strategy-local damping state.
#[derive(Debug, Clone)]
pub enum Strategy<T> {
    NonStiff,
    Damped { theta: T },
    AdaptiveDamped { theta: T },
}

/// Verdict of the shared divergence test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Divergence {
    No,
    /// Rate exceeded `maxdiv`.
    Hard,
    /// Contraction bound violated for too many consecutive iterations.
    Stagnant,
}

/// Rate-based divergence classification shared by all variants; the variant
/// supplies its own tolerance for consecutive slow iterations.
///
/// Short-circuits to `No` while the rate estimate is undefined (fewer than
/// two finite residuals).
pub(crate) fn classify<T: Float>(
    r: &mut Residuals<T>,
    cfg: &IterConfig<T>,
    slow_limit: usize,
) -> Divergence {
    let Some(rho) = r.rate() else {
        return Divergence::No;
    };
    if rho > cfg.maxdiv {
        return Divergence::Hard;
    }
    if rho > cfg.maxconv {
        if r.note_slow() >= slow_limit {
            return Divergence::Stagnant;
        }
    } else {
        r.clear_slow();
    }
    Divergence::No
}

/// Damping factor for a regime entered after observed divergence.
///
/// The observed rate is a per-pass rate; with `lits` sweeps per element
/// update the per-sweep rate is its `lits`-th root. For a linear map with
/// slope -rho, theta = 1 / (1 + rho) annihilates the error of the damped
/// sweep, which is why this is the classical entry choice.
pub(crate) fn entry_theta<T: Float + From<f64>>(r: &Residuals<T>, cfg: &IterConfig<T>) -> T {
    let theta = match r.rate() {
        Some(rho) if rho > T::one() => {
            let lits: T = (cfg.lits as f64).into();
            let per_sweep = rho.powf(T::one() / lits);
            T::one() / (T::one() + per_sweep)
        }
        _ => cfg.theta0,
    };
    theta.max(cfg.theta_min).min(T::one())
}

impl<T: Float + From<f64>> Strategy<T> {
    /// Strategy restored at every public `iterate_*` entry.
    pub fn initial(kind: StrategyKind, cfg: &IterConfig<T>) -> Self {
        match kind {
            StrategyKind::NonStiff => Strategy::NonStiff,
            StrategyKind::Damped => Strategy::Damped { theta: cfg.theta0 },
            StrategyKind::AdaptiveDamped => Strategy::AdaptiveDamped { theta: cfg.theta0 },
        }
    }

    /// Strategy entered on a divergence-triggered switch; damping is derived
    /// from the residual history at the level that detected the divergence.
    pub fn enter(kind: StrategyKind, r: &Residuals<T>, cfg: &IterConfig<T>) -> Self {
        match kind {
            StrategyKind::NonStiff => Strategy::NonStiff,
            StrategyKind::Damped => Strategy::Damped { theta: entry_theta(r, cfg) },
            StrategyKind::AdaptiveDamped => Strategy::AdaptiveDamped { theta: entry_theta(r, cfg) },
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Strategy::NonStiff => StrategyKind::NonStiff,
            Strategy::Damped { .. } => StrategyKind::Damped,
            Strategy::AdaptiveDamped { .. } => StrategyKind::AdaptiveDamped,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::NonStiff => "non-stiff",
            Strategy::Damped { .. } => "damped",
            Strategy::AdaptiveDamped { .. } => "adaptively damped",
        }
    }

    /// Initialize the residual history for one level's loop.
    pub fn start(&self) -> Residuals<T> {
        Residuals::new()
    }

    /// Ordering and damping for the next update pass.
    pub fn update(&self) -> UpdatePolicy<T> {
        match self {
            Strategy::NonStiff => nonstiff::update(),
            Strategy::Damped { theta } => damped::update(*theta),
            Strategy::AdaptiveDamped { theta } => adaptive::update(*theta),
        }
    }

    /// Let the active regime adjust its damping from the residual history.
    pub fn stabilize(&mut self, r: &Residuals<T>, cfg: &IterConfig<T>) {
        match self {
            Strategy::NonStiff => {}
            Strategy::Damped { .. } => {}
            Strategy::AdaptiveDamped { theta } => adaptive::stabilize(theta, r, cfg),
        }
    }

    /// Convergence test, identical across variants: absolute residual below
    /// tolerance (the caller supplies the level-appropriate aggregate norm).
    pub fn converged(&self, _level: Level, r: &Residuals<T>, cfg: &IterConfig<T>) -> bool {
        r.n >= 1 && r.r_curr < cfg.tol
    }

    /// Divergence test; on a positive verdict returns the regime to switch
    /// to. Variants differ in sensitivity and escalation target.
    pub fn diverged(
        &self,
        level: Level,
        r: &mut Residuals<T>,
        cfg: &IterConfig<T>,
    ) -> Option<StrategyKind> {
        match self {
            Strategy::NonStiff => nonstiff::diverged(level, r, cfg),
            Strategy::Damped { .. } => damped::diverged(level, r, cfg),
            Strategy::AdaptiveDamped { .. } => adaptive::diverged(level, r, cfg),
        }
    }

    /// Whether the regime discards partial progress when entered on a switch.
    pub fn resets_on_entry(&self) -> bool {
        match self {
            Strategy::NonStiff => false,
            Strategy::Damped { .. } => true,
            Strategy::AdaptiveDamped { .. } => true,
        }
    }
}
