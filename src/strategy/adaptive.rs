//! Adaptively damped regime: sequential updates with a damping factor
//! retuned from the residual history every pass.
//!
//! Terminal regime of the escalation chain: it never proposes a further
//! switch and fails only by exhausting the iteration budget.

use num_traits::Float;

use crate::config::IterConfig;
use crate::hierarchy::Level;
use crate::strategy::{Mode, StrategyKind, UpdatePolicy};
use crate::utils::Residuals;

pub(crate) fn update<T: Float>(theta: T) -> UpdatePolicy<T> {
    UpdatePolicy { mode: Mode::Sequential, theta }
}

/// Halve the damping while the residual grows, relax it back toward 1 while
/// contraction is comfortable.
pub(crate) fn stabilize<T: Float + From<f64>>(
    theta: &mut T,
    r: &Residuals<T>,
    cfg: &IterConfig<T>,
) {
    let Some(rho) = r.rate() else { return };
    let half: T = (0.5).into();
    let grow: T = (1.5).into();
    if rho >= T::one() {
        *theta = (*theta * half).max(cfg.theta_min);
    } else if rho < cfg.maxconv {
        *theta = (*theta * grow).min(T::one());
    }
}

pub(crate) fn diverged<T: Float>(
    _level: Level,
    _r: &mut Residuals<T>,
    _cfg: &IterConfig<T>,
) -> Option<StrategyKind> {
    None
}
