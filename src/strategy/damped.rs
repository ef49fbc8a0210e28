//! Damped regime: fixed damping factor, sequential (Gauss-Seidel) updates.
//!
//! The damping factor is chosen once at entry from the observed divergence
//! rate and held fixed; retuning is the adaptively damped regime's job.

use num_traits::Float;

use crate::config::IterConfig;
use crate::hierarchy::Level;
use crate::strategy::{Divergence, Mode, StrategyKind, UpdatePolicy, classify};
use crate::utils::Residuals;

/// More patient than non-stiff: the fixed damping may need a few passes.
const SLOW_LIMIT: usize = 5;

pub(crate) fn update<T: Float>(theta: T) -> UpdatePolicy<T> {
    UpdatePolicy { mode: Mode::Sequential, theta }
}

pub(crate) fn diverged<T: Float>(
    level: Level,
    r: &mut Residuals<T>,
    cfg: &IterConfig<T>,
) -> Option<StrategyKind> {
    match classify(r, cfg, SLOW_LIMIT) {
        Divergence::No => None,
        Divergence::Hard | Divergence::Stagnant => {
            log::trace!("damped iteration diverging at {level} level, proposing adaptive damping");
            Some(StrategyKind::AdaptiveDamped)
        }
    }
}
