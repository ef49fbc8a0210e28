//! Non-stiff regime: undamped, independent (Gauss-Jacobi) updates.

use num_traits::Float;

use crate::config::IterConfig;
use crate::hierarchy::Level;
use crate::strategy::{Divergence, Mode, StrategyKind, UpdatePolicy, classify};
use crate::utils::Residuals;

/// Most sensitive regime: switch after few slow iterations.
const SLOW_LIMIT: usize = 3;

pub(crate) fn update<T: Float>() -> UpdatePolicy<T> {
    UpdatePolicy { mode: Mode::Independent, theta: T::one() }
}

pub(crate) fn diverged<T: Float>(
    level: Level,
    r: &mut Residuals<T>,
    cfg: &IterConfig<T>,
) -> Option<StrategyKind> {
    match classify(r, cfg, SLOW_LIMIT) {
        Divergence::No => None,
        Divergence::Hard | Divergence::Stagnant => {
            log::trace!("non-stiff iteration diverging at {level} level, proposing damped");
            Some(StrategyKind::Damped)
        }
    }
}
