//! Residual history & iteration statistics.

use num_traits::Float;

/// Residual history of one hierarchy level's active iteration.
///
/// Lives on the call stack of that level's loop and is discarded when the
/// loop returns. The rate estimate is defined only once both norms are
/// finite; before that, divergence testing must treat the level as not
/// diverged.
#[derive(Clone, Debug)]
pub struct Residuals<T> {
    pub r_prev: T,
    pub r_curr: T,
    /// Outer iterations completed at this level.
    pub n: usize,
    slow: usize,
}

impl<T: Float> Residuals<T> {
    pub fn new() -> Self {
        Self {
            r_prev: T::infinity(),
            r_curr: T::infinity(),
            n: 0,
            slow: 0,
        }
    }

    /// Shift the history and record a new residual norm.
    pub fn push(&mut self, r: T) {
        self.r_prev = self.r_curr;
        self.r_curr = r;
        self.n += 1;
    }

    /// Convergence-rate estimate r_curr / r_prev, if defined.
    pub fn rate(&self) -> Option<T> {
        if self.r_prev.is_finite() && self.r_prev > T::zero() && self.r_curr.is_finite() {
            Some(self.r_curr / self.r_prev)
        } else {
            None
        }
    }

    /// Count one more consecutive iteration with unacceptable contraction.
    pub fn note_slow(&mut self) -> usize {
        self.slow += 1;
        self.slow
    }

    pub fn clear_slow(&mut self) {
        self.slow = 0;
    }

    pub fn slow(&self) -> usize {
        self.slow
    }
}

impl<T: Float> Default for Residuals<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-call iteration statistics, reset at every public `iterate_*` entry.
#[derive(Clone, Debug)]
pub struct IterStats<T> {
    pub slab_passes: usize,
    pub group_passes: usize,
    pub element_passes: usize,
    /// Number of strategy switches performed during the call.
    pub state_changes: usize,
    /// Residual at the entry level after the last pass.
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Float> IterStats<T> {
    pub fn new() -> Self {
        Self {
            slab_passes: 0,
            group_passes: 0,
            element_passes: 0,
            state_changes: 0,
            final_residual: T::infinity(),
            converged: false,
        }
    }
}

impl<T: Float> Default for IterStats<T> {
    fn default() -> Self {
        Self::new()
    }
}
