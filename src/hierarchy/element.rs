//! The atomic unit of the hierarchy: one discretized state component on a
//! time interval.

use num_traits::Float;

/// Discretized value of one state component over a slab interval.
///
/// The element is mutated in place by the controller's update and stabilize
/// steps; `reset` restores the value captured by the last `init` (or by
/// construction).
#[derive(Debug, Clone)]
pub struct Element<T> {
    component: usize,
    t0: T,
    t1: T,
    value: T,
    initial: T,
}

impl<T: Float> Element<T> {
    /// New element for `component` on `[t0, t1]` with initial guess `v0`.
    pub fn new(component: usize, t0: T, t1: T, v0: T) -> Self {
        Self { component, t0, t1, value: v0, initial: v0 }
    }

    pub fn component(&self) -> usize {
        self.component
    }

    pub fn starttime(&self) -> T {
        self.t0
    }

    /// Right endpoint of the interval; the fixed point map is evaluated here.
    pub fn endtime(&self) -> T {
        self.t1
    }

    pub fn value(&self) -> T {
        self.value
    }

    pub fn set_value(&mut self, v: T) {
        self.value = v;
    }

    pub fn initial(&self) -> T {
        self.initial
    }

    /// Seed both the working value and the reset target.
    pub fn init(&mut self, v0: T) {
        self.value = v0;
        self.initial = v0;
    }

    /// Restore the pre-iteration initial value. Idempotent.
    pub fn reset(&mut self) {
        self.value = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_is_idempotent() {
        let mut e = Element::new(0, 0.0, 1.0, 3.5);
        e.set_value(7.0);
        e.reset();
        let once = e.value();
        e.reset();
        assert_eq!(once, e.value());
        assert_eq!(e.value(), 3.5);
    }

    #[test]
    fn init_moves_the_reset_target() {
        let mut e = Element::new(2, 0.0, 0.5, 0.0);
        e.init(1.25);
        e.set_value(9.0);
        e.reset();
        assert_eq!(e.value(), 1.25);
    }
}
