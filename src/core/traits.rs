//! Collaborator traits at the boundary of the iteration engine.

/// Right-hand side of the discretized fixed point map.
///
/// `eval(u, t, i)` returns the fixed point target for component `i` at time
/// `t`, given the current component values `u` (indexed by component id).
/// The evaluator is assumed pure; it may be called many times per iteration
/// and no caching is performed by the controller. Components not owned by
/// the node being iterated hold their last synced values (initially zero).
/// `u` covers the iterated node's components and, when set, the
/// [`IterConfig::components`](crate::config::IterConfig) extent; an evaluator
/// coupling to components outside the node must configure that extent.
pub trait Rhs<T>: Sync {
    /// Evaluate the fixed point target for component `i` at time `t`.
    fn eval(&self, u: &[T], t: T, i: usize) -> T;
}

impl<T, F> Rhs<T> for F
where
    F: Fn(&[T], T, usize) -> T + Sync,
{
    fn eval(&self, u: &[T], t: T, i: usize) -> T {
        self(u, t, i)
    }
}

/// End values of the previous time slab, used to seed a new slab.
pub trait Solution<T> {
    /// End value of component `i` at the previous slab boundary.
    fn value(&self, i: usize) -> T;
}

impl<T: Copy + num_traits::Zero> Solution<T> for [T] {
    fn value(&self, i: usize) -> T {
        self.get(i).copied().unwrap_or_else(T::zero)
    }
}

impl<T: Copy + num_traits::Zero> Solution<T> for Vec<T> {
    fn value(&self, i: usize) -> T {
        self.as_slice().value(i)
    }
}
