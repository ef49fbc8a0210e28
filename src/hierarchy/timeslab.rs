//! A contiguous time interval owning the element groups iterated on it.

use num_traits::Float;

use crate::hierarchy::ElementGroup;

/// Time interval `[t0, t1]` with its element groups.
///
/// Created and destroyed by the (external) time adaptivity driver; mutated
/// only through the controller's update/stabilize steps during iteration.
#[derive(Debug, Clone)]
pub struct TimeSlab<T> {
    t0: T,
    t1: T,
    groups: Vec<ElementGroup<T>>,
}

impl<T: Float> TimeSlab<T> {
    pub fn new(t0: T, t1: T) -> Self {
        Self { t0, t1, groups: Vec::new() }
    }

    pub fn from_groups(t0: T, t1: T, groups: Vec<ElementGroup<T>>) -> Self {
        Self { t0, t1, groups }
    }

    pub fn push(&mut self, group: ElementGroup<T>) {
        self.groups.push(group);
    }

    pub fn starttime(&self) -> T {
        self.t0
    }

    pub fn endtime(&self) -> T {
        self.t1
    }

    pub fn groups(&self) -> &[ElementGroup<T>] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [ElementGroup<T>] {
        &mut self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Largest component id across all groups, if any.
    pub fn max_component(&self) -> Option<usize> {
        self.groups.iter().filter_map(|g| g.max_component()).max()
    }
}
