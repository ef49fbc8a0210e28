//! Ordered collection of elements sharing a time interval.

use num_traits::Float;

use crate::hierarchy::Element;

/// Elements iterated together under one group-level loop.
///
/// Iteration order is the insertion order. Under a sequential (Gauss-Seidel)
/// strategy that order is significant; under an independent (Gauss-Jacobi)
/// strategy it is not.
#[derive(Debug, Clone, Default)]
pub struct ElementGroup<T> {
    elements: Vec<Element<T>>,
}

impl<T: Float> ElementGroup<T> {
    pub fn new() -> Self {
        Self { elements: Vec::new() }
    }

    pub fn from_elements(elements: Vec<Element<T>>) -> Self {
        Self { elements }
    }

    pub fn push(&mut self, element: Element<T>) {
        self.elements.push(element);
    }

    pub fn elements(&self) -> &[Element<T>] {
        &self.elements
    }

    pub fn elements_mut(&mut self) -> &mut [Element<T>] {
        &mut self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Largest component id in the group, if any.
    pub fn max_component(&self) -> Option<usize> {
        self.elements.iter().map(|e| e.component()).max()
    }
}
