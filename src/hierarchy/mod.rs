//! Hierarchical domain decomposition: time slab / element group / element.

pub mod element;
pub mod group;
pub mod timeslab;

pub use element::Element;
pub use group::ElementGroup;
pub use timeslab::TimeSlab;

use std::fmt;

/// Hierarchy level, passed to the strategy hooks and used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    TimeSlab,
    ElementGroup,
    Element,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::TimeSlab => write!(f, "time slab"),
            Level::ElementGroup => write!(f, "element group"),
            Level::Element => write!(f, "element"),
        }
    }
}
