pub mod traits;
pub use traits::{Rhs, Solution};
