pub mod fixed_point;
pub use fixed_point::FixedPoint;
