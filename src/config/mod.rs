pub mod options;
pub use options::{IterConfig, SwitchPolicy};
