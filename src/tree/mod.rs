pub mod builder;

pub use builder::{BuildOptions, build};
