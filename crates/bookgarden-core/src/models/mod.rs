pub mod plant;
pub mod stats;

pub use plant::*;
pub use stats::*;
