//! Command implementations for jobscan CLI

mod analyze;
mod settings;

pub use analyze::*;
pub use settings::*;
