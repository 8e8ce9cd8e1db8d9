//! Input/output helpers.
//!
//! - batch CSV read + scored CSV write (`batch`)
//! - single-prediction JSON export (`export`)

pub mod batch;
pub mod export;

pub use batch::*;
pub use export::*;
