// This module re-exports important pieces for convenience,
// so we can "use crate::config::*" easily.
pub mod advice;
pub mod logging;
pub mod types;

pub use advice::*;
pub use logging::*;
pub use types::*;
