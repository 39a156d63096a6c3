//! Defaults and per-image configuration.

mod defaults;
mod image;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use defaults::*;
pub use image::*;
