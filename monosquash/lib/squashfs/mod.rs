//! Squashfs image inspection and repacking.
//!
//! The pieces fit together as follows:
//! - [`ListingParser`] turns the long listing of an image into [`Entry`] values
//! - [`EntryStore`] holds those entries in listing order and answers queries over them
//! - [`pseudofile`] serializes entries into a manifest for the repack tool
//! - [`SquashfsTools`] is the seam to the external extract, list and repack tools
//! - [`SquashfsImage`] ties it together behind a handle that serializes requests

mod entry;
mod image;
mod listing;
mod ownership;
mod permissions;
mod store;
mod tools;

pub mod fragment;
pub mod pseudofile;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub use entry::*;
pub use image::*;
pub use listing::*;
pub use ownership::*;
pub use permissions::*;
pub use store::*;
pub use tools::*;
