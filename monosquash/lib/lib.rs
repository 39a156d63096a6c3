//! `monosquash` inspects squashfs images and repacks selected parts of them into new images.
//!
//! # Overview
//!
//! monosquash drives the external squashfs tools and recovers the metadata that a plain copy of
//! an extracted tree would lose. It handles:
//! - Extracting an image into a staging tree
//! - Parsing the long listing of an image into typed entries
//! - Decoding permission bits (including setuid, setgid and sticky bits), ownership and device
//!   numbers
//! - Writing pseudofile manifests that restore that metadata on repack
//! - Building "fragment" images from a subset of an image's paths
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use monosquash::squashfs::SquashfsImage;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let image = SquashfsImage::open("rootfs.squashfs").await?;
//!
//!     for path in image.list_paths().await? {
//!         println!("{}", path);
//!     }
//!
//!     image
//!         .build_fragment(&["etc/hostname", "dev/sda"], "fragment.squashfs")
//!         .await?;
//!
//!     image.close().await?;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Defaults and per-image configuration
//! - [`squashfs`] - Listing parser, decoders, pseudofile serializer and the image handle
//! - [`utils`] - Path and environment helpers

#![warn(missing_docs)]

mod error;

//--------------------------------------------------------------------------------------------------
// Exports
//--------------------------------------------------------------------------------------------------

pub mod cli;
pub mod config;
pub mod squashfs;
pub mod utils;

pub use error::*;
