use std::{
    env,
    path::{Path, PathBuf},
};

use getset::Getters;
use typed_builder::TypedBuilder;

use crate::{SquashError, SquashResult};

use super::DEFAULT_EXTRACTION_ROOT;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Configuration for opening a squashfs image.
///
/// ## Examples
///
/// ```
/// use monosquash::config::ImageConfig;
///
/// let config = ImageConfig::builder().staging_root("/tmp/staging").build();
/// assert_eq!(config.get_extraction_root(), "squashfs-root");
/// ```
#[derive(Debug, Clone, TypedBuilder, Getters)]
#[getset(get = "pub with_prefix")]
pub struct ImageConfig {
    /// The directory under which the staging tree of an image is created.
    ///
    /// Defaults to the current working directory.
    #[builder(default, setter(into, strip_option))]
    staging_root: Option<PathBuf>,

    /// The prefix the listing tool puts in front of every path.
    #[builder(default = DEFAULT_EXTRACTION_ROOT.to_string(), setter(into))]
    extraction_root: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ImageConfig {
    /// Returns the directory an image is extracted into.
    ///
    /// The directory is named after the image file, without its extension, and lives under the
    /// staging root.
    pub fn staging_dir_for(&self, image_path: &Path) -> SquashResult<PathBuf> {
        let stem = image_path
            .file_stem()
            .filter(|stem| !stem.is_empty())
            .ok_or_else(|| SquashError::InvalidImagePath(image_path.display().to_string()))?;

        let root = match &self.staging_root {
            Some(root) => root.clone(),
            None => env::current_dir()?,
        };

        Ok(root.join(stem))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for ImageConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
