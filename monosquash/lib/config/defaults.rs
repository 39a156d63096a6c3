//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The directory prefix the listing tool puts in front of every path it prints.
pub const DEFAULT_EXTRACTION_ROOT: &str = "squashfs-root";

/// The default name of the binary used to extract and list images.
pub const DEFAULT_UNSQUASHFS_BIN: &str = "unsquashfs";

/// The default name of the binary used to repack trees into images.
pub const DEFAULT_MKSQUASHFS_BIN: &str = "mksquashfs";

/// The name of the scratch directory a fragment build stages its files in.
///
/// It is created next to the fragment's output path.
pub const FRAGMENT_SCRATCH_DIR: &str = ".monosquash-fragment";

/// The extension of the pseudofile manifest written for a fragment build.
pub const PSEUDO_FILE_SUFFIX: &str = "pseudo";
