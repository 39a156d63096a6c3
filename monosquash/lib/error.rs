use std::{
    error::Error,
    fmt::{self, Display},
    path::PathBuf,
    process::ExitStatus,
};
use thiserror::Error;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The result of a monosquash-related operation.
pub type SquashResult<T> = Result<T, SquashError>;

/// An error that occurred while inspecting or repacking a squashfs image.
#[derive(pretty_error_debug::Debug, Error)]
pub enum SquashError {
    /// An I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// An error that can represent any error.
    #[error(transparent)]
    Custom(#[from] AnyError),

    /// The external tool failed to extract the image.
    #[error("failed to extract image {image}: {status}")]
    ExtractFailed {
        /// The image that was being extracted.
        image: PathBuf,

        /// The exit status of the extraction tool.
        status: ExitStatus,
    },

    /// The external tool failed to produce a listing of the image.
    #[error("failed to list image {image}: {status}")]
    ListFailed {
        /// The image that was being listed.
        image: PathBuf,

        /// The exit status of the listing tool.
        status: ExitStatus,
    },

    /// The external tool failed to repack a tree into a new image.
    #[error("failed to repack image {output}: {status}")]
    RepackFailed {
        /// The image that was being written.
        output: PathBuf,

        /// The exit status of the repack tool.
        status: ExitStatus,
    },

    /// An error that occurred when resolving a binary
    #[error("binary not found at: {0}\nSource: {1}")]
    BinaryNotFound(String, String),

    /// The image handle has already been closed.
    #[error("image already closed: {0}")]
    ImageClosed(PathBuf),

    /// The image path cannot be used to derive a staging directory.
    #[error("invalid image path: {0}")]
    InvalidImagePath(String),

    /// An error that occurred when validating paths
    #[error("path validation error: {0}")]
    PathValidation(String),

    /// A permission string did not have the expected shape.
    #[error("invalid permission string: {0}")]
    InvalidPermissions(String),

    /// An ownership string did not have the expected shape.
    #[error("invalid ownership string: {0}")]
    InvalidOwnership(String),

    /// The staging directory of an image already exists.
    #[error("staging directory already exists: {0}")]
    StagingDirExists(PathBuf),

    /// An entry carries device numbers without being a device, or is a device without them.
    #[error("device numbers of entry {path:?} do not match its kind {kind}")]
    DeviceMismatch {
        /// The path of the entry.
        path: String,

        /// The listing character of the entry's kind.
        kind: char,
    },
}

/// An error that can represent any error.
#[derive(Debug)]
pub struct AnyError {
    error: anyhow::Error,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SquashError {
    /// Wraps any error as a [`SquashError::Custom`].
    pub fn custom(error: impl Into<anyhow::Error>) -> SquashError {
        SquashError::Custom(AnyError {
            error: error.into(),
        })
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for AnyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl Error for AnyError {}
