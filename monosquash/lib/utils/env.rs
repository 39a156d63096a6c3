//! Utility functions for working with environment variables.

use std::{
    env,
    path::{Path, PathBuf},
};

use crate::{SquashError, SquashResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// Environment variable for the unsquashfs binary path
pub const UNSQUASHFS_BIN_ENV_VAR: &str = "MONOSQUASH_UNSQUASHFS";

/// Environment variable for the mksquashfs binary path
pub const MKSQUASHFS_BIN_ENV_VAR: &str = "MONOSQUASH_MKSQUASHFS";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Resolves a binary from an environment variable, falling back to a `PATH` lookup of the
/// default binary name.
///
/// A path given through the environment variable must exist; it is not searched for in `PATH`.
pub fn resolve_bin_path(env_var: &str, default_bin: impl AsRef<Path>) -> SquashResult<PathBuf> {
    if let Ok(path) = env::var(env_var) {
        let path = PathBuf::from(path);
        if !path.exists() {
            return Err(SquashError::BinaryNotFound(
                path.display().to_string(),
                format!("environment variable {}", env_var),
            ));
        }

        tracing::debug!("resolved binary from {}: {}", env_var, path.display());
        return Ok(path);
    }

    let default_bin = default_bin.as_ref();
    which::which(default_bin).map_err(|e| {
        SquashError::BinaryNotFound(default_bin.display().to_string(), e.to_string())
    })
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
