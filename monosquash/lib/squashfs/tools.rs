use std::{
    path::{Path, PathBuf},
    process::Output,
};

use async_trait::async_trait;
use tokio::process::Command;

use crate::{
    config::{DEFAULT_MKSQUASHFS_BIN, DEFAULT_UNSQUASHFS_BIN},
    utils::{self, MKSQUASHFS_BIN_ENV_VAR, UNSQUASHFS_BIN_ENV_VAR},
    SquashError, SquashResult,
};

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// The external tools an image is extracted, listed and repacked with.
///
/// Every call is a single invocation, nothing is retried.
#[async_trait]
pub trait SquashfsTools: Send + Sync {
    /// Extracts the image into `dest`, which must not exist yet.
    async fn extract(&self, image: &Path, dest: &Path) -> SquashResult<()>;

    /// Returns the long listing of the image, in the format parsed by
    /// [`ListingParser`](super::ListingParser).
    async fn list(&self, image: &Path) -> SquashResult<String>;

    /// Packs the tree at `source_dir` into a new image at `output`, applying the pseudofile
    /// manifest at `pseudo_file`.
    async fn repack(&self, source_dir: &Path, output: &Path, pseudo_file: &Path)
        -> SquashResult<()>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The squashfs-tools binaries, `unsquashfs` and `mksquashfs`.
#[derive(Debug, Clone)]
pub struct SquashfsToolchain {
    /// Path to the `unsquashfs` binary.
    unsquashfs: PathBuf,

    /// Path to the `mksquashfs` binary.
    mksquashfs: PathBuf,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SquashfsToolchain {
    /// Creates a toolchain from explicit binary paths.
    pub fn new(unsquashfs: impl Into<PathBuf>, mksquashfs: impl Into<PathBuf>) -> Self {
        Self {
            unsquashfs: unsquashfs.into(),
            mksquashfs: mksquashfs.into(),
        }
    }

    /// Resolves both binaries from their environment variables or from `PATH`.
    pub fn resolve() -> SquashResult<Self> {
        let unsquashfs = utils::resolve_bin_path(UNSQUASHFS_BIN_ENV_VAR, DEFAULT_UNSQUASHFS_BIN)?;
        let mksquashfs = utils::resolve_bin_path(MKSQUASHFS_BIN_ENV_VAR, DEFAULT_MKSQUASHFS_BIN)?;
        Ok(Self::new(unsquashfs, mksquashfs))
    }

    /// Returns the path to the `unsquashfs` binary.
    pub fn unsquashfs(&self) -> &Path {
        &self.unsquashfs
    }

    /// Returns the path to the `mksquashfs` binary.
    pub fn mksquashfs(&self) -> &Path {
        &self.mksquashfs
    }

    async fn run(command: &mut Command) -> SquashResult<Output> {
        tracing::debug!("running {:?}", command.as_std());
        let output = command.output().await?;

        if !output.status.success() {
            tracing::error!(
                "{:?} exited with {}: {}",
                command.as_std().get_program(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(output)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

#[async_trait]
impl SquashfsTools for SquashfsToolchain {
    async fn extract(&self, image: &Path, dest: &Path) -> SquashResult<()> {
        let output = Self::run(
            Command::new(&self.unsquashfs)
                .arg("-d")
                .arg(dest)
                .arg(image),
        )
        .await?;

        if !output.status.success() {
            return Err(SquashError::ExtractFailed {
                image: image.to_path_buf(),
                status: output.status,
            });
        }

        Ok(())
    }

    async fn list(&self, image: &Path) -> SquashResult<String> {
        let output = Self::run(Command::new(&self.unsquashfs).arg("-lln").arg(image)).await?;

        if !output.status.success() {
            return Err(SquashError::ListFailed {
                image: image.to_path_buf(),
                status: output.status,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn repack(
        &self,
        source_dir: &Path,
        output: &Path,
        pseudo_file: &Path,
    ) -> SquashResult<()> {
        let result = Self::run(
            Command::new(&self.mksquashfs)
                .arg(source_dir)
                .arg(output)
                .arg("-noappend")
                .arg("-pf")
                .arg(pseudo_file),
        )
        .await?;

        if !result.status.success() {
            return Err(SquashError::RepackFailed {
                output: output.to_path_buf(),
                status: result.status,
            });
        }

        Ok(())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::os::unix::fs::PermissionsExt;

    use tempfile::TempDir;

    use super::*;

    #[test_log::test(tokio::test)]
    async fn test_toolchain_list_captures_stdout() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let script = helper::write_script(&temp, "fake-unsquashfs", "echo \"$1 $2\"")?;
        let tools = SquashfsToolchain::new(&script, &script);

        let listing = tools.list(Path::new("image.sqfs")).await?;
        assert_eq!(listing, "-lln image.sqfs\n");
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_toolchain_reports_failures() -> anyhow::Result<()> {
        let temp = TempDir::new()?;
        let script = helper::write_script(&temp, "failing", "echo oops >&2; exit 3")?;
        let tools = SquashfsToolchain::new(&script, &script);

        let result = tools.extract(Path::new("a.sqfs"), &temp.path().join("a")).await;
        assert!(matches!(result, Err(SquashError::ExtractFailed { .. })));

        let result = tools.list(Path::new("a.sqfs")).await;
        assert!(matches!(result, Err(SquashError::ListFailed { .. })));

        let result = tools
            .repack(temp.path(), &temp.path().join("out.sqfs"), Path::new("p"))
            .await;
        match result {
            Err(SquashError::RepackFailed { output, status }) => {
                assert_eq!(output, temp.path().join("out.sqfs"));
                assert_eq!(status.code(), Some(3));
            }
            other => panic!("unexpected result: {:?}", other),
        }
        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_toolchain_missing_binary_is_io_error() {
        let tools = SquashfsToolchain::new("/nonexistent/unsquashfs", "/nonexistent/mksquashfs");
        let result = tools.list(Path::new("a.sqfs")).await;
        assert!(matches!(result, Err(SquashError::Io(_))));
    }

    mod helper {
        use super::*;

        pub(super) fn write_script(
            temp: &TempDir,
            name: &str,
            body: &str,
        ) -> anyhow::Result<PathBuf> {
            let path = temp.path().join(name);
            std::fs::write(&path, format!("#!/bin/sh\n{}\n", body))?;
            std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
            Ok(path)
        }
    }
}
