//! Repacking a subset of an image into a new, standalone image.
//!
//! A fragment build:
//! 1. Selects the entries whose path was requested
//! 2. Materializes them from the image's staging tree into a scratch tree next to the output
//! 3. Writes the pseudofile manifest for the selected entries
//! 4. Hands the scratch tree and manifest to the repack tool
//! 5. Removes the scratch tree and manifest again
//!
//! Only requested paths are copied. Parent directories of nested paths are created in the
//! scratch tree so the copy can happen, but they get no manifest line of their own unless they
//! were requested too.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::{
    config::{FRAGMENT_SCRATCH_DIR, PSEUDO_FILE_SUFFIX},
    SquashResult,
};

use super::{pseudofile, Entry, EntryKind, EntryStore, SquashfsTools};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Builds a fragment image at `output` from the entries of `store` whose path is in `paths`.
///
/// ## Arguments
///
/// * `store` - The entries of the source image
/// * `staging_dir` - Where the source image was extracted to
/// * `paths` - The paths to include in the fragment
/// * `output` - Where to write the fragment image
/// * `tools` - The tools used to repack the fragment
///
/// ## Errors
///
/// Returns an error if a requested path escapes the image root, if staging the files fails or
/// if the repack tool fails. The scratch tree and manifest are removed in every case.
///
/// The scratch tree lives at a fixed name in the output's parent directory, so concurrent
/// builds into the same directory must not overlap.
pub async fn build_fragment<S: AsRef<str>>(
    store: &EntryStore,
    staging_dir: &Path,
    paths: &[S],
    output: &Path,
    tools: &dyn SquashfsTools,
) -> SquashResult<PathBuf> {
    let selected = store.select(paths)?;
    let (scratch_dir, pseudo_file) = scratch_paths(output);

    tracing::info!(
        "building fragment {} from {} entries",
        output.display(),
        selected.len()
    );

    let result: SquashResult<()> = async {
        if fs::try_exists(&scratch_dir).await? {
            tracing::warn!("removing stale scratch tree {}", scratch_dir.display());
            fs::remove_dir_all(&scratch_dir).await?;
        }
        fs::create_dir_all(&scratch_dir).await?;

        for entry in &selected {
            stage_entry(entry, staging_dir, &scratch_dir).await?;
        }

        let mut manifest = pseudofile::serialize(selected.iter().copied());
        manifest.push('\n');
        fs::write(&pseudo_file, manifest).await?;

        tools.repack(&scratch_dir, output, &pseudo_file).await
    }
    .await;

    cleanup(&scratch_dir, &pseudo_file).await;

    result.map(|_| output.to_path_buf())
}

/// Returns the scratch tree and manifest paths used for a fragment written to `output`.
pub fn scratch_paths(output: &Path) -> (PathBuf, PathBuf) {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    (
        parent.join(FRAGMENT_SCRATCH_DIR),
        parent.join(format!("{}.{}", FRAGMENT_SCRATCH_DIR, PSEUDO_FILE_SUFFIX)),
    )
}

/// Recreates one entry of the staging tree in the scratch tree.
async fn stage_entry(entry: &Entry, staging_dir: &Path, scratch_dir: &Path) -> SquashResult<()> {
    let source = staging_dir.join(entry.get_path());
    let target = scratch_dir.join(entry.get_path());

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).await?;
    }

    match entry.get_kind() {
        EntryKind::Directory => {
            tracing::debug!("creating directory: {}", target.display());
            fs::create_dir_all(&target).await?;
        }
        EntryKind::File => {
            tracing::debug!("copying file: {} -> {}", source.display(), target.display());
            fs::copy(&source, &target).await?;
        }
        EntryKind::Symlink => {
            let link_target = fs::read_link(&source).await?;
            tracing::debug!(
                "creating symlink: {} -> {}",
                target.display(),
                link_target.display()
            );
            fs::symlink(&link_target, &target).await?;
        }
        EntryKind::CharDevice | EntryKind::BlockDevice => {
            // Device nodes are created by their manifest directive.
            tracing::debug!("leaving device {} to the manifest", entry.get_path());
        }
    }

    Ok(())
}

/// Removes the scratch tree and manifest, logging rather than failing.
async fn cleanup(scratch_dir: &Path, pseudo_file: &Path) {
    if let Err(e) = fs::remove_dir_all(scratch_dir).await {
        tracing::warn!(
            "failed to remove scratch tree {}: {}",
            scratch_dir.display(),
            e
        );
    }

    if let Err(e) = fs::remove_file(pseudo_file).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("failed to remove manifest {}: {}", pseudo_file.display(), e);
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
