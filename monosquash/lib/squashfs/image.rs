use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::{fs, sync::Mutex};

use crate::{config::ImageConfig, SquashError, SquashResult};

use super::{fragment, Entry, EntryStore, ListingParser, SquashfsToolchain, SquashfsTools};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// A handle to an opened squashfs image.
///
/// Opening an image extracts it into a staging tree and parses its listing into an
/// [`EntryStore`]. The handle is cheap to clone; all clones share the same image.
///
/// Requests against one image are served one at a time, in the order they were made. Distinct
/// images are independent of each other.
#[derive(Clone)]
pub struct SquashfsImage {
    /// The path of the image file.
    image_path: PathBuf,

    /// The directory the image was extracted into.
    staging_dir: PathBuf,

    /// The tools used to repack fragments.
    tools: Arc<dyn SquashfsTools>,

    /// The parsed entries, `None` once the image is closed.
    store: Arc<Mutex<Option<EntryStore>>>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl SquashfsImage {
    /// Opens an image with the default configuration and the squashfs-tools found on the
    /// system.
    pub async fn open(image_path: impl AsRef<Path>) -> SquashResult<Self> {
        let tools = SquashfsToolchain::resolve()?;
        Self::open_with(image_path, ImageConfig::default(), Arc::new(tools)).await
    }

    /// Opens an image with the given configuration and tools.
    ///
    /// ## Errors
    ///
    /// Returns [`SquashError::StagingDirExists`] if the staging directory is already present,
    /// so nothing already on disk is extracted over or removed. Returns an error if the
    /// staging directory cannot be derived from the image path, if the image cannot be
    /// extracted or if it cannot be listed. No handle is produced, and a staging tree created by
    /// this call is removed again.
    pub async fn open_with(
        image_path: impl AsRef<Path>,
        config: ImageConfig,
        tools: Arc<dyn SquashfsTools>,
    ) -> SquashResult<Self> {
        let image_path = image_path.as_ref().to_path_buf();
        let staging_dir = config.staging_dir_for(&image_path)?;
        let parser = ListingParser::new(config.get_extraction_root().clone())?;

        if fs::symlink_metadata(&staging_dir).await.is_ok() {
            return Err(SquashError::StagingDirExists(staging_dir));
        }

        if let Some(parent) = staging_dir.parent() {
            fs::create_dir_all(parent).await?;
        }

        tracing::info!(
            "extracting {} into {}",
            image_path.display(),
            staging_dir.display()
        );

        let listing = async {
            tools.extract(&image_path, &staging_dir).await?;
            tools.list(&image_path).await
        }
        .await;

        let listing = match listing {
            Ok(listing) => listing,
            Err(e) => {
                remove_staging_dir(&staging_dir).await;
                return Err(e);
            }
        };

        let store = EntryStore::new(parser.parse(&listing));
        tracing::info!(
            "opened {} with {} entries",
            image_path.display(),
            store.len()
        );

        Ok(Self {
            image_path,
            staging_dir,
            tools,
            store: Arc::new(Mutex::new(Some(store))),
        })
    }

    /// Returns the path of the image file.
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    /// Returns the directory the image was extracted into.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Returns all entries of the image, in listing order.
    pub async fn entries(&self) -> SquashResult<Vec<Entry>> {
        let guard = self.store.lock().await;
        Ok(self.opened(&guard)?.entries().to_vec())
    }

    /// Returns the paths of all entries that are not directories, in listing order.
    pub async fn list_paths(&self) -> SquashResult<Vec<String>> {
        let guard = self.store.lock().await;
        Ok(self.opened(&guard)?.list_paths())
    }

    /// Returns the manifest for the whole image.
    pub async fn manifest(&self) -> SquashResult<String> {
        let guard = self.store.lock().await;
        Ok(self.opened(&guard)?.manifest())
    }

    /// Returns the manifest restricted to `paths`.
    pub async fn manifest_for<S: AsRef<str>>(&self, paths: &[S]) -> SquashResult<String> {
        let guard = self.store.lock().await;
        self.opened(&guard)?.manifest_for(paths)
    }

    /// Builds a new image at `output` holding only the entries whose path is in `paths`.
    ///
    /// The call holds the image for the whole repack, so other requests against this image wait
    /// until it finishes.
    pub async fn build_fragment<S: AsRef<str>>(
        &self,
        paths: &[S],
        output: impl AsRef<Path>,
    ) -> SquashResult<PathBuf> {
        let guard = self.store.lock().await;
        let store = self.opened(&guard)?;
        fragment::build_fragment(
            store,
            &self.staging_dir,
            paths,
            output.as_ref(),
            self.tools.as_ref(),
        )
        .await
    }

    /// Closes the image and removes its staging tree.
    ///
    /// Other clones of the handle fail with [`SquashError::ImageClosed`] afterwards.
    pub async fn close(self) -> SquashResult<()> {
        let mut guard = self.store.lock().await;
        if guard.take().is_none() {
            return Err(SquashError::ImageClosed(self.image_path.clone()));
        }

        tracing::info!(
            "closing {}, removing {}",
            self.image_path.display(),
            self.staging_dir.display()
        );

        if fs::try_exists(&self.staging_dir).await? {
            fs::remove_dir_all(&self.staging_dir).await?;
        }

        Ok(())
    }

    fn opened<'a>(&self, store: &'a Option<EntryStore>) -> SquashResult<&'a EntryStore> {
        store
            .as_ref()
            .ok_or_else(|| SquashError::ImageClosed(self.image_path.clone()))
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

async fn remove_staging_dir(staging_dir: &Path) {
    if let Err(e) = fs::remove_dir_all(staging_dir).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(
                "failed to remove staging tree {}: {}",
                staging_dir.display(),
                e
            );
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl fmt::Debug for SquashfsImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SquashfsImage")
            .field("image_path", &self.image_path)
            .field("staging_dir", &self.staging_dir)
            .finish_non_exhaustive()
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
