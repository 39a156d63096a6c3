use std::collections::HashSet;

use crate::{utils, SquashResult};

use super::{pseudofile, Entry};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The parsed entries of one image, kept in listing order.
///
/// The store is built once when an image is opened and never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl EntryStore {
    /// Creates a store from entries in listing order.
    pub fn new(entries: Vec<Entry>) -> Self {
        Self { entries }
    }

    /// Returns all entries in listing order.
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the paths of all entries that are not directories, in listing order.
    pub fn list_paths(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|entry| !entry.is_dir())
            .map(|entry| entry.get_path().clone())
            .collect()
    }

    /// Returns the manifest for every entry of the image.
    pub fn manifest(&self) -> String {
        pseudofile::serialize(&self.entries)
    }

    /// Returns the manifest restricted to the entries whose path is in `paths`.
    pub fn manifest_for<S: AsRef<str>>(&self, paths: &[S]) -> SquashResult<String> {
        Ok(pseudofile::serialize(self.select(paths)?))
    }

    /// Returns the entries whose path is in `paths`, in listing order.
    ///
    /// Requested paths are normalized first, so `/etc/passwd` selects the entry `etc/passwd` and
    /// `/` selects the root. Requested paths without an entry are ignored.
    pub fn select<S: AsRef<str>>(&self, paths: &[S]) -> SquashResult<Vec<&Entry>> {
        let wanted = paths
            .iter()
            .map(|path| utils::normalize_entry_path(path.as_ref()))
            .collect::<SquashResult<HashSet<_>>>()?;

        Ok(self
            .entries
            .iter()
            .filter(|entry| wanted.contains(entry.get_path()))
            .collect())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::{squashfs::parse_listing, SquashError};

    use super::*;

    #[test]
    fn test_store_list_paths_skips_directories() {
        let store = helper::sample_store();
        assert_eq!(
            store.list_paths(),
            vec!["etc/hostname", "bin", "dev/sda", "dev/null"]
        );
    }

    #[test]
    fn test_store_manifest() {
        let store = helper::sample_store();
        assert_eq!(
            store.manifest(),
            "\
dev/null c 0666 0 0 1 3
dev/sda b 0660 0 6 8 0
bin m 0777 0 0
etc/hostname m 0644 1000 1000
etc m 0755 0 0
/ m 0755 0 0"
        );
    }

    #[test]
    fn test_store_manifest_for_subset() -> anyhow::Result<()> {
        let store = helper::sample_store();

        let manifest = store.manifest_for(&["/dev/sda", "etc//hostname", "missing"])?;
        assert_eq!(
            manifest,
            "dev/sda b 0660 0 6 8 0\netc/hostname m 0644 1000 1000"
        );

        let manifest = store.manifest_for(&["/"])?;
        assert_eq!(manifest, "/ m 0755 0 0");

        let empty: [&str; 0] = [];
        assert_eq!(store.manifest_for(&empty)?, "");
        Ok(())
    }

    #[test]
    fn test_store_manifest_for_all_paths_matches_manifest() -> anyhow::Result<()> {
        let store = helper::sample_store();
        let all: Vec<String> = store
            .entries()
            .iter()
            .map(|entry| entry.get_path().clone())
            .collect();

        assert_eq!(store.manifest_for(&all)?, store.manifest());
        Ok(())
    }

    #[test]
    fn test_store_select_rejects_escaping_paths() {
        let store = helper::sample_store();
        assert!(matches!(
            store.select(&["../etc/hostname"]),
            Err(SquashError::PathValidation(_))
        ));
    }

    #[test]
    fn test_store_len() {
        let store = helper::sample_store();
        assert_eq!(store.len(), 6);
        assert!(!store.is_empty());
        assert!(EntryStore::default().is_empty());
    }

    mod helper {
        use super::*;

        pub(super) fn sample_store() -> EntryStore {
            EntryStore::new(parse_listing(
                "\
drwxr-xr-x 0/0                      52 2024-03-01 12:00 squashfs-root
drwxr-xr-x 0/0                      31 2024-03-01 12:00 squashfs-root/etc
-rw-r--r-- 1000/1000                 6 2024-03-01 12:00 squashfs-root/etc/hostname
lrwxrwxrwx 0/0                       7 2024-03-01 12:00 squashfs-root/bin -> usr/bin
brw-rw---- 0/6                   8,  0 2024-03-01 12:00 squashfs-root/dev/sda
crw-rw-rw- 0/0                   1,  3 2024-03-01 12:00 squashfs-root/dev/null
",
            ))
        }
    }
}
