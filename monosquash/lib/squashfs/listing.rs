//! Parser for the long listing printed by `unsquashfs -lln`.
//!
//! Each line of the listing describes one filesystem object:
//!
//! ```text
//! drwxr-xr-x 0/0                      52 2024-03-01 12:00 squashfs-root
//! -rw-r--r-- 1000/1000                 6 2024-03-01 12:00 squashfs-root/etc/hostname
//! lrwxrwxrwx 0/0                       7 2024-03-01 12:00 squashfs-root/bin -> usr/bin
//! brw-rw---- 0/6                   8,  0 2024-03-01 12:00 squashfs-root/dev/sda
//! ```
//!
//! The fields are positional: a type character, nine permission characters, the ownership as
//! `owner/group`, either the size or the `major,minor` pair of a device, a sixteen character
//! timestamp and finally the path below the extraction root. A line either matches all of it
//! or is dropped.

use regex::Regex;

use crate::{config::DEFAULT_EXTRACTION_ROOT, SquashError, SquashResult};

use super::{Device, Entry, EntryKind, Ownership, Permissions};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The separator between a symlink's path and its target.
const SYMLINK_ARROW: &str = " -> ";

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Parses listing text into entries.
#[derive(Debug, Clone)]
pub struct ListingParser {
    /// The extraction root every listed path starts with.
    extraction_root: String,

    /// The line grammar, specialized for the extraction root.
    line_regex: Regex,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ListingParser {
    /// Creates a parser for listings whose paths start with `extraction_root`.
    pub fn new(extraction_root: impl Into<String>) -> SquashResult<Self> {
        let extraction_root = extraction_root.into();
        let line_regex = Regex::new(&format!(
            r"^(?P<kind>[cbld-])(?P<perms>.{{9}})\s(?P<owner>\S+)\s+(?:(?P<major>\d+),\s*(?P<minor>\d+)|(?P<size>\d+))\s(?P<mtime>.{{16}})\s{}(?P<path>/.*)?$",
            regex::escape(&extraction_root)
        ))
        .map_err(SquashError::custom)?;

        Ok(Self {
            extraction_root,
            line_regex,
        })
    }

    /// Returns the extraction root the parser strips from paths.
    pub fn extraction_root(&self) -> &str {
        &self.extraction_root
    }

    /// Parses a whole listing, returning the entries of all well-formed lines in listing order.
    ///
    /// Empty and malformed lines are skipped.
    pub fn parse(&self, text: &str) -> Vec<Entry> {
        let mut entries = Vec::new();
        let mut skipped = 0usize;

        for line in text.lines() {
            match self.parse_line(line) {
                Some(entry) => entries.push(entry),
                None => {
                    if !line.trim().is_empty() {
                        tracing::debug!("skipping unrecognized listing line: {:?}", line);
                        skipped += 1;
                    }
                }
            }
        }

        tracing::debug!(
            "parsed {} listing entries, skipped {} lines",
            entries.len(),
            skipped
        );

        entries
    }

    /// Parses a single listing line.
    pub fn parse_line(&self, line: &str) -> Option<Entry> {
        let captures = self.line_regex.captures(line)?;

        let kind = EntryKind::from_char(captures["kind"].chars().next()?)?;
        let permissions = Permissions::decode(&captures["perms"])?;
        let ownership = Ownership::decode(&captures["owner"])?;

        // A device must carry a `major,minor` pair where everything else carries a size.
        let device = match (captures.name("major"), captures.name("minor")) {
            (Some(major), Some(minor)) if kind.is_device() => Some(Device {
                major: major.as_str().parse().ok()?,
                minor: minor.as_str().parse().ok()?,
            }),
            (None, None) if !kind.is_device() => None,
            _ => return None,
        };

        let mut path = captures
            .name("path")
            .map(|m| m.as_str().trim_start_matches('/'))
            .unwrap_or_default();

        if kind == EntryKind::Symlink {
            path = path.split_once(SYMLINK_ARROW)?.0;
        }

        Entry::new(kind, path, device, permissions, ownership).ok()
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Parses a listing whose paths start with the default extraction root.
pub fn parse_listing(text: &str) -> Vec<Entry> {
    ListingParser::default().parse(text)
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for ListingParser {
    fn default() -> Self {
        Self::new(DEFAULT_EXTRACTION_ROOT).expect("default listing grammar is valid")
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_parse_regular_file() {
        let parser = ListingParser::default();
        let entry = parser
            .parse_line("-rw-r--r-- 1000/1000                 6 2024-03-01 12:00 squashfs-root/etc/hostname")
            .unwrap();

        assert_eq!(entry.get_kind(), &EntryKind::File);
        assert_eq!(entry.get_path(), "etc/hostname");
        assert_eq!(entry.get_device(), &None);
        assert_eq!(entry.get_permissions().to_string(), "0644");
        assert_eq!(entry.get_ownership(), &Ownership::new("1000", "1000"));
    }

    #[test]
    fn test_listing_parse_root_directory() {
        let parser = ListingParser::default();
        let entry = parser
            .parse_line("drwxr-xr-x 0/0                      52 2024-03-01 12:00 squashfs-root")
            .unwrap();

        assert!(entry.is_dir());
        assert!(entry.is_root());
        assert_eq!(entry.get_path(), "");
    }

    #[test]
    fn test_listing_parse_block_device() {
        let parser = ListingParser::default();
        let entry = parser
            .parse_line("brw-rw---- 0/6                   8,  1 2024-03-01 12:00 squashfs-root/dev/sda1")
            .unwrap();

        assert_eq!(entry.get_kind(), &EntryKind::BlockDevice);
        assert_eq!(entry.get_path(), "dev/sda1");
        assert_eq!(entry.get_device(), &Some(Device { major: 8, minor: 1 }));
        assert_eq!(entry.get_permissions().to_string(), "0660");
    }

    #[test]
    fn test_listing_parse_char_device_without_padding() {
        let parser = ListingParser::default();
        let entry = parser
            .parse_line("crw-rw-rw- root/root 1,3 2024-03-01 12:00 squashfs-root/dev/null")
            .unwrap();

        assert_eq!(entry.get_kind(), &EntryKind::CharDevice);
        assert_eq!(entry.get_device(), &Some(Device { major: 1, minor: 3 }));
        assert_eq!(entry.get_ownership(), &Ownership::new("root", "root"));
    }

    #[test]
    fn test_listing_parse_symlink_discards_target() {
        let parser = ListingParser::default();
        let entry = parser
            .parse_line("lrwxrwxrwx 0/0                       4 2024-03-01 12:00 squashfs-root/a/b -> /c/d")
            .unwrap();

        assert_eq!(entry.get_kind(), &EntryKind::Symlink);
        assert_eq!(entry.get_path(), "a/b");
    }

    #[test]
    fn test_listing_parse_path_with_spaces() {
        let parser = ListingParser::default();
        let entry = parser
            .parse_line("-rw-r--r-- 0/0 10 2024-03-01 12:00 squashfs-root/my docs/read me.txt")
            .unwrap();

        assert_eq!(entry.get_path(), "my docs/read me.txt");
    }

    #[test]
    fn test_listing_parse_setuid_and_sticky() {
        let parser = ListingParser::default();
        let entry = parser
            .parse_line("-rwsr-xr-t 0/0 10 2024-03-01 12:00 squashfs-root/usr/bin/su")
            .unwrap();

        let perms = entry.get_permissions();
        assert_eq!(
            (perms.sticky, perms.owner, perms.group, perms.other),
            (5, 7, 5, 4)
        );
    }

    #[test]
    fn test_listing_skips_malformed_lines() {
        let parser = ListingParser::default();

        // Blank line.
        assert!(parser.parse_line("").is_none());

        // Unrecognized type character.
        assert!(parser
            .parse_line("xrw-r--r-- 0/0 10 2024-03-01 12:00 squashfs-root/a")
            .is_none());

        // Fifos and sockets are not kept.
        assert!(parser
            .parse_line("prw-r--r-- 0/0 0 2024-03-01 12:00 squashfs-root/fifo")
            .is_none());

        // Bad permission characters.
        assert!(parser
            .parse_line("-rw-r--r-q 0/0 10 2024-03-01 12:00 squashfs-root/a")
            .is_none());

        // Ownership without a separator.
        assert!(parser
            .parse_line("-rw-r--r-- root 10 2024-03-01 12:00 squashfs-root/a")
            .is_none());

        // Device without device numbers, and a file with them.
        assert!(parser
            .parse_line("crw-r--r-- 0/0 10 2024-03-01 12:00 squashfs-root/dev/x")
            .is_none());
        assert!(parser
            .parse_line("-rw-r--r-- 0/0 1,3 2024-03-01 12:00 squashfs-root/a")
            .is_none());

        // Wrong extraction root.
        assert!(parser
            .parse_line("-rw-r--r-- 0/0 10 2024-03-01 12:00 other-root/a")
            .is_none());
        assert!(parser
            .parse_line("-rw-r--r-- 0/0 10 2024-03-01 12:00 squashfs-rootfs/a")
            .is_none());

        // Symlink without a target.
        assert!(parser
            .parse_line("lrwxrwxrwx 0/0 4 2024-03-01 12:00 squashfs-root/a/b")
            .is_none());
    }

    #[test]
    fn test_listing_parse_whole_text() {
        let text = "\
Parallel unsquashfs: Using 8 processors
4 inodes (1 block) to write

drwxr-xr-x 0/0                      52 2024-03-01 12:00 squashfs-root
-rw-r--r-- 0/0                       6 2024-03-01 12:00 squashfs-root/hello
xrw-r--r-- 0/0                       6 2024-03-01 12:00 squashfs-root/bogus
lrwxrwxrwx 0/0                       5 2024-03-01 12:00 squashfs-root/link -> hello
crw-rw-rw- 0/0                   1,  3 2024-03-01 12:00 squashfs-root/null
";

        let entries = parse_listing(text);
        let paths: Vec<&str> = entries.iter().map(|e| e.get_path().as_str()).collect();
        assert_eq!(paths, vec!["", "hello", "link", "null"]);
    }

    #[test]
    fn test_listing_custom_extraction_root() -> anyhow::Result<()> {
        let parser = ListingParser::new("rootfs.d")?;
        assert_eq!(parser.extraction_root(), "rootfs.d");

        let entry = parser
            .parse_line("-rw-r--r-- 0/0 10 2024-03-01 12:00 rootfs.d/a")
            .unwrap();
        assert_eq!(entry.get_path(), "a");

        // The root marker is matched literally.
        assert!(parser
            .parse_line("-rw-r--r-- 0/0 10 2024-03-01 12:00 rootfsxd/a")
            .is_none());
        Ok(())
    }
}
