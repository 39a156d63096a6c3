use std::fmt::{self, Display};

use getset::Getters;

use crate::{SquashError, SquashResult};

use super::{Ownership, Permissions};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The kind of filesystem object an entry describes.
///
/// Listing lines for any other kind of object (fifos, sockets) are dropped by the parser, so
/// there is no variant for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Directory,

    /// A symbolic link.
    Symlink,

    /// A character device node.
    CharDevice,

    /// A block device node.
    BlockDevice,
}

/// The major and minor numbers of a device node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Device {
    /// The major device number.
    pub major: u32,

    /// The minor device number.
    pub minor: u32,
}

/// A single filesystem object of a squashfs image, as reported by its long listing.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
#[getset(get = "pub with_prefix")]
pub struct Entry {
    /// The kind of the object.
    kind: EntryKind,

    /// The path relative to the image root. The root itself has an empty path.
    ///
    /// For symlinks this is the path of the link, not of its target.
    path: String,

    /// The device numbers, present only for character and block devices.
    device: Option<Device>,

    /// The permission bits.
    permissions: Permissions,

    /// The owner and group, as printed by the listing tool.
    ownership: Ownership,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl EntryKind {
    /// Maps a listing type character to a kind. Returns `None` for unsupported kinds.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(Self::File),
            'd' => Some(Self::Directory),
            'l' => Some(Self::Symlink),
            'c' => Some(Self::CharDevice),
            'b' => Some(Self::BlockDevice),
            _ => None,
        }
    }

    /// Returns the listing type character of the kind.
    pub fn as_char(&self) -> char {
        match self {
            Self::File => '-',
            Self::Directory => 'd',
            Self::Symlink => 'l',
            Self::CharDevice => 'c',
            Self::BlockDevice => 'b',
        }
    }

    /// Whether the kind is a character or block device.
    pub fn is_device(&self) -> bool {
        matches!(self, Self::CharDevice | Self::BlockDevice)
    }
}

impl Entry {
    /// Creates a new entry.
    ///
    /// ## Errors
    ///
    /// Returns [`SquashError::DeviceMismatch`] unless `device` is `Some` exactly when `kind` is a
    /// device kind.
    pub fn new(
        kind: EntryKind,
        path: impl Into<String>,
        device: Option<Device>,
        permissions: Permissions,
        ownership: Ownership,
    ) -> SquashResult<Self> {
        let path = path.into();
        if kind.is_device() != device.is_some() {
            return Err(SquashError::DeviceMismatch {
                path,
                kind: kind.as_char(),
            });
        }

        Ok(Self {
            kind,
            path,
            device,
            permissions,
            ownership,
        })
    }

    /// Whether the entry is a character or block device.
    pub fn is_device(&self) -> bool {
        self.kind.is_device()
    }

    /// Whether the entry is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Whether the entry is the image root.
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
