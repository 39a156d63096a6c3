//! Path utilities.

use typed_path::{Utf8UnixComponent, Utf8UnixPathBuf};

use crate::{SquashError, SquashResult};

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Normalizes a caller-supplied path into the form entry paths are stored in.
///
/// Entry paths are relative to the image root and the root itself is the empty string.
///
/// Rules:
/// - A leading `/` is dropped, the path is taken relative to the image root
/// - `.` components and redundant separators are removed
/// - `..` components are resolved, but may not climb above the image root
///
/// ## Examples
///
/// ```
/// use monosquash::utils::normalize_entry_path;
///
/// assert_eq!(normalize_entry_path("/etc//passwd").unwrap(), "etc/passwd");
/// assert_eq!(normalize_entry_path("usr/./lib/../bin").unwrap(), "usr/bin");
/// assert_eq!(normalize_entry_path("/").unwrap(), "");
/// assert!(normalize_entry_path("../etc").is_err());
/// ```
pub fn normalize_entry_path(path: &str) -> SquashResult<String> {
    let path = Utf8UnixPathBuf::from(path);
    let mut normalized: Vec<&str> = Vec::new();

    for component in path.components() {
        match component {
            Utf8UnixComponent::RootDir | Utf8UnixComponent::CurDir => continue,
            Utf8UnixComponent::ParentDir => {
                if normalized.pop().is_none() {
                    return Err(SquashError::PathValidation(format!(
                        "cannot traverse above image root: {}",
                        path
                    )));
                }
            }
            Utf8UnixComponent::Normal(c) => {
                if !c.is_empty() {
                    normalized.push(c);
                }
            }
        }
    }

    Ok(normalized.join("/"))
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
