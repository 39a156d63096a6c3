//! Serialization of entries into a pseudofile manifest for `mksquashfs -pf`.
//!
//! Device entries become device directives that create the node:
//!
//! ```text
//! dev/sda b 0660 0 6 8 0
//! ```
//!
//! Every other entry becomes an `m` directive that only overrides the metadata of a path
//! already present in the source tree. The root is written as `/`:
//!
//! ```text
//! / m 0755 0 0
//! etc/hostname m 0644 0 0
//! ```
//!
//! Whitespace, backslashes and double quotes in a path are escaped with a backslash, so
//! `my docs/read me.txt` is written as `my\ docs/read\ me.txt`.

use std::borrow::Cow;

use super::Entry;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The directive letter that overrides metadata of an existing path.
const METADATA_DIRECTIVE: char = 'm';

/// The path the root entry is written as.
const ROOT_PATH: &str = "/";

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Returns the manifest directive for a single entry.
pub fn directive(entry: &Entry) -> String {
    let perms = entry.get_permissions();
    let ownership = entry.get_ownership();

    match entry.get_device() {
        Some(device) => format!(
            "{} {} {} {} {} {} {}",
            escape_path(entry.get_path()),
            entry.get_kind(),
            perms,
            ownership.owner,
            ownership.group,
            device.major,
            device.minor
        ),
        None => {
            let path = match entry.get_path().as_str() {
                "" => Cow::Borrowed(ROOT_PATH),
                path => escape_path(path),
            };

            format!(
                "{} {} {} {} {}",
                path, METADATA_DIRECTIVE, perms, ownership.owner, ownership.group
            )
        }
    }
}

/// Escapes the characters mksquashfs would otherwise read as field separators or quoting.
pub fn escape_path(path: &str) -> Cow<'_, str> {
    if !path.chars().any(needs_escape) {
        return Cow::Borrowed(path);
    }

    let mut escaped = String::with_capacity(path.len() + 4);
    for c in path.chars() {
        if needs_escape(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    Cow::Owned(escaped)
}

fn needs_escape(c: char) -> bool {
    c.is_whitespace() || c == '\\' || c == '"'
}

/// Serializes entries into manifest text, one directive per line.
///
/// Lines are emitted in the reverse of the order the entries are given in, the order the
/// manifests of existing images were produced in. Lines are joined with `\n` and there is no
/// trailing newline.
pub fn serialize<'a, I>(entries: I) -> String
where
    I: IntoIterator<Item = &'a Entry>,
    I::IntoIter: DoubleEndedIterator,
{
    entries
        .into_iter()
        .rev()
        .map(directive)
        .collect::<Vec<_>>()
        .join("\n")
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
