use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::SquashError;

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The number of characters in a permission string, three for each of owner, group and other.
pub const PERMISSION_STRING_LEN: usize = 9;

/// Weight of a special character in the owner, group and other triads respectively.
const SPECIAL_WEIGHTS: [u8; 3] = [4, 2, 1];

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Decoded permission bits of an entry.
///
/// `sticky` aggregates the setuid (4), setgid (2) and sticky (1) flags. The other three fields
/// are the standard octal digits for owner, group and other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Permissions {
    /// The setuid, setgid and sticky flags.
    pub sticky: u8,

    /// The owner's permission digit.
    pub owner: u8,

    /// The group's permission digit.
    pub group: u8,

    /// Everyone else's permission digit.
    pub other: u8,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Permissions {
    /// Decodes a nine character permission string such as `rwxr-xr--` or `rwsr-xr-t`.
    ///
    /// In each triad the first two characters add 4 for `r` and 2 for `w`. The third character
    /// adds 1 to the standard digit for `x` and `s`. Any of `s`, `t`, `S` and `T` in the third
    /// position also sets that triad's special flag, weighted 4, 2 and 1 for owner, group and
    /// other.
    ///
    /// Returns `None` if the string is not exactly nine valid permission characters.
    ///
    /// ## Examples
    ///
    /// ```
    /// use monosquash::squashfs::Permissions;
    ///
    /// let perms = Permissions::decode("rwsr-xr-t").unwrap();
    /// assert_eq!((perms.sticky, perms.owner, perms.group, perms.other), (5, 7, 5, 4));
    /// ```
    pub fn decode(s: &str) -> Option<Self> {
        let chars: Vec<char> = s.chars().collect();
        if chars.len() != PERMISSION_STRING_LEN {
            return None;
        }

        let mut digits = [0u8; 3];
        let mut sticky = 0;
        for (i, triad) in chars.chunks(3).enumerate() {
            let (digit, special) = decode_triad(triad[0], triad[1], triad[2])?;
            digits[i] = digit;
            if special {
                sticky += SPECIAL_WEIGHTS[i];
            }
        }

        Some(Self {
            sticky,
            owner: digits[0],
            group: digits[1],
            other: digits[2],
        })
    }

    /// Returns the combined numeric mode, e.g. `0o4755`.
    pub fn mode(&self) -> u32 {
        (self.sticky as u32) << 9
            | (self.owner as u32) << 6
            | (self.group as u32) << 3
            | self.other as u32
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Decodes one triad into its standard digit and whether its special flag is set.
fn decode_triad(read: char, write: char, exec: char) -> Option<(u8, bool)> {
    let read = match read {
        'r' => 4,
        '-' => 0,
        _ => return None,
    };

    let write = match write {
        'w' => 2,
        '-' => 0,
        _ => return None,
    };

    let (exec, special) = match exec {
        'x' => (1, false),
        '-' => (0, false),
        's' => (1, true),
        't' | 'S' | 'T' => (0, true),
        _ => return None,
    };

    Some((read + write + exec, special))
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for Permissions {
    type Err = SquashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s).ok_or_else(|| SquashError::InvalidPermissions(s.to_string()))
    }
}

impl Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.sticky, self.owner, self.group, self.other)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
