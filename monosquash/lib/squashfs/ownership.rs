use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::SquashError;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// The owner and group of an entry.
///
/// Both are kept verbatim as printed by the listing tool. They may be names or numeric ids and
/// are never looked up or validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ownership {
    /// The owning user.
    pub owner: String,

    /// The owning group.
    pub group: String,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl Ownership {
    /// Creates a new ownership pair.
    pub fn new(owner: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            group: group.into(),
        }
    }

    /// Decodes an `<owner>/<group>` string, splitting once on the first `/`.
    ///
    /// ## Examples
    ///
    /// ```
    /// use monosquash::squashfs::Ownership;
    ///
    /// let ownership = Ownership::decode("1000/1000").unwrap();
    /// assert_eq!(ownership, Ownership::new("1000", "1000"));
    /// ```
    pub fn decode(s: &str) -> Option<Self> {
        let (owner, group) = s.split_once('/')?;
        Some(Self::new(owner, group))
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl FromStr for Ownership {
    type Err = SquashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s).ok_or_else(|| SquashError::InvalidOwnership(s.to_string()))
    }
}

impl Display for Ownership {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.group)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
