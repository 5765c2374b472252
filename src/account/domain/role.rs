//! Partner role within a two-person household.

use super::ParsePartnerRoleError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two symmetric roles an account holds.
///
/// A partnership links exactly one account of each role. The role is fixed
/// once a partner is linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartnerRole {
    /// The husband side of a partnership.
    Husband,
    /// The wife side of a partnership.
    Wife,
}

impl PartnerRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Husband => "husband",
            Self::Wife => "wife",
        }
    }

    /// Returns the role a linked partner must hold.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Husband => Self::Wife,
            Self::Wife => Self::Husband,
        }
    }
}

impl fmt::Display for PartnerRole {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for PartnerRole {
    type Error = ParsePartnerRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "husband" => Ok(Self::Husband),
            "wife" => Ok(Self::Wife),
            _ => Err(ParsePartnerRoleError(value.to_owned())),
        }
    }
}
