//! Lifecycle state for proposals.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The lifecycle state of a proposal.
///
/// `Closed` and `Expired` are terminal: once a proposal leaves `Active`
/// its vote ledger is frozen and no further transition occurs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    /// Open for voting and revocation.
    Active,
    /// Ended early by an administrator before the deadline.
    Closed,
    /// Deadline passed without an explicit close.
    Expired,
}

impl ProposalStatus {
    /// Whether votes can still be cast or revoked.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// Whether this state admits no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Expired)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
