//! Match lifecycle states and the transition table.
//!
//! ```text
//! PROPOSED ──> ACCEPTED_BY_SENDER ──┐
//!    │   └───> ACCEPTED_BY_CARRIER ─┴──> CONFIRMED ──> CANCELLED
//!    │                 │
//!    └──> REJECTED     └──────────────────────────────> CANCELLED
//! ```
//!
//! The tokens are stored verbatim in `matches.status` and sent over the wire
//! as upper-case strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Proposed,
    AcceptedBySender,
    AcceptedByCarrier,
    Confirmed,
    Rejected,
    Cancelled,
}

/// Statuses counted by the one-live-match-per-pair invariant.
pub const LIVE_STATUSES: [MatchStatus; 4] = [
    MatchStatus::Proposed,
    MatchStatus::AcceptedBySender,
    MatchStatus::AcceptedByCarrier,
    MatchStatus::Confirmed,
];

impl MatchStatus {
    pub const ALL: [MatchStatus; 6] = [
        MatchStatus::Proposed,
        MatchStatus::AcceptedBySender,
        MatchStatus::AcceptedByCarrier,
        MatchStatus::Confirmed,
        MatchStatus::Rejected,
        MatchStatus::Cancelled,
    ];

    /// The upper-case token stored in the database.
    pub const fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Proposed => "PROPOSED",
            MatchStatus::AcceptedBySender => "ACCEPTED_BY_SENDER",
            MatchStatus::AcceptedByCarrier => "ACCEPTED_BY_CARRIER",
            MatchStatus::Confirmed => "CONFIRMED",
            MatchStatus::Rejected => "REJECTED",
            MatchStatus::Cancelled => "CANCELLED",
        }
    }

    /// Statuses this one may move to.
    pub const fn allowed_targets(self) -> &'static [MatchStatus] {
        match self {
            MatchStatus::Proposed => &[
                MatchStatus::AcceptedBySender,
                MatchStatus::AcceptedByCarrier,
                MatchStatus::Rejected,
            ],
            MatchStatus::AcceptedBySender | MatchStatus::AcceptedByCarrier => {
                &[MatchStatus::Confirmed, MatchStatus::Cancelled]
            }
            MatchStatus::Confirmed => &[MatchStatus::Cancelled],
            MatchStatus::Rejected | MatchStatus::Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, target: MatchStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    /// A live match blocks another proposal for the same package/ride pair.
    pub fn is_live(self) -> bool {
        LIVE_STATUSES.contains(&self)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_targets().is_empty()
    }

    /// Withdrawal (hard delete) is only allowed before anyone committed to
    /// the match, or after it was declined.
    pub fn is_deletable(self) -> bool {
        matches!(self, MatchStatus::Proposed | MatchStatus::Rejected)
    }

    /// Return `Ok(())` if `self -> target` is an edge of the table.
    pub fn validate_transition(self, target: MatchStatus) -> Result<(), CoreError> {
        if self.can_transition_to(target) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition {
                entity: "Match",
                from: self.as_str().to_string(),
                to: target.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MatchStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid match status '{s}'. Must be one of: {}",
                    MatchStatus::ALL.map(MatchStatus::as_str).join(", ")
                ))
            })
    }
}

impl TryFrom<String> for MatchStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
