//! Authorization predicates shared by the match and payment lifecycles.
//!
//! All functions are pure: callers load the owning user ids and ask whether
//! an actor holds the capability. Nothing here touches the database.

use crate::error::CoreError;
use crate::types::DbId;

/// The two legitimate actors of a match: the package owner (sender) and the
/// ride owner (carrier).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchParties {
    pub package_owner_id: DbId,
    pub ride_owner_id: DbId,
}

impl MatchParties {
    pub const fn new(package_owner_id: DbId, ride_owner_id: DbId) -> Self {
        Self {
            package_owner_id,
            ride_owner_id,
        }
    }

    /// The participant on the other side of `actor`.
    ///
    /// Returns `None` when the actor is not a participant, or when the same
    /// user owns both the package and the ride (there is nobody to tell).
    pub fn counterparty_of(&self, actor: DbId) -> Option<DbId> {
        if self.package_owner_id == self.ride_owner_id {
            None
        } else if actor == self.package_owner_id {
            Some(self.ride_owner_id)
        } else if actor == self.ride_owner_id {
            Some(self.package_owner_id)
        } else {
            None
        }
    }

    /// Every participant except `actor`, deduplicated.
    pub fn others(&self, actor: DbId) -> Vec<DbId> {
        let mut out = Vec::with_capacity(2);
        for id in [self.package_owner_id, self.ride_owner_id] {
            if id != actor && !out.contains(&id) {
                out.push(id);
            }
        }
        out
    }
}

pub fn is_package_owner(parties: &MatchParties, actor: DbId) -> bool {
    parties.package_owner_id == actor
}

pub fn is_ride_owner(parties: &MatchParties, actor: DbId) -> bool {
    parties.ride_owner_id == actor
}

pub fn is_match_participant(parties: &MatchParties, actor: DbId) -> bool {
    is_package_owner(parties, actor) || is_ride_owner(parties, actor)
}

/// The payment owner or either participant of the paid match.
pub fn is_payment_participant(payment_owner_id: DbId, parties: &MatchParties, actor: DbId) -> bool {
    payment_owner_id == actor || is_match_participant(parties, actor)
}

/// Reject with `Forbidden` unless `actor` is a match participant.
pub fn require_match_participant(parties: &MatchParties, actor: DbId) -> Result<(), CoreError> {
    if is_match_participant(parties, actor) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the package owner or the ride owner may act on this match".into(),
        ))
    }
}

/// Reject with `Forbidden` unless `actor` may act on the payment.
pub fn require_payment_participant(
    payment_owner_id: DbId,
    parties: &MatchParties,
    actor: DbId,
) -> Result<(), CoreError> {
    if is_payment_participant(payment_owner_id, parties, actor) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "Only the payment owner or a match participant may act on this payment".into(),
        ))
    }
}
