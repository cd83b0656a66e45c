//! Match entity models and DTOs.

use carryshare_core::match_status::MatchStatus;
use carryshare_core::policy::MatchParties;
use carryshare_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `matches` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: DbId,
    pub package_id: DbId,
    pub ride_id: DbId,
    #[sqlx(try_from = "String")]
    pub status: MatchStatus,
    pub price: Option<f64>,
    pub proposed_by_user_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A match joined with the owners of its package and ride.
#[derive(Debug, Clone, FromRow)]
pub struct MatchWithParties {
    #[sqlx(flatten)]
    pub record: Match,
    pub package_owner_id: DbId,
    pub ride_owner_id: DbId,
}

impl MatchWithParties {
    pub fn parties(&self) -> MatchParties {
        MatchParties::new(self.package_owner_id, self.ride_owner_id)
    }
}

/// DTO for inserting a match. The status is always `PROPOSED`.
#[derive(Debug, Clone)]
pub struct CreateMatch {
    pub package_id: DbId,
    pub ride_id: DbId,
    pub price: Option<f64>,
    pub proposed_by_user_id: DbId,
}

/// Scope and filters for listing matches.
///
/// `user_id` is mandatory: listings only ever cover matches where the user
/// owns the package or the ride. An empty `statuses` means "any status".
#[derive(Debug, Clone)]
pub struct MatchFilter {
    pub user_id: DbId,
    pub statuses: Vec<MatchStatus>,
    pub limit: i64,
    pub offset: i64,
}
