//! Repository for the `matches` table.
//!
//! Status changes are compare-and-swap: every mutating statement carries the
//! status the caller last observed in its `WHERE` clause, and returns `None`
//! (or `false`) when another writer got there first.

use carryshare_core::match_status::{MatchStatus, LIVE_STATUSES};
use carryshare_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::matches::{CreateMatch, Match, MatchFilter, MatchWithParties};

/// Column list for `matches` queries.
const COLUMNS: &str =
    "id, package_id, ride_id, status, price, proposed_by_user_id, created_at, updated_at";

/// Column list prefixed with the `m` alias, for JOIN queries.
const M_COLUMNS: &str = "m.id, m.package_id, m.ride_id, m.status, m.price, \
    m.proposed_by_user_id, m.created_at, m.updated_at";

/// Upper-case tokens of the live statuses, for `= ANY($n)` binds.
fn live_tokens() -> Vec<&'static str> {
    LIVE_STATUSES.iter().map(|s| s.as_str()).collect()
}

pub struct MatchRepo;

impl MatchRepo {
    /// Insert a match in `PROPOSED`.
    ///
    /// A second live match for the same pair violates
    /// `uq_matches_live_pair` and surfaces as a unique-constraint error.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateMatch,
    ) -> Result<Match, sqlx::Error> {
        let query = format!(
            "INSERT INTO matches (package_id, ride_id, status, price, proposed_by_user_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Match>(&query)
            .bind(input.package_id)
            .bind(input.ride_id)
            .bind(MatchStatus::Proposed.as_str())
            .bind(input.price)
            .bind(input.proposed_by_user_id)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Match>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM matches WHERE id = $1");
        sqlx::query_as::<_, Match>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Load a match together with its package owner and ride owner.
    pub async fn find_with_parties<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<MatchWithParties>, sqlx::Error> {
        let query = format!(
            "SELECT {M_COLUMNS}, \
                    p.owner_id AS package_owner_id, \
                    r.owner_id AS ride_owner_id \
             FROM matches m \
             JOIN packages p ON p.id = m.package_id \
             JOIN rides r ON r.id = m.ride_id \
             WHERE m.id = $1"
        );
        sqlx::query_as::<_, MatchWithParties>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Like [`Self::find_with_parties`], but takes a share lock on the match
    /// row until the surrounding transaction ends.
    ///
    /// Status changes block while the lock is held, and a status change
    /// already in flight is waited out, so the returned status stays current
    /// for the rest of the transaction.
    pub async fn find_with_parties_for_share<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<MatchWithParties>, sqlx::Error> {
        let query = format!(
            "SELECT {M_COLUMNS}, \
                    p.owner_id AS package_owner_id, \
                    r.owner_id AS ride_owner_id \
             FROM matches m \
             JOIN packages p ON p.id = m.package_id \
             JOIN rides r ON r.id = m.ride_id \
             WHERE m.id = $1 \
             FOR SHARE OF m"
        );
        sqlx::query_as::<_, MatchWithParties>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// The live match for a package/ride pair, if any.
    pub async fn find_live_for_pair<'e>(
        executor: impl PgExecutor<'e>,
        package_id: DbId,
        ride_id: DbId,
    ) -> Result<Option<Match>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM matches \
             WHERE package_id = $1 AND ride_id = $2 AND status = ANY($3) \
             LIMIT 1"
        );
        sqlx::query_as::<_, Match>(&query)
            .bind(package_id)
            .bind(ride_id)
            .bind(live_tokens())
            .fetch_optional(executor)
            .await
    }

    /// Move a match from `expected` to `new_status`.
    ///
    /// Returns `None` if the row no longer exists or its status is no longer
    /// `expected`.
    pub async fn update_status<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        expected: MatchStatus,
        new_status: MatchStatus,
    ) -> Result<Option<Match>, sqlx::Error> {
        let query = format!(
            "UPDATE matches SET status = $3 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Match>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(new_status.as_str())
            .fetch_optional(executor)
            .await
    }

    /// Replace the proposed price. Only applies while the match is `PROPOSED`.
    pub async fn update_price<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        price: Option<f64>,
    ) -> Result<Option<Match>, sqlx::Error> {
        let query = format!(
            "UPDATE matches SET price = $2 \
             WHERE id = $1 AND status = $3 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Match>(&query)
            .bind(id)
            .bind(price)
            .bind(MatchStatus::Proposed.as_str())
            .fetch_optional(executor)
            .await
    }

    /// Hard-delete a match still in `expected`.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        expected: MatchStatus,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM matches WHERE id = $1 AND status = $2")
            .bind(id)
            .bind(expected.as_str())
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List matches where the user owns the package or the ride, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        filter: &MatchFilter,
    ) -> Result<Vec<Match>, sqlx::Error> {
        let statuses: Vec<&str> = filter.statuses.iter().map(|s| s.as_str()).collect();
        let query = format!(
            "SELECT {M_COLUMNS} \
             FROM matches m \
             JOIN packages p ON p.id = m.package_id \
             JOIN rides r ON r.id = m.ride_id \
             WHERE (p.owner_id = $1 OR r.owner_id = $1) \
               AND (cardinality($2::text[]) = 0 OR m.status = ANY($2)) \
             ORDER BY m.created_at DESC, m.id DESC \
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, Match>(&query)
            .bind(filter.user_id)
            .bind(statuses)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }
}
