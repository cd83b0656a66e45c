//! Repository for the `payments` table.
//!
//! Payments are never deleted. Status updates are compare-and-swap on the
//! previously observed status, like [`MatchRepo`](super::MatchRepo).

use carryshare_core::payment_status::PaymentStatus;
use carryshare_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::payment::{
    CreatePayment, ExternalRefs, Payment, PaymentFilter, PaymentWithParties,
};

/// Column list for `payments` queries.
const COLUMNS: &str = "id, user_id, match_id, amount, currency, payment_method, status, \
    transaction_id, payment_intent_id, created_at, updated_at";

/// Column list prefixed with the `pay` alias, for JOIN queries.
const PAY_COLUMNS: &str = "pay.id, pay.user_id, pay.match_id, pay.amount, pay.currency, \
    pay.payment_method, pay.status, pay.transaction_id, pay.payment_intent_id, \
    pay.created_at, pay.updated_at";

pub struct PaymentRepo;

impl PaymentRepo {
    /// Insert a payment in `PENDING`.
    ///
    /// A second payment for the same match violates `uq_payments_match_id`.
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreatePayment,
    ) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO payments (user_id, match_id, amount, currency, payment_method, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(input.user_id)
            .bind(input.match_id)
            .bind(input.amount)
            .bind(&input.currency)
            .bind(&input.payment_method)
            .bind(PaymentStatus::Pending.as_str())
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_match<'e>(
        executor: impl PgExecutor<'e>,
        match_id: DbId,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM payments WHERE match_id = $1");
        sqlx::query_as::<_, Payment>(&query)
            .bind(match_id)
            .fetch_optional(executor)
            .await
    }

    /// Load a payment together with the two participants of its match.
    pub async fn find_with_parties<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<PaymentWithParties>, sqlx::Error> {
        let query = format!(
            "SELECT {PAY_COLUMNS}, \
                    p.owner_id AS package_owner_id, \
                    r.owner_id AS ride_owner_id \
             FROM payments pay \
             JOIN matches m ON m.id = pay.match_id \
             JOIN packages p ON p.id = m.package_id \
             JOIN rides r ON r.id = m.ride_id \
             WHERE pay.id = $1"
        );
        sqlx::query_as::<_, PaymentWithParties>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Move a payment from `expected` to `new_status`, recording any
    /// processor references supplied alongside.
    ///
    /// Returns `None` if the status is no longer `expected`.
    pub async fn update_status<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        expected: PaymentStatus,
        new_status: PaymentStatus,
        refs: &ExternalRefs,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET \
                status = $3, \
                transaction_id = COALESCE($4, transaction_id), \
                payment_intent_id = COALESCE($5, payment_intent_id) \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(expected.as_str())
            .bind(new_status.as_str())
            .bind(&refs.transaction_id)
            .bind(&refs.payment_intent_id)
            .fetch_optional(executor)
            .await
    }

    /// Record processor references without changing the status.
    ///
    /// Only applies while the payment is `PENDING`.
    pub async fn update_refs<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
        refs: &ExternalRefs,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "UPDATE payments SET \
                transaction_id = COALESCE($2, transaction_id), \
                payment_intent_id = COALESCE($3, payment_intent_id) \
             WHERE id = $1 AND status = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(&refs.transaction_id)
            .bind(&refs.payment_intent_id)
            .bind(PaymentStatus::Pending.as_str())
            .fetch_optional(executor)
            .await
    }

    /// List payments the user owns or whose match they take part in,
    /// newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        filter: &PaymentFilter,
    ) -> Result<Vec<Payment>, sqlx::Error> {
        let statuses: Vec<&str> = filter.statuses.iter().map(|s| s.as_str()).collect();
        let query = format!(
            "SELECT {PAY_COLUMNS} \
             FROM payments pay \
             JOIN matches m ON m.id = pay.match_id \
             JOIN packages p ON p.id = m.package_id \
             JOIN rides r ON r.id = m.ride_id \
             WHERE (pay.user_id = $1 OR p.owner_id = $1 OR r.owner_id = $1) \
               AND (cardinality($2::text[]) = 0 OR pay.status = ANY($2)) \
               AND ($3::bigint IS NULL OR pay.match_id = $3) \
             ORDER BY pay.created_at DESC, pay.id DESC \
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(filter.user_id)
            .bind(statuses)
            .bind(filter.match_id)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }
}
