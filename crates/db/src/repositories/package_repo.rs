//! Repository for the `packages` table.

use carryshare_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::package::{CreatePackage, Package};

/// Column list for `packages` queries.
const COLUMNS: &str = "id, owner_id, pickup_address, delivery_address, weight_kg, \
    size_label, status, created_at, updated_at";

pub struct PackageRepo;

impl PackageRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreatePackage,
    ) -> Result<Package, sqlx::Error> {
        let query = format!(
            "INSERT INTO packages \
                (owner_id, pickup_address, delivery_address, weight_kg, size_label) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Package>(&query)
            .bind(input.owner_id)
            .bind(&input.pickup_address)
            .bind(&input.delivery_address)
            .bind(input.weight_kg)
            .bind(&input.size_label)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Package>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM packages WHERE id = $1");
        sqlx::query_as::<_, Package>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
