//! Repository for the `rides` table.

use carryshare_core::types::DbId;
use sqlx::PgExecutor;

use crate::models::ride::{CreateRide, Ride};

/// Column list for `rides` queries.
const COLUMNS: &str = "id, owner_id, origin, destination, departure_at, capacity_kg, \
    status, created_at, updated_at";

pub struct RideRepo;

impl RideRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateRide,
    ) -> Result<Ride, sqlx::Error> {
        let query = format!(
            "INSERT INTO rides (owner_id, origin, destination, departure_at, capacity_kg) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ride>(&query)
            .bind(input.owner_id)
            .bind(&input.origin)
            .bind(&input.destination)
            .bind(input.departure_at)
            .bind(input.capacity_kg)
            .fetch_one(executor)
            .await
    }

    pub async fn find_by_id<'e>(
        executor: impl PgExecutor<'e>,
        id: DbId,
    ) -> Result<Option<Ride>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM rides WHERE id = $1");
        sqlx::query_as::<_, Ride>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }
}
