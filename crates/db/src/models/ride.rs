//! Ride entity model and DTO.

use carryshare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `rides` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ride {
    pub id: DbId,
    pub owner_id: DbId,
    pub origin: String,
    pub destination: String,
    pub departure_at: Timestamp,
    pub capacity_kg: Option<f64>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a ride.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRide {
    pub owner_id: DbId,
    pub origin: String,
    pub destination: String,
    pub departure_at: Timestamp,
    pub capacity_kg: Option<f64>,
}
