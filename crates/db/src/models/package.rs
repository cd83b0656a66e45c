//! Package entity model and DTO.
//!
//! Packages are owned by the marketplace CRUD surface; the match engine only
//! reads `owner_id` to resolve the sender side of a match.

use carryshare_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `packages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    pub id: DbId,
    pub owner_id: DbId,
    pub pickup_address: String,
    pub delivery_address: String,
    pub weight_kg: Option<f64>,
    pub size_label: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a package.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePackage {
    pub owner_id: DbId,
    pub pickup_address: String,
    pub delivery_address: String,
    pub weight_kg: Option<f64>,
    pub size_label: Option<String>,
}
