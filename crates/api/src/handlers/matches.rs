//! Handlers for the `/matches` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Listings are
//! always scoped to matches where the caller owns the package or the ride.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use carryshare_core::match_status::MatchStatus;
use carryshare_core::types::DbId;
use carryshare_core::validation::parse_status_list;
use carryshare_db::models::matches::MatchFilter;
use carryshare_db::repositories::MatchRepo;
use carryshare_db::{clamp_limit, clamp_offset};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::lifecycle::matches::{self, Proposal};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /matches`.
#[derive(Debug, Deserialize)]
pub struct MatchListQuery {
    /// Comma-separated status tokens, e.g. `PROPOSED,CONFIRMED`.
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `POST /matches`.
///
/// Ids are optional at the serde level so a missing field is reported as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeMatchRequest {
    pub package_id: Option<DbId>,
    pub ride_id: Option<DbId>,
    pub price: Option<f64>,
    pub proposed_by_user_id: Option<DbId>,
}

/// Body of `PUT /matches`: either a status change or a price revision.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatchRequest {
    pub id: Option<DbId>,
    pub status: Option<String>,
    pub price: Option<f64>,
}

/// Query parameters for `DELETE /matches`.
#[derive(Debug, Deserialize)]
pub struct DeleteMatchQuery {
    pub id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: DbId,
    pub deleted: bool,
}

fn required(field: &str, value: Option<DbId>) -> AppResult<DbId> {
    value.ok_or_else(|| AppError::validation(format!("{field} is required")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/matches
pub async fn list_matches(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<MatchListQuery>,
) -> AppResult<impl IntoResponse> {
    let statuses = parse_status_list::<MatchStatus>(params.status.as_deref())?;

    let filter = MatchFilter {
        user_id: auth.user_id,
        statuses,
        limit: clamp_limit(params.limit),
        offset: clamp_offset(params.offset),
    };
    let items = MatchRepo::list_for_user(&state.pool, &filter).await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/matches/{id}
pub async fn get_match(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = matches::get(&state.pool, auth.user_id, id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/matches
///
/// Propose a match. The counterparty is notified after commit.
pub async fn propose_match(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ProposeMatchRequest>,
) -> AppResult<impl IntoResponse> {
    let proposal = Proposal {
        package_id: required("packageId", input.package_id)?,
        ride_id: required("rideId", input.ride_id)?,
        price: input.price,
        proposed_by_user_id: input.proposed_by_user_id,
    };

    let record = matches::propose(&state.pool, auth.user_id, proposal)
        .await?
        .publish(&state.event_bus);

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// PUT /api/v1/matches
///
/// Move a match to a new status (`{ id, status }`) or revise the proposed
/// price (`{ id, price }`). Sending both in one request is rejected.
pub async fn update_match(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateMatchRequest>,
) -> AppResult<impl IntoResponse> {
    let id = required("id", input.id)?;

    let outcome = match (input.status.as_deref(), input.price) {
        (Some(_), Some(_)) => {
            return Err(AppError::validation(
                "Change either status or price, not both",
            ))
        }
        (Some(raw), None) => {
            let target: MatchStatus = raw.parse()?;
            matches::transition(&state.pool, auth.user_id, id, target).await?
        }
        (None, Some(price)) => matches::update_price(&state.pool, auth.user_id, id, price).await?,
        (None, None) => return Err(AppError::validation("status or price is required")),
    };

    Ok(Json(DataResponse {
        data: outcome.publish(&state.event_bus),
    }))
}

/// DELETE /api/v1/matches?id=
///
/// Withdraw a match that is still PROPOSED or was REJECTED.
pub async fn delete_match(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<DeleteMatchQuery>,
) -> AppResult<impl IntoResponse> {
    let id = required("id", params.id)?;
    matches::delete(&state.pool, auth.user_id, id).await?;

    Ok(Json(DataResponse {
        data: Deleted { id, deleted: true },
    }))
}
