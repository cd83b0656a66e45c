//! Handlers for the `/payments` resource.
//!
//! User-facing endpoints require authentication via [`AuthUser`]. The
//! processor callback at `/payments/webhook` authenticates with an HMAC
//! signature over the raw body instead.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use carryshare_core::error::CoreError;
use carryshare_core::payment_status::PaymentStatus;
use carryshare_core::types::DbId;
use carryshare_core::validation::parse_status_list;
use carryshare_core::webhook::{verify_signature, SIGNATURE_HEADER};
use carryshare_db::models::payment::{ExternalRefs, PaymentFilter};
use carryshare_db::repositories::PaymentRepo;
use carryshare_db::{clamp_limit, clamp_offset};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::lifecycle::payments::{self, NewPayment};
use crate::lifecycle::Actor;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / query types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /payments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListQuery {
    pub status: Option<String>,
    pub match_id: Option<DbId>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Body of `POST /payments`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub match_id: Option<DbId>,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub payment_method: Option<String>,
}

/// Body of `PUT /payments`.
///
/// Without `status`, only the processor references are recorded.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub id: Option<DbId>,
    pub status: Option<String>,
    pub transaction_id: Option<String>,
    pub payment_intent_id: Option<String>,
}

/// Body of the processor callback.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhook {
    pub payment_id: DbId,
    pub status: String,
    pub transaction_id: Option<String>,
    pub payment_intent_id: Option<String>,
}

fn required<T>(field: &str, value: Option<T>) -> AppResult<T> {
    value.ok_or_else(|| AppError::validation(format!("{field} is required")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/payments
pub async fn list_payments(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<PaymentListQuery>,
) -> AppResult<impl IntoResponse> {
    let statuses = parse_status_list::<PaymentStatus>(params.status.as_deref())?;

    let filter = PaymentFilter {
        user_id: auth.user_id,
        statuses,
        match_id: params.match_id,
        limit: clamp_limit(params.limit),
        offset: clamp_offset(params.offset),
    };
    let items = PaymentRepo::list_for_user(&state.pool, &filter).await?;

    Ok(Json(DataResponse { data: items }))
}

/// GET /api/v1/payments/{id}
pub async fn get_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let record = payments::get(&state.pool, auth.user_id, id).await?;
    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/payments
///
/// Open a PENDING payment for a CONFIRMED match.
pub async fn create_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let new_payment = NewPayment {
        match_id: required("matchId", input.match_id)?,
        amount: required("amount", input.amount)?,
        currency: required("currency", input.currency)?,
        payment_method: required("paymentMethod", input.payment_method)?,
    };

    let record = payments::create(&state.pool, auth.user_id, new_payment)
        .await?
        .publish(&state.event_bus);

    Ok((StatusCode::CREATED, Json(DataResponse { data: record })))
}

/// PUT /api/v1/payments
pub async fn update_payment(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdatePaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let id = required("id", input.id)?;
    let refs = ExternalRefs {
        transaction_id: input.transaction_id,
        payment_intent_id: input.payment_intent_id,
    };

    let record = match input.status.as_deref() {
        Some(raw) => {
            let target: PaymentStatus = raw.parse()?;
            payments::update_status(&state.pool, Actor::User(auth.user_id), id, target, refs)
                .await?
                .publish(&state.event_bus)
        }
        None => payments::update_refs(&state.pool, auth.user_id, id, refs).await?,
    };

    Ok(Json(DataResponse { data: record }))
}

/// POST /api/v1/payments/webhook
///
/// Processor callback. The `X-Signature` header must carry the hex
/// HMAC-SHA256 of the raw body under `PAYMENT_WEBHOOK_SECRET`; every call is
/// refused while that secret is unset.
pub async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let secret = state
        .config
        .payment_webhook_secret
        .as_deref()
        .ok_or_else(|| {
            tracing::warn!("Payment webhook called but PAYMENT_WEBHOOK_SECRET is not set");
            CoreError::Forbidden("Payment webhook is disabled".into())
        })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_signature(secret, &body, signature) {
        tracing::warn!("Payment webhook rejected: bad signature");
        return Err(CoreError::Forbidden("Invalid webhook signature".into()).into());
    }

    let callback: PaymentWebhook = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook body: {e}")))?;
    let target: PaymentStatus = callback.status.parse()?;
    let refs = ExternalRefs {
        transaction_id: callback.transaction_id,
        payment_intent_id: callback.payment_intent_id,
    };

    let record = payments::update_status(
        &state.pool,
        Actor::PaymentProcessor,
        callback.payment_id,
        target,
        refs,
    )
    .await?
    .publish(&state.event_bus);

    Ok(Json(DataResponse { data: record }))
}
