//! Payment lifecycle: create for a confirmed match, then move through
//! processor outcomes.

use carryshare_core::error::CoreError;
use carryshare_core::match_status::MatchStatus;
use carryshare_core::notification_types::{self, ENTITY_PAYMENT, PAYMENT_INITIATED};
use carryshare_core::payment_status::PaymentStatus;
use carryshare_core::policy::{require_match_participant, require_payment_participant};
use carryshare_core::types::DbId;
use carryshare_core::validation::{
    normalize_currency, validate_amount, validate_external_ref, validate_payment_method,
};
use carryshare_db::models::payment::{CreatePayment, ExternalRefs, Payment, PaymentWithParties};
use carryshare_db::repositories::{MatchRepo, PaymentRepo};
use carryshare_db::{is_unique_violation, DbPool};
use carryshare_events::PlatformEvent;
use serde_json::json;

use super::{Actor, Outcome};
use crate::error::AppError;

/// Constraint allowing at most one payment per match.
const ONE_PER_MATCH_CONSTRAINT: &str = "uq_payments_match_id";

/// Input for [`create`].
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub match_id: DbId,
    pub amount: f64,
    pub currency: String,
    pub payment_method: String,
}

fn duplicate_payment(match_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Match {match_id} already has a payment"
    )))
}

fn concurrent_update(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Payment {id} was modified concurrently; reload and retry"
    )))
}

fn validate_refs(refs: &ExternalRefs) -> Result<(), AppError> {
    validate_external_ref("transactionId", refs.transaction_id.as_deref())
        .and_then(|_| validate_external_ref("paymentIntentId", refs.payment_intent_id.as_deref()))
        .map_err(AppError::validation)
}

fn payload(record: &Payment) -> serde_json::Value {
    json!({
        "paymentId": record.id,
        "matchId": record.match_id,
        "amount": record.amount,
        "currency": record.currency,
        "status": record.status,
    })
}

/// Open a payment for a `CONFIRMED` match.
///
/// Non-participants get `Forbidden` before the match status is checked.
/// The match row stays share-locked until commit, so a concurrent
/// cancellation either waits for the payment or is seen here first.
pub async fn create(
    pool: &DbPool,
    actor: DbId,
    input: NewPayment,
) -> Result<Outcome<Payment>, AppError> {
    validate_amount(input.amount).map_err(AppError::validation)?;
    let currency = normalize_currency(&input.currency).map_err(AppError::validation)?;
    validate_payment_method(&input.payment_method).map_err(AppError::validation)?;

    let mut tx = pool.begin().await?;

    let matched = MatchRepo::find_with_parties_for_share(&mut *tx, input.match_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Match",
            id: input.match_id,
        })?;
    let parties = matched.parties();
    require_match_participant(&parties, actor)?;

    if matched.record.status != MatchStatus::Confirmed {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "Payments can only be created for CONFIRMED matches (match {} is {})",
            input.match_id, matched.record.status
        ))));
    }

    if PaymentRepo::find_by_match(&mut *tx, input.match_id)
        .await?
        .is_some()
    {
        return Err(duplicate_payment(input.match_id));
    }

    let create = CreatePayment {
        user_id: actor,
        match_id: input.match_id,
        amount: input.amount,
        currency,
        payment_method: input.payment_method.trim().to_string(),
    };
    let record = PaymentRepo::create(&mut *tx, &create).await.map_err(|e| {
        if is_unique_violation(&e, ONE_PER_MATCH_CONSTRAINT) {
            duplicate_payment(input.match_id)
        } else {
            AppError::Database(e)
        }
    })?;

    tx.commit().await?;

    tracing::info!(
        payment_id = record.id,
        match_id = record.match_id,
        amount = record.amount,
        currency = %record.currency,
        user_id = actor,
        "Payment created"
    );

    let mut outcome = Outcome::new(record);
    if let Some(recipient) = parties.counterparty_of(actor) {
        let record = &outcome.record;
        let event = PlatformEvent::new(PAYMENT_INITIATED)
            .with_source(ENTITY_PAYMENT, record.id)
            .with_actor(actor)
            .with_recipients([recipient])
            .with_message(format!(
                "A payment of {:.2} {} was initiated for match #{}",
                record.amount, record.currency, record.match_id
            ))
            .with_payload(payload(record));
        outcome = outcome.with_event(event);
    }
    Ok(outcome)
}

async fn load<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: DbId,
) -> Result<PaymentWithParties, AppError> {
    PaymentRepo::find_with_parties(executor, id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::NotFound { entity: "Payment", id }))
}

/// Move a payment to `target`, recording any processor references.
///
/// Users must own the payment or take part in its match. The processor is
/// trusted and may repeat a callback: asking for the status the payment
/// already has is a no-op for it.
pub async fn update_status(
    pool: &DbPool,
    actor: Actor,
    id: DbId,
    target: PaymentStatus,
    refs: ExternalRefs,
) -> Result<Outcome<Payment>, AppError> {
    validate_refs(&refs)?;

    let mut tx = pool.begin().await?;

    let current = load(&mut *tx, id).await?;
    let parties = current.parties();
    if let Actor::User(user_id) = actor {
        require_payment_participant(current.record.user_id, &parties, user_id)?;
    }

    let from = current.record.status;
    if actor == Actor::PaymentProcessor && from == target {
        tracing::debug!(payment_id = id, status = %from, "Repeated processor callback ignored");
        return Ok(Outcome::new(current.record));
    }
    from.validate_transition(target)?;

    let record = match PaymentRepo::update_status(&mut *tx, id, from, target, &refs).await? {
        Some(record) => record,
        None => {
            tracing::warn!(payment_id = id, from = %from, to = %target, "Payment status changed under us");
            return Err(concurrent_update(id));
        }
    };

    tx.commit().await?;

    tracing::info!(
        payment_id = id,
        match_id = record.match_id,
        from = %from,
        to = %target,
        actor = ?actor,
        "Payment status changed"
    );

    let mut outcome = Outcome::new(record);
    if let Some(kind) = notification_types::for_payment_status(target) {
        let recipients = match actor {
            Actor::User(user_id) => parties.others(user_id),
            Actor::PaymentProcessor => vec![parties.package_owner_id, parties.ride_owner_id],
        };
        let record = &outcome.record;
        let mut event = PlatformEvent::new(kind)
            .with_source(ENTITY_PAYMENT, record.id)
            .with_message(format!(
                "Payment #{} for match #{} is now {target}",
                record.id, record.match_id
            ))
            .with_payload(payload(record));
        if let Some(user_id) = actor.user_id() {
            event = event.with_actor(user_id);
        }
        let event = event.with_recipients(recipients);
        if !event.recipients.is_empty() {
            outcome = outcome.with_event(event);
        }
    }
    Ok(outcome)
}

/// Record processor references on a `PENDING` payment without moving it.
pub async fn update_refs(
    pool: &DbPool,
    actor: DbId,
    id: DbId,
    refs: ExternalRefs,
) -> Result<Payment, AppError> {
    if refs.is_empty() {
        return Err(AppError::validation(
            "Nothing to update: send a status or processor references",
        ));
    }
    validate_refs(&refs)?;

    let mut tx = pool.begin().await?;

    let current = load(&mut *tx, id).await?;
    require_payment_participant(current.record.user_id, &current.parties(), actor)?;

    if current.record.status != PaymentStatus::Pending {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "References can only be attached while the payment is PENDING (currently {})",
            current.record.status
        ))));
    }

    let record = PaymentRepo::update_refs(&mut *tx, id, &refs)
        .await?
        .ok_or_else(|| concurrent_update(id))?;

    tx.commit().await?;

    tracing::info!(payment_id = id, user_id = actor, "Payment references recorded");
    Ok(record)
}

/// Fetch a single payment visible to `actor`.
pub async fn get(pool: &DbPool, actor: DbId, id: DbId) -> Result<Payment, AppError> {
    let current = load(pool, id).await?;
    require_payment_participant(current.record.user_id, &current.parties(), actor)?;
    Ok(current.record)
}
