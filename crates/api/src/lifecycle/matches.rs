//! Match lifecycle: propose, transition, revise price, delete.

use carryshare_core::error::CoreError;
use carryshare_core::match_status::MatchStatus;
use carryshare_core::notification_types::{
    ENTITY_MATCH, MATCH_PRICE_CHANGED, MATCH_PROPOSED, MATCH_STATUS_CHANGED,
};
use carryshare_core::policy::{require_match_participant, MatchParties};
use carryshare_core::types::DbId;
use carryshare_core::validation::validate_price;
use carryshare_db::models::matches::{CreateMatch, Match, MatchWithParties};
use carryshare_db::repositories::{MatchRepo, PackageRepo, RideRepo};
use carryshare_db::{is_unique_violation, DbPool};
use carryshare_events::PlatformEvent;
use serde_json::json;

use super::Outcome;
use crate::error::AppError;

/// Constraint guarding one live match per package/ride pair.
const LIVE_PAIR_CONSTRAINT: &str = "uq_matches_live_pair";

/// Input for [`propose`].
#[derive(Debug, Clone)]
pub struct Proposal {
    pub package_id: DbId,
    pub ride_id: DbId,
    pub price: Option<f64>,
    /// Defaults to the acting user.
    pub proposed_by_user_id: Option<DbId>,
}

fn duplicate_pair(package_id: DbId, ride_id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "A live match already exists for package {package_id} and ride {ride_id}"
    )))
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Match", id })
}

fn concurrent_update(id: DbId) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "Match {id} was modified concurrently; reload and retry"
    )))
}

/// Event for the other side of the match, if there is one.
fn counterparty_event(
    kind: &str,
    parties: &MatchParties,
    actor: DbId,
    record: &Match,
    message: String,
) -> Option<PlatformEvent> {
    let recipient = parties.counterparty_of(actor)?;
    Some(
        PlatformEvent::new(kind)
            .with_source(ENTITY_MATCH, record.id)
            .with_actor(actor)
            .with_recipients([recipient])
            .with_message(message)
            .with_payload(json!({
                "matchId": record.id,
                "packageId": record.package_id,
                "rideId": record.ride_id,
                "status": record.status,
                "price": record.price,
            })),
    )
}

fn with_optional_event<T>(outcome: Outcome<T>, event: Option<PlatformEvent>) -> Outcome<T> {
    match event {
        Some(event) => outcome.with_event(event),
        None => outcome,
    }
}

/// Propose a match between a package and a ride.
///
/// Only the package owner or the ride owner may propose, and the recorded
/// proposer must be one of them too.
pub async fn propose(
    pool: &DbPool,
    actor: DbId,
    proposal: Proposal,
) -> Result<Outcome<Match>, AppError> {
    validate_price(proposal.price).map_err(AppError::validation)?;

    let mut tx = pool.begin().await?;

    let package = PackageRepo::find_by_id(&mut *tx, proposal.package_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Package",
            id: proposal.package_id,
        })?;
    let ride = RideRepo::find_by_id(&mut *tx, proposal.ride_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Ride",
            id: proposal.ride_id,
        })?;

    let parties = MatchParties::new(package.owner_id, ride.owner_id);
    require_match_participant(&parties, actor)?;

    let proposer = proposal.proposed_by_user_id.unwrap_or(actor);
    if proposer != actor {
        require_match_participant(&parties, proposer)?;
    }

    if MatchRepo::find_live_for_pair(&mut *tx, package.id, ride.id)
        .await?
        .is_some()
    {
        return Err(duplicate_pair(package.id, ride.id));
    }

    let input = CreateMatch {
        package_id: package.id,
        ride_id: ride.id,
        price: proposal.price,
        proposed_by_user_id: proposer,
    };
    let record = MatchRepo::create(&mut *tx, &input).await.map_err(|e| {
        if is_unique_violation(&e, LIVE_PAIR_CONSTRAINT) {
            duplicate_pair(package.id, ride.id)
        } else {
            AppError::Database(e)
        }
    })?;

    tx.commit().await?;

    tracing::info!(
        match_id = record.id,
        package_id = record.package_id,
        ride_id = record.ride_id,
        user_id = actor,
        "Match proposed"
    );

    let message = match record.price {
        Some(price) => format!(
            "New transport proposal for package #{} on ride #{} at {price:.2}",
            record.package_id, record.ride_id
        ),
        None => format!(
            "New transport proposal for package #{} on ride #{}",
            record.package_id, record.ride_id
        ),
    };
    let event = counterparty_event(MATCH_PROPOSED, &parties, actor, &record, message);
    Ok(with_optional_event(Outcome::new(record), event))
}

/// Load a match with its parties, failing with `NotFound`.
async fn load<'e>(
    executor: impl sqlx::PgExecutor<'e>,
    id: DbId,
) -> Result<MatchWithParties, AppError> {
    MatchRepo::find_with_parties(executor, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// Move a match to `target`.
///
/// Either participant may request any edge of the transition table. A
/// concurrent writer that changed the status first makes this a `Conflict`.
pub async fn transition(
    pool: &DbPool,
    actor: DbId,
    id: DbId,
    target: MatchStatus,
) -> Result<Outcome<Match>, AppError> {
    let mut tx = pool.begin().await?;

    let current = load(&mut *tx, id).await?;
    let parties = current.parties();
    require_match_participant(&parties, actor)?;

    let from = current.record.status;
    from.validate_transition(target)?;

    let record = match MatchRepo::update_status(&mut *tx, id, from, target).await? {
        Some(record) => record,
        None => {
            tracing::warn!(match_id = id, from = %from, to = %target, "Match status changed under us");
            return Err(concurrent_update(id));
        }
    };

    tx.commit().await?;

    tracing::info!(
        match_id = id,
        from = %from,
        to = %target,
        user_id = actor,
        "Match status changed"
    );

    let message = format!("Match #{id} is now {target}");
    let event = counterparty_event(MATCH_STATUS_CHANGED, &parties, actor, &record, message);
    Ok(with_optional_event(Outcome::new(record), event))
}

/// Revise the proposed price while the match is still `PROPOSED`.
pub async fn update_price(
    pool: &DbPool,
    actor: DbId,
    id: DbId,
    price: f64,
) -> Result<Outcome<Match>, AppError> {
    validate_price(Some(price)).map_err(AppError::validation)?;

    let mut tx = pool.begin().await?;

    let current = load(&mut *tx, id).await?;
    let parties = current.parties();
    require_match_participant(&parties, actor)?;

    if current.record.status != MatchStatus::Proposed {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "Price can only change while the match is PROPOSED (currently {})",
            current.record.status
        ))));
    }

    let record = MatchRepo::update_price(&mut *tx, id, Some(price))
        .await?
        .ok_or_else(|| concurrent_update(id))?;

    tx.commit().await?;

    tracing::info!(match_id = id, price, user_id = actor, "Match price revised");

    let message = format!("The proposed price for match #{id} is now {price:.2}");
    let event = counterparty_event(MATCH_PRICE_CHANGED, &parties, actor, &record, message);
    Ok(with_optional_event(Outcome::new(record), event))
}

/// Hard-delete a match that never went live or was rejected.
pub async fn delete(pool: &DbPool, actor: DbId, id: DbId) -> Result<(), AppError> {
    let mut tx = pool.begin().await?;

    let current = load(&mut *tx, id).await?;
    require_match_participant(&current.parties(), actor)?;

    let status = current.record.status;
    if !status.is_deletable() {
        return Err(AppError::Core(CoreError::InvalidState(format!(
            "Only PROPOSED or REJECTED matches can be deleted (currently {status})"
        ))));
    }

    if !MatchRepo::delete(&mut *tx, id, status).await? {
        return Err(concurrent_update(id));
    }

    tx.commit().await?;

    tracing::info!(match_id = id, status = %status, user_id = actor, "Match deleted");
    Ok(())
}

/// Fetch a single match visible to `actor`.
pub async fn get(pool: &DbPool, actor: DbId, id: DbId) -> Result<Match, AppError> {
    let current = load(pool, id).await?;
    require_match_participant(&current.parties(), actor)?;
    Ok(current.record)
}
