//! Saga handlers for the round lifecycle.
//!
//! Each handler receives one decoded payload, makes exactly one call to the
//! round service, and maps the operation result onto outgoing topics.
//! Expected rejections travel as events; collaborator faults propagate as
//! errors so the dispatcher leaves the message for redelivery.

use fairway_core::envelope::{HandlerContext, HandlerResult, EVENT_MESSAGE_ID_KEY};
use fairway_core::error::HandlerError;
use fairway_core::outcome::{map_operation_result, map_operation_result_scoped};
use fairway_core::topics;

use crate::application::service::RoundService;
use crate::domain::events::{
    RoundAllScoresSubmitted, RoundCreationRequested, RoundDeleteAuthorized, RoundDeleteRequested,
    RoundDeleteValidated, RoundEntityCreated, RoundFinalized, RoundStartRequested,
    RoundUpdateRequested, RoundUpdateValidated, RoundUpdated,
};

/// `RoundCreationRequested` → validate → `RoundEntityCreated` |
/// `RoundValidationFailed`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_round_creation_requested(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundCreationRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.validate_creation(&payload).await?;
    map_operation_result(outcome, topics::ROUND_ENTITY_CREATED, topics::ROUND_VALIDATION_FAILED)
}

/// `RoundEntityCreated` → persist → `RoundCreated` | `RoundCreationFailed`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_round_entity_created(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundEntityCreated,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let guild_id = payload.round.guild_id.clone();
    let outcome = service.store_round(&payload).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_CREATED,
        topics::ROUND_CREATION_FAILED,
        &guild_id,
    )
}

/// `RoundUpdateRequested` → validate → `RoundUpdateValidated` |
/// `RoundUpdateError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_round_update_requested(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundUpdateRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.validate_update(&payload).await?;
    map_operation_result(outcome, topics::ROUND_UPDATE_VALIDATED, topics::ROUND_UPDATE_ERROR)
}

/// `RoundUpdateValidated` → persist → `RoundUpdated`, plus
/// `RoundScheduleUpdated` iff the start time changed.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_round_update_validated(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundUpdateValidated,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.apply_update(&payload).await?;
    match (outcome.success, outcome.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(applied), None) => {
            let updated = RoundUpdated {
                round: applied.round.clone(),
            };
            let mut results = vec![
                HandlerResult::new(topics::ROUND_UPDATED, &updated)
                    .guild_scoped(&applied.round.guild_id),
            ];
            if applied.schedule_changed {
                let rescheduled = crate::domain::events::RoundScheduleUpdated {
                    guild_id: applied.round.guild_id.clone(),
                    round_id: applied.round.round_id,
                    start_time: applied.round.start_time,
                };
                results.push(HandlerResult::new(topics::ROUND_SCHEDULE_UPDATED, &rescheduled));
            }
            Ok(results)
        }
        (None, Some(error)) => Ok(vec![HandlerResult::new(topics::ROUND_UPDATE_ERROR, &error)]),
    }
}

/// `RoundDeleteRequested` → authorize → `RoundDeleteValidated` |
/// `RoundDeleteError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_round_delete_requested(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundDeleteRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.authorize_delete(&payload).await?;
    map_operation_result(outcome, topics::ROUND_DELETE_VALIDATED, topics::ROUND_DELETE_ERROR)
}

/// `RoundDeleteValidated` → `RoundDeleteAuthorized`. Pure pass-through; no
/// collaborator call. Inbound metadata (including any presentation message
/// reference) rides along on the outgoing envelope.
///
/// # Errors
///
/// Infallible; the signature matches the handler contract.
pub async fn handle_round_delete_validated(
    _ctx: &HandlerContext,
    payload: RoundDeleteValidated,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let authorized = RoundDeleteAuthorized {
        guild_id: payload.guild_id,
        round_id: payload.round_id,
    };
    Ok(vec![HandlerResult::new(topics::ROUND_DELETE_AUTHORIZED, &authorized)])
}

/// `RoundDeleteAuthorized` → soft-delete → `RoundDeleted` |
/// `RoundDeleteError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_round_delete_authorized(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundDeleteAuthorized,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let guild_id = payload.guild_id.clone();
    let outcome = service.soft_delete(&payload).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_DELETED,
        topics::ROUND_DELETE_ERROR,
        &guild_id,
    )
}

/// `RoundStartRequested` → process start → `DiscordRoundStart`. Terminal
/// hand-off to presentation; no further backend state. The contract has no
/// failure topic for start, so a round that can never start (finalized or
/// deleted) produces no results at all.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_round_start_requested(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundStartRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let Some(start) = service.process_start(&payload).await? else {
        return Ok(vec![]);
    };
    Ok(vec![HandlerResult::new(topics::DISCORD_ROUND_START, &start)])
}

/// `RoundAllScoresSubmitted` → finalize → on success, two results: the
/// presentation-facing finalization (carrying the round's event-message
/// reference as metadata) and the backend finalization record, both
/// dual-published to the guild-scoped topics. On failure,
/// `RoundFinalizationError`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_round_all_scores_submitted(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundAllScoresSubmitted,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.finalize(&payload).await?;
    match (outcome.success, outcome.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(finalized), None) => {
            let mut presentation =
                HandlerResult::new(topics::DISCORD_ROUND_FINALIZED, &finalized)
                    .guild_scoped(&finalized.guild_id);
            if let Some(message_id) = &finalized.round.event_message_id {
                presentation = presentation.with_metadata(EVENT_MESSAGE_ID_KEY, message_id);
            }
            let backend = HandlerResult::new(topics::ROUND_FINALIZED, &finalized)
                .guild_scoped(&finalized.guild_id);
            Ok(vec![presentation, backend])
        }
        (None, Some(error)) => Ok(vec![
            HandlerResult::new(topics::ROUND_FINALIZATION_ERROR, &error),
        ]),
    }
}

/// `RoundFinalized` → notify scoring collaborator →
/// `ProcessRoundScoresRequested` | `RoundFinalizationError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_round_finalized(
    service: &dyn RoundService,
    _ctx: &HandlerContext,
    payload: RoundFinalized,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.build_score_processing(&payload).await?;
    map_operation_result(
        outcome,
        topics::PROCESS_ROUND_SCORES_REQUESTED,
        topics::ROUND_FINALIZATION_ERROR,
    )
}
