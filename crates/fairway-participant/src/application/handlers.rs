//! Saga handlers for the participant join flow.
//!
//! The tag lookup round-trip is fire-and-forget: the validation handler
//! publishes the lookup request and returns; one of the three resumption
//! handlers runs later, as its own invocation, when the ranking service
//! answers. Every field a resumption needs travels in the request payload.

use fairway_core::domain::RsvpResponse;
use fairway_core::envelope::{HandlerContext, HandlerResult};
use fairway_core::error::HandlerError;
use fairway_core::outcome::map_operation_result_scoped;
use fairway_core::topics;
use tracing::warn;

use crate::application::service::ParticipantService;
use crate::domain::events::{
    JoinRouting, ParticipantJoinRequested, ParticipantJoinValidationRequested,
    ParticipantRemovalRequested, ParticipantStatusUpdateRequested, RoundTagLookupFailed,
    RoundTagLookupFound, RoundTagLookupNotFound, RoundTagLookupRequested,
};

/// `ParticipantJoinRequested` → check status → `ParticipantRemovalRequested`
/// | `ParticipantJoinValidationRequested` | `RoundParticipantJoinError`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_participant_join_requested(
    service: &dyn ParticipantService,
    _ctx: &HandlerContext,
    payload: ParticipantJoinRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.check_join_intent(&payload).await?;
    match (outcome.success, outcome.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(JoinRouting::Withdraw(removal)), None) => Ok(vec![HandlerResult::new(
            topics::PARTICIPANT_REMOVAL_REQUESTED,
            &removal,
        )]),
        (Some(JoinRouting::Validate(validation)), None) => Ok(vec![HandlerResult::new(
            topics::PARTICIPANT_JOIN_VALIDATION_REQUESTED,
            &validation,
        )]),
        (None, Some(error)) => Ok(vec![HandlerResult::new(
            topics::ROUND_PARTICIPANT_JOIN_ERROR,
            &error,
        )]),
    }
}

/// `ParticipantJoinValidationRequested` → validate → on success, either the
/// decline short-circuit (straight to a status update) or the tag lookup
/// request carrying full resumption context. On failure,
/// `RoundParticipantJoinError`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_join_validation_requested(
    service: &dyn ParticipantService,
    _ctx: &HandlerContext,
    payload: ParticipantJoinValidationRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.validate_join(&payload).await?;
    match (outcome.success, outcome.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(validated), None) => {
            // Declines need no ranking data; skip the external round-trip.
            if validated.response == RsvpResponse::Decline {
                let update = ParticipantStatusUpdateRequested {
                    guild_id: validated.guild_id,
                    round_id: validated.round_id,
                    user_id: validated.user_id,
                    response: validated.response,
                    tag_number: None,
                    joined_late: Some(validated.joined_late),
                };
                return Ok(vec![HandlerResult::new(
                    topics::PARTICIPANT_STATUS_UPDATE_REQUESTED,
                    &update,
                )]);
            }
            let lookup = RoundTagLookupRequested {
                guild_id: validated.guild_id,
                round_id: validated.round_id,
                user_id: validated.user_id,
                response: validated.response,
                joined_late: validated.joined_late,
            };
            Ok(vec![HandlerResult::new(
                topics::ROUND_TAG_LOOKUP_REQUESTED,
                &lookup,
            )])
        }
        (None, Some(error)) => Ok(vec![HandlerResult::new(
            topics::ROUND_PARTICIPANT_JOIN_ERROR,
            &error,
        )]),
    }
}

/// `RoundTagLookupFound` → apply update with the resolved tag →
/// `RoundParticipantJoined` | `RoundParticipantJoinError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_tag_lookup_found(
    service: &dyn ParticipantService,
    _ctx: &HandlerContext,
    payload: RoundTagLookupFound,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let guild_id = payload.guild_id.clone();
    let update = ParticipantStatusUpdateRequested {
        guild_id: payload.guild_id,
        round_id: payload.round_id,
        user_id: payload.user_id,
        response: payload.original_response,
        tag_number: Some(payload.tag_number),
        joined_late: payload.joined_late,
    };
    let outcome = service.apply_participant_update(&update).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_PARTICIPANT_JOINED,
        topics::ROUND_PARTICIPANT_JOIN_ERROR,
        &guild_id,
    )
}

/// `RoundTagLookupNotFound` → apply update with no tag (graceful
/// degradation) → `RoundParticipantJoined` | `RoundParticipantJoinError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_tag_lookup_not_found(
    service: &dyn ParticipantService,
    _ctx: &HandlerContext,
    payload: RoundTagLookupNotFound,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let guild_id = payload.guild_id.clone();
    let update = ParticipantStatusUpdateRequested {
        guild_id: payload.guild_id,
        round_id: payload.round_id,
        user_id: payload.user_id,
        response: payload.original_response,
        tag_number: None,
        joined_late: payload.joined_late,
    };
    let outcome = service.apply_participant_update(&update).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_PARTICIPANT_JOINED,
        topics::ROUND_PARTICIPANT_JOIN_ERROR,
        &guild_id,
    )
}

/// `RoundTagLookupFailed` → when round and user are known, degrade
/// gracefully and apply the update with no tag rather than blocking the
/// join; when both are missing the message is poison and yields zero
/// results.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_tag_lookup_failed(
    service: &dyn ParticipantService,
    _ctx: &HandlerContext,
    payload: RoundTagLookupFailed,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let Some(round_id) = payload.round_id.filter(|id| !id.is_nil()) else {
        warn!(reason = %payload.reason, "tag lookup failure without a round id, dropping");
        return Ok(vec![]);
    };
    if payload.user_id.is_empty() {
        warn!(reason = %payload.reason, "tag lookup failure without a user id, dropping");
        return Ok(vec![]);
    }

    let guild_id = payload.guild_id.clone();
    let update = ParticipantStatusUpdateRequested {
        guild_id: payload.guild_id,
        round_id,
        user_id: payload.user_id,
        response: payload.original_response.unwrap_or(RsvpResponse::Accept),
        tag_number: None,
        joined_late: payload.joined_late,
    };
    let outcome = service.apply_participant_update(&update).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_PARTICIPANT_JOINED,
        topics::ROUND_PARTICIPANT_JOIN_ERROR,
        &guild_id,
    )
}

/// `ParticipantStatusUpdateRequested` → persist → `RoundParticipantJoined` |
/// `RoundParticipantJoinError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_status_update_requested(
    service: &dyn ParticipantService,
    _ctx: &HandlerContext,
    payload: ParticipantStatusUpdateRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let guild_id = payload.guild_id.clone();
    let outcome = service.apply_participant_update(&payload).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_PARTICIPANT_JOINED,
        topics::ROUND_PARTICIPANT_JOIN_ERROR,
        &guild_id,
    )
}

/// `ParticipantRemovalRequested` → remove → `RoundParticipantRemoved` |
/// `RoundParticipantRemovalError`.
///
/// # Errors
///
/// Propagates collaborator faults for redelivery.
pub async fn handle_removal_requested(
    service: &dyn ParticipantService,
    _ctx: &HandlerContext,
    payload: ParticipantRemovalRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let guild_id = payload.guild_id.clone();
    let outcome = service.remove_participant(&payload).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_PARTICIPANT_REMOVED,
        topics::ROUND_PARTICIPANT_REMOVAL_ERROR,
        &guild_id,
    )
}
