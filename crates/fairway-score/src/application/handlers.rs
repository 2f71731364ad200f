//! Saga handlers for score submission and the completeness check.

use fairway_core::envelope::{HandlerContext, HandlerResult};
use fairway_core::error::HandlerError;
use fairway_core::outcome::{map_operation_result, map_operation_result_scoped};
use fairway_core::topics;

use crate::application::service::ScoreService;
use crate::domain::events::{
    RoundParticipantScoreUpdated, RoundScoreUpdateRequested, RoundScoreUpdateValidated,
    ScoreCompleteness,
};

/// `RoundScoreUpdateRequested` → validate → `RoundScoreUpdateValidated` |
/// `RoundScoreUpdateError`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_score_update_requested(
    service: &dyn ScoreService,
    _ctx: &HandlerContext,
    payload: RoundScoreUpdateRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.validate_score_update(&payload).await?;
    map_operation_result(
        outcome,
        topics::ROUND_SCORE_UPDATE_VALIDATED,
        topics::ROUND_SCORE_UPDATE_ERROR,
    )
}

/// `RoundScoreUpdateValidated` → persist → `RoundParticipantScoreUpdated` |
/// `RoundScoreUpdateError`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_score_update_validated(
    service: &dyn ScoreService,
    _ctx: &HandlerContext,
    payload: RoundScoreUpdateValidated,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let guild_id = payload.guild_id.clone();
    let outcome = service.apply_score(&payload).await?;
    map_operation_result_scoped(
        outcome,
        topics::ROUND_PARTICIPANT_SCORE_UPDATED,
        topics::ROUND_SCORE_UPDATE_ERROR,
        &guild_id,
    )
}

/// `RoundParticipantScoreUpdated` → completeness check →
/// `RoundAllScoresSubmitted` | `RoundScoresPartiallySubmitted` |
/// `RoundFinalizationFailed`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_participant_score_updated(
    service: &dyn ScoreService,
    _ctx: &HandlerContext,
    payload: RoundParticipantScoreUpdated,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service
        .check_completeness(&payload.guild_id, payload.round_id)
        .await?;
    match (outcome.success, outcome.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(ScoreCompleteness::AllSubmitted(all)), None) => Ok(vec![HandlerResult::new(
            topics::ROUND_ALL_SCORES_SUBMITTED,
            &all,
        )]),
        (Some(ScoreCompleteness::Partial(partial)), None) => Ok(vec![HandlerResult::new(
            topics::ROUND_SCORES_PARTIALLY_SUBMITTED,
            &partial,
        )]),
        (None, Some(error)) => Ok(vec![HandlerResult::new(
            topics::ROUND_FINALIZATION_FAILED,
            &error,
        )]),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use fairway_core::domain::{Participant, Round, RoundState, RsvpResponse};
    use fairway_core::envelope::HandlerContext;
    use fairway_core::error::HandlerError;
    use fairway_core::topics;
    use fairway_test_support::{FailingRoundRepository, InMemoryRoundRepository};
    use uuid::Uuid;

    use crate::application::handlers::{
        handle_participant_score_updated, handle_score_update_requested,
        handle_score_update_validated,
    };
    use crate::application::service::ScoreServiceImpl;
    use crate::domain::events::{
        RoundParticipantScoreUpdated, RoundScoreUpdateRequested, RoundScoreUpdateValidated,
    };

    fn in_progress_round(participants: Vec<Participant>) -> Round {
        Round {
            guild_id: "g1".to_owned(),
            round_id: Uuid::new_v4(),
            title: "Saturday round".to_owned(),
            description: None,
            location: None,
            start_time: Utc.with_ymd_and_hms(2026, 6, 2, 9, 0, 0).unwrap(),
            state: RoundState::InProgress,
            created_by: "creator".to_owned(),
            participants,
            event_message_id: None,
            calendar_event_id: None,
        }
    }

    fn player(user_id: &str, response: RsvpResponse, score: Option<i32>) -> Participant {
        Participant {
            user_id: user_id.to_owned(),
            tag_number: None,
            response,
            score,
        }
    }

    fn service_with(repo: InMemoryRoundRepository) -> ScoreServiceImpl {
        ScoreServiceImpl::new(Arc::new(repo))
    }

    fn update_request(round_id: Uuid, user_id: &str, score: i32) -> RoundScoreUpdateRequested {
        RoundScoreUpdateRequested {
            guild_id: "g1".to_owned(),
            round_id,
            user_id: user_id.to_owned(),
            score,
        }
    }

    #[tokio::test]
    async fn test_valid_score_update_is_validated() {
        // Arrange
        let round = in_progress_round(vec![player("u1", RsvpResponse::Accept, None)]);
        let round_id = round.round_id;
        let service = service_with(InMemoryRoundRepository::with_rounds(vec![round]));

        // Act
        let results = handle_score_update_requested(
            &service,
            &HandlerContext::default(),
            update_request(round_id, "u1", -3),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_SCORE_UPDATE_VALIDATED);
        assert_eq!(results[0].payload["score"], -3);
    }

    #[tokio::test]
    async fn test_score_from_non_participant_is_rejected() {
        let round = in_progress_round(vec![player("u1", RsvpResponse::Accept, None)]);
        let round_id = round.round_id;
        let service = service_with(InMemoryRoundRepository::with_rounds(vec![round]));

        let results = handle_score_update_requested(
            &service,
            &HandlerContext::default(),
            update_request(round_id, "stranger", 2),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_SCORE_UPDATE_ERROR);
    }

    #[tokio::test]
    async fn test_score_from_declined_participant_is_rejected() {
        let round = in_progress_round(vec![player("u1", RsvpResponse::Decline, None)]);
        let round_id = round.round_id;
        let service = service_with(InMemoryRoundRepository::with_rounds(vec![round]));

        let results = handle_score_update_requested(
            &service,
            &HandlerContext::default(),
            update_request(round_id, "u1", 2),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_SCORE_UPDATE_ERROR);
    }

    #[tokio::test]
    async fn test_score_against_upcoming_round_is_rejected() {
        let mut round = in_progress_round(vec![player("u1", RsvpResponse::Accept, None)]);
        round.state = RoundState::Upcoming;
        let round_id = round.round_id;
        let service = service_with(InMemoryRoundRepository::with_rounds(vec![round]));

        let results = handle_score_update_requested(
            &service,
            &HandlerContext::default(),
            update_request(round_id, "u1", 2),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_SCORE_UPDATE_ERROR);
    }

    #[tokio::test]
    async fn test_validated_score_is_persisted_and_fanned_out() {
        // Arrange
        let round = in_progress_round(vec![player("u1", RsvpResponse::Accept, None)]);
        let round_id = round.round_id;
        let repo = Arc::new(InMemoryRoundRepository::with_rounds(vec![round]));
        let service = ScoreServiceImpl::new(repo.clone());
        let payload = RoundScoreUpdateValidated {
            guild_id: "g1".to_owned(),
            round_id,
            user_id: "u1".to_owned(),
            score: -3,
        };

        // Act
        let results = handle_score_update_validated(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_PARTICIPANT_SCORE_UPDATED);
        assert_eq!(results[0].guild_scope.as_deref(), Some("g1"));

        let stored = repo.stored_round("g1", round_id).unwrap();
        assert_eq!(stored.participant("u1").unwrap().score, Some(-3));
    }

    #[tokio::test]
    async fn test_replayed_score_update_is_a_plain_overwrite() {
        let round = in_progress_round(vec![player("u1", RsvpResponse::Accept, None)]);
        let round_id = round.round_id;
        let repo = Arc::new(InMemoryRoundRepository::with_rounds(vec![round]));
        let service = ScoreServiceImpl::new(repo.clone());
        let payload = RoundScoreUpdateValidated {
            guild_id: "g1".to_owned(),
            round_id,
            user_id: "u1".to_owned(),
            score: -3,
        };

        handle_score_update_validated(&service, &HandlerContext::default(), payload.clone())
            .await
            .unwrap();
        let results = handle_score_update_validated(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        assert_eq!(results[0].topic, topics::ROUND_PARTICIPANT_SCORE_UPDATED);
        let stored = repo.stored_round("g1", round_id).unwrap();
        assert_eq!(stored.participant("u1").unwrap().score, Some(-3));
    }

    #[tokio::test]
    async fn test_last_score_triggers_all_scores_submitted() {
        // Arrange: every scoring participant has a score; the decline is
        // exempt.
        let round = in_progress_round(vec![
            player("u1", RsvpResponse::Accept, Some(-3)),
            player("u2", RsvpResponse::Tentative, Some(1)),
            player("u3", RsvpResponse::Decline, None),
        ]);
        let round_id = round.round_id;
        let guild_id = round.guild_id.clone();
        let service = service_with(InMemoryRoundRepository::with_rounds(vec![round]));
        let payload = RoundParticipantScoreUpdated {
            guild_id,
            round_id,
            user_id: "u2".to_owned(),
            score: 1,
            participants: vec![],
        };

        // Act
        let results =
            handle_participant_score_updated(&service, &HandlerContext::default(), payload)
                .await
                .unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_ALL_SCORES_SUBMITTED);
        assert_eq!(results[0].payload["round_id"], round_id.to_string());
    }

    #[tokio::test]
    async fn test_outstanding_scores_park_the_round() {
        let round = in_progress_round(vec![
            player("u1", RsvpResponse::Accept, Some(-3)),
            player("u2", RsvpResponse::Accept, None),
            player("u3", RsvpResponse::Tentative, None),
        ]);
        let round_id = round.round_id;
        let guild_id = round.guild_id.clone();
        let service = service_with(InMemoryRoundRepository::with_rounds(vec![round]));
        let payload = RoundParticipantScoreUpdated {
            guild_id,
            round_id,
            user_id: "u1".to_owned(),
            score: -3,
            participants: vec![],
        };

        let results =
            handle_participant_score_updated(&service, &HandlerContext::default(), payload)
                .await
                .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_SCORES_PARTIALLY_SUBMITTED);
        assert_eq!(results[0].payload["remaining"], 2);
    }

    #[tokio::test]
    async fn test_completeness_check_on_missing_round_reports_failure() {
        let service = service_with(InMemoryRoundRepository::new());
        let payload = RoundParticipantScoreUpdated {
            guild_id: "g1".to_owned(),
            round_id: Uuid::new_v4(),
            user_id: "u1".to_owned(),
            score: 0,
            participants: vec![],
        };

        let results =
            handle_participant_score_updated(&service, &HandlerContext::default(), payload)
                .await
                .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_FINALIZATION_FAILED);
    }

    #[tokio::test]
    async fn test_repository_fault_propagates_for_redelivery() {
        let service = ScoreServiceImpl::new(Arc::new(FailingRoundRepository));

        let err = handle_score_update_requested(
            &service,
            &HandlerContext::default(),
            update_request(Uuid::new_v4(), "u1", 2),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HandlerError::Service(_)));
    }
}
