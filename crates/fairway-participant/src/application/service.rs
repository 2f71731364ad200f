//! Participant service — the single collaborator each join handler calls.

use std::sync::Arc;

use async_trait::async_trait;
use fairway_core::domain::{Participant, RoundState, RsvpResponse};
use fairway_core::error::{RepositoryError, ServiceError};
use fairway_core::outcome::OperationResult;
use fairway_core::repository::RoundRepository;
use tracing::{info, warn};

use crate::domain::events::{
    JoinRouting, ParticipantJoinError, ParticipantJoinRequested, ParticipantJoinValidated,
    ParticipantJoinValidationRequested, ParticipantRemovalError, ParticipantRemovalRequested,
    ParticipantStatusUpdateRequested, RoundParticipantJoined, RoundParticipantRemoved,
};

/// Collaborator contract for the participant join saga.
#[async_trait]
pub trait ParticipantService: Send + Sync {
    /// Routes an inbound join request: withdrawal, validation, or rejection.
    async fn check_join_intent(
        &self,
        request: &ParticipantJoinRequested,
    ) -> Result<OperationResult<JoinRouting, ParticipantJoinError>, ServiceError>;

    /// Validates a routed join request against the round's state.
    async fn validate_join(
        &self,
        request: &ParticipantJoinValidationRequested,
    ) -> Result<OperationResult<ParticipantJoinValidated, ParticipantJoinError>, ServiceError>;

    /// Persists a participant status update. Shared by the decline
    /// short-circuit and all tag lookup resumptions.
    async fn apply_participant_update(
        &self,
        request: &ParticipantStatusUpdateRequested,
    ) -> Result<OperationResult<RoundParticipantJoined, ParticipantJoinError>, ServiceError>;

    /// Removes a participant from a round.
    async fn remove_participant(
        &self,
        request: &ParticipantRemovalRequested,
    ) -> Result<OperationResult<RoundParticipantRemoved, ParticipantRemovalError>, ServiceError>;
}

/// Production implementation over the round repository.
pub struct ParticipantServiceImpl {
    repo: Arc<dyn RoundRepository>,
}

impl ParticipantServiceImpl {
    /// Creates a service over `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn RoundRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ParticipantService for ParticipantServiceImpl {
    async fn check_join_intent(
        &self,
        request: &ParticipantJoinRequested,
    ) -> Result<OperationResult<JoinRouting, ParticipantJoinError>, ServiceError> {
        let round = match self.repo.fetch_round(&request.guild_id, request.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return Ok(OperationResult::failure(ParticipantJoinError {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    error: "round not found".to_owned(),
                }));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };

        // A decline from someone already on the roster is a withdrawal.
        let withdrawing = request.response == RsvpResponse::Decline
            && round
                .participant(&request.user_id)
                .is_some_and(|p| p.response != RsvpResponse::Decline);
        if withdrawing {
            return Ok(OperationResult::success(JoinRouting::Withdraw(
                ParticipantRemovalRequested {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                },
            )));
        }
        Ok(OperationResult::success(JoinRouting::Validate(
            ParticipantJoinValidationRequested {
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
                user_id: request.user_id.clone(),
                response: request.response,
                joined_late: request.joined_late,
            },
        )))
    }

    async fn validate_join(
        &self,
        request: &ParticipantJoinValidationRequested,
    ) -> Result<OperationResult<ParticipantJoinValidated, ParticipantJoinError>, ServiceError> {
        let round = match self.repo.fetch_round(&request.guild_id, request.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return Ok(OperationResult::failure(ParticipantJoinError {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    error: "round not found".to_owned(),
                }));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };
        if !round.state.is_open() {
            warn!(
                guild_id = %request.guild_id,
                round_id = %request.round_id,
                user_id = %request.user_id,
                state = ?round.state,
                "join rejected, round not open"
            );
            return Ok(OperationResult::failure(ParticipantJoinError {
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
                user_id: request.user_id.clone(),
                error: "round is not open for joining".to_owned(),
            }));
        }

        let joined_late = request
            .joined_late
            .unwrap_or(round.state == RoundState::InProgress);
        Ok(OperationResult::success(ParticipantJoinValidated {
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            user_id: request.user_id.clone(),
            response: request.response,
            joined_late,
        }))
    }

    async fn apply_participant_update(
        &self,
        request: &ParticipantStatusUpdateRequested,
    ) -> Result<OperationResult<RoundParticipantJoined, ParticipantJoinError>, ServiceError> {
        let round = match self.repo.fetch_round(&request.guild_id, request.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return Ok(OperationResult::failure(ParticipantJoinError {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    error: "round not found".to_owned(),
                }));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };
        if !round.state.is_open() {
            return Ok(OperationResult::failure(ParticipantJoinError {
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
                user_id: request.user_id.clone(),
                error: "round is not open for joining".to_owned(),
            }));
        }

        // An already-resolved tag number is never contradicted by a later
        // absent one; the existing score survives an RSVP change.
        let existing = round.participant(&request.user_id);
        let participant = Participant {
            user_id: request.user_id.clone(),
            tag_number: request
                .tag_number
                .or_else(|| existing.and_then(|p| p.tag_number)),
            response: request.response,
            score: existing.and_then(|p| p.score),
        };
        let updated = self
            .repo
            .upsert_participant(&request.guild_id, request.round_id, participant)
            .await
            .map_err(ServiceError::Repository)?;
        info!(
            guild_id = %request.guild_id,
            round_id = %request.round_id,
            user_id = %request.user_id,
            response = ?request.response,
            "participant status persisted"
        );
        Ok(OperationResult::success(RoundParticipantJoined {
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            participants: updated.participants,
            joined_late: request.joined_late,
        }))
    }

    async fn remove_participant(
        &self,
        request: &ParticipantRemovalRequested,
    ) -> Result<OperationResult<RoundParticipantRemoved, ParticipantRemovalError>, ServiceError>
    {
        match self
            .repo
            .remove_participant(&request.guild_id, request.round_id, &request.user_id)
            .await
        {
            Ok(round) => {
                info!(
                    guild_id = %request.guild_id,
                    round_id = %request.round_id,
                    user_id = %request.user_id,
                    "participant removed"
                );
                Ok(OperationResult::success(RoundParticipantRemoved {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    participants: round.participants,
                }))
            }
            // Redelivery: already removed.
            Err(RepositoryError::NoRowsAffected) => {
                let round = self
                    .repo
                    .fetch_round(&request.guild_id, request.round_id)
                    .await
                    .map_err(ServiceError::Repository)?;
                Ok(OperationResult::success(RoundParticipantRemoved {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    participants: round.participants,
                }))
            }
            Err(RepositoryError::RoundNotFound { .. }) => {
                Ok(OperationResult::failure(ParticipantRemovalError {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    error: "round not found".to_owned(),
                }))
            }
            Err(e) => Err(ServiceError::Repository(e)),
        }
    }
}
