//! Score service — the single collaborator each score handler calls.

use std::sync::Arc;

use async_trait::async_trait;
use fairway_core::domain::RoundState;
use fairway_core::error::{RepositoryError, ServiceError};
use fairway_core::outcome::OperationResult;
use fairway_core::repository::RoundRepository;
use fairway_round::domain::events::{RoundAllScoresSubmitted, RoundFinalizationError};
use tracing::info;
use uuid::Uuid;

use crate::domain::events::{
    RoundParticipantScoreUpdated, RoundScoreUpdateError, RoundScoreUpdateRequested,
    RoundScoreUpdateValidated, RoundScoresPartiallySubmitted, ScoreCompleteness,
};

/// Collaborator contract for the score saga.
#[async_trait]
pub trait ScoreService: Send + Sync {
    /// Validates a score update against the round and its roster.
    async fn validate_score_update(
        &self,
        request: &RoundScoreUpdateRequested,
    ) -> Result<OperationResult<RoundScoreUpdateValidated, RoundScoreUpdateError>, ServiceError>;

    /// Persists a validated score.
    async fn apply_score(
        &self,
        request: &RoundScoreUpdateValidated,
    ) -> Result<OperationResult<RoundParticipantScoreUpdated, RoundScoreUpdateError>, ServiceError>;

    /// Decides whether every expected score is in. Shared by the score saga
    /// and the import pipeline's apply step.
    async fn check_completeness(
        &self,
        guild_id: &str,
        round_id: Uuid,
    ) -> Result<OperationResult<ScoreCompleteness, RoundFinalizationError>, ServiceError>;
}

/// Production implementation over the round repository.
pub struct ScoreServiceImpl {
    repo: Arc<dyn RoundRepository>,
}

impl ScoreServiceImpl {
    /// Creates a service over `repo`.
    #[must_use]
    pub fn new(repo: Arc<dyn RoundRepository>) -> Self {
        Self { repo }
    }

    fn rejection(
        request: &RoundScoreUpdateRequested,
        error: &str,
    ) -> OperationResult<RoundScoreUpdateValidated, RoundScoreUpdateError> {
        OperationResult::failure(RoundScoreUpdateError {
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            user_id: request.user_id.clone(),
            error: error.to_owned(),
        })
    }
}

#[async_trait]
impl ScoreService for ScoreServiceImpl {
    async fn validate_score_update(
        &self,
        request: &RoundScoreUpdateRequested,
    ) -> Result<OperationResult<RoundScoreUpdateValidated, RoundScoreUpdateError>, ServiceError>
    {
        let round = match self.repo.fetch_round(&request.guild_id, request.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return Ok(Self::rejection(request, "round not found"));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };
        if round.state != RoundState::InProgress {
            return Ok(Self::rejection(request, "round is not in progress"));
        }
        let Some(participant) = round.participant(&request.user_id) else {
            return Ok(Self::rejection(
                request,
                "user is not a participant in this round",
            ));
        };
        if !participant.response.expects_score() {
            return Ok(Self::rejection(
                request,
                "a declined participant cannot submit a score",
            ));
        }

        Ok(OperationResult::success(RoundScoreUpdateValidated {
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            user_id: request.user_id.clone(),
            score: request.score,
        }))
    }

    async fn apply_score(
        &self,
        request: &RoundScoreUpdateValidated,
    ) -> Result<OperationResult<RoundParticipantScoreUpdated, RoundScoreUpdateError>, ServiceError>
    {
        match self
            .repo
            .record_score(&request.guild_id, request.round_id, &request.user_id, request.score)
            .await
        {
            Ok(round) => {
                info!(
                    guild_id = %request.guild_id,
                    round_id = %request.round_id,
                    user_id = %request.user_id,
                    score = request.score,
                    "score persisted"
                );
                Ok(OperationResult::success(RoundParticipantScoreUpdated {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    score: request.score,
                    participants: round.participants,
                }))
            }
            Err(RepositoryError::NoRowsAffected | RepositoryError::RoundNotFound { .. }) => {
                Ok(OperationResult::failure(RoundScoreUpdateError {
                    guild_id: request.guild_id.clone(),
                    round_id: request.round_id,
                    user_id: request.user_id.clone(),
                    error: "user is not a participant in this round".to_owned(),
                }))
            }
            Err(e) => Err(ServiceError::Repository(e)),
        }
    }

    async fn check_completeness(
        &self,
        guild_id: &str,
        round_id: Uuid,
    ) -> Result<OperationResult<ScoreCompleteness, RoundFinalizationError>, ServiceError> {
        let round = match self.repo.fetch_round(guild_id, round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return Ok(OperationResult::failure(RoundFinalizationError {
                    guild_id: guild_id.to_owned(),
                    round_id,
                    error: "round not found".to_owned(),
                }));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };

        if round.all_scores_submitted() {
            Ok(OperationResult::success(ScoreCompleteness::AllSubmitted(
                RoundAllScoresSubmitted {
                    guild_id: guild_id.to_owned(),
                    round_id,
                },
            )))
        } else {
            Ok(OperationResult::success(ScoreCompleteness::Partial(
                RoundScoresPartiallySubmitted {
                    guild_id: guild_id.to_owned(),
                    round_id,
                    remaining: round.outstanding_scores(),
                },
            )))
        }
    }
}
