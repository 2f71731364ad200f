//! Round lifecycle service — the single collaborator each lifecycle handler
//! calls. Validation and persistence logic over the round repository.

use std::sync::Arc;

use async_trait::async_trait;
use fairway_core::clock::Clock;
use fairway_core::domain::{Round, RoundState};
use fairway_core::error::{RepositoryError, ServiceError};
use fairway_core::outcome::OperationResult;
use fairway_core::repository::RoundRepository;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::events::{
    DiscordRoundStart, ProcessRoundScoresRequested, RoundAllScoresSubmitted, RoundCreated,
    RoundCreationFailed, RoundCreationRequested, RoundDeleteAuthorized, RoundDeleteError,
    RoundDeleteRequested, RoundDeleteValidated, RoundDeleted, RoundEntityCreated,
    RoundFinalizationError, RoundFinalized, RoundStartRequested, RoundUpdateApplied,
    RoundUpdateError, RoundUpdateRequested, RoundUpdateValidated, RoundValidationFailed,
    ScoreEntry,
};
use crate::domain::schedule;

/// Collaborator contract for the round lifecycle saga.
#[async_trait]
pub trait RoundService: Send + Sync {
    /// Validates a creation request and builds the round entity.
    async fn validate_creation(
        &self,
        request: &RoundCreationRequested,
    ) -> Result<OperationResult<RoundEntityCreated, RoundValidationFailed>, ServiceError>;

    /// Persists a validated round entity.
    async fn store_round(
        &self,
        created: &RoundEntityCreated,
    ) -> Result<OperationResult<RoundCreated, RoundCreationFailed>, ServiceError>;

    /// Validates an update request, parsing any new start time.
    async fn validate_update(
        &self,
        request: &RoundUpdateRequested,
    ) -> Result<OperationResult<RoundUpdateValidated, RoundUpdateError>, ServiceError>;

    /// Applies a validated update.
    async fn apply_update(
        &self,
        validated: &RoundUpdateValidated,
    ) -> Result<OperationResult<RoundUpdateApplied, RoundUpdateError>, ServiceError>;

    /// Authorizes a delete request: only the creator may delete.
    async fn authorize_delete(
        &self,
        request: &RoundDeleteRequested,
    ) -> Result<OperationResult<RoundDeleteValidated, RoundDeleteError>, ServiceError>;

    /// Soft-deletes an authorized round.
    async fn soft_delete(
        &self,
        authorized: &RoundDeleteAuthorized,
    ) -> Result<OperationResult<RoundDeleted, RoundDeleteError>, ServiceError>;

    /// Moves the round in progress and builds the presentation hand-off.
    /// `None` means the round is finalized or deleted and can never start.
    async fn process_start(
        &self,
        request: &RoundStartRequested,
    ) -> Result<Option<DiscordRoundStart>, ServiceError>;

    /// Finalizes a round once every expected score is in.
    async fn finalize(
        &self,
        submitted: &RoundAllScoresSubmitted,
    ) -> Result<OperationResult<RoundFinalized, RoundFinalizationError>, ServiceError>;

    /// Builds the settled-score hand-off for the scoring collaborator.
    async fn build_score_processing(
        &self,
        finalized: &RoundFinalized,
    ) -> Result<OperationResult<ProcessRoundScoresRequested, RoundFinalizationError>, ServiceError>;
}

/// Production implementation over the round repository and an injected clock.
pub struct RoundServiceImpl {
    repo: Arc<dyn RoundRepository>,
    clock: Arc<dyn Clock>,
}

impl RoundServiceImpl {
    /// Creates a service over `repo` and `clock`.
    #[must_use]
    pub fn new(repo: Arc<dyn RoundRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl RoundService for RoundServiceImpl {
    async fn validate_creation(
        &self,
        request: &RoundCreationRequested,
    ) -> Result<OperationResult<RoundEntityCreated, RoundValidationFailed>, ServiceError> {
        let mut errors = Vec::new();
        if request.title.trim().is_empty() {
            errors.push("title must not be empty".to_owned());
        }
        let start_time = match schedule::parse_start_time(&request.start_time, self.clock.as_ref())
        {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                errors.push(e.to_string());
                None
            }
        };
        if !errors.is_empty() {
            warn!(guild_id = %request.guild_id, ?errors, "round creation rejected");
            return Ok(OperationResult::failure(RoundValidationFailed {
                guild_id: request.guild_id.clone(),
                created_by: request.created_by.clone(),
                errors,
            }));
        }

        let round = Round {
            guild_id: request.guild_id.clone(),
            round_id: Uuid::new_v4(),
            title: request.title.trim().to_owned(),
            description: request.description.clone(),
            location: request.location.clone(),
            start_time: start_time.unwrap_or_else(|| self.clock.now()),
            state: RoundState::Upcoming,
            created_by: request.created_by.clone(),
            participants: Vec::new(),
            event_message_id: None,
            calendar_event_id: None,
        };
        Ok(OperationResult::success(RoundEntityCreated { round }))
    }

    async fn store_round(
        &self,
        created: &RoundEntityCreated,
    ) -> Result<OperationResult<RoundCreated, RoundCreationFailed>, ServiceError> {
        match self.repo.insert_round(&created.round).await {
            Ok(()) => {
                info!(
                    guild_id = %created.round.guild_id,
                    round_id = %created.round.round_id,
                    "round persisted"
                );
                Ok(OperationResult::success(RoundCreated {
                    round: created.round.clone(),
                }))
            }
            // Redelivery: the round is already stored.
            Err(RepositoryError::Conflict(_)) => Ok(OperationResult::success(RoundCreated {
                round: created.round.clone(),
            })),
            Err(RepositoryError::Infrastructure(e)) => {
                Err(ServiceError::Repository(RepositoryError::Infrastructure(e)))
            }
            Err(e) => Ok(OperationResult::failure(RoundCreationFailed {
                guild_id: created.round.guild_id.clone(),
                round_id: created.round.round_id,
                error: e.to_string(),
            })),
        }
    }

    async fn validate_update(
        &self,
        request: &RoundUpdateRequested,
    ) -> Result<OperationResult<RoundUpdateValidated, RoundUpdateError>, ServiceError> {
        let reject = |error: String| {
            Ok(OperationResult::failure(RoundUpdateError {
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
                error,
            }))
        };

        if request.title.is_none()
            && request.description.is_none()
            && request.location.is_none()
            && request.start_time.is_none()
        {
            return reject("no fields to update".to_owned());
        }

        let round = match self.repo.fetch_round(&request.guild_id, request.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return reject("round not found".to_owned());
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };
        if !round.state.is_open() {
            return reject("cannot update a finalized or deleted round".to_owned());
        }

        let start_time = match &request.start_time {
            Some(raw) => match schedule::parse_start_time(raw, self.clock.as_ref()) {
                Ok(parsed) => Some(parsed),
                Err(e) => return reject(e.to_string()),
            },
            None => None,
        };

        Ok(OperationResult::success(RoundUpdateValidated {
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            title: request.title.clone(),
            description: request.description.clone(),
            location: request.location.clone(),
            start_time,
        }))
    }

    async fn apply_update(
        &self,
        validated: &RoundUpdateValidated,
    ) -> Result<OperationResult<RoundUpdateApplied, RoundUpdateError>, ServiceError> {
        let mut round = match self
            .repo
            .fetch_round(&validated.guild_id, validated.round_id)
            .await
        {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return Ok(OperationResult::failure(RoundUpdateError {
                    guild_id: validated.guild_id.clone(),
                    round_id: validated.round_id,
                    error: "round not found".to_owned(),
                }));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };

        if let Some(title) = &validated.title {
            round.title = title.clone();
        }
        if let Some(description) = &validated.description {
            round.description = Some(description.clone());
        }
        if let Some(location) = &validated.location {
            round.location = Some(location.clone());
        }
        let schedule_changed = validated
            .start_time
            .is_some_and(|new_start| new_start != round.start_time);
        if let Some(new_start) = validated.start_time {
            round.start_time = new_start;
        }

        self.repo.save_round(&round).await.map_err(ServiceError::Repository)?;
        info!(
            guild_id = %round.guild_id,
            round_id = %round.round_id,
            schedule_changed,
            "round updated"
        );
        Ok(OperationResult::success(RoundUpdateApplied {
            round,
            schedule_changed,
        }))
    }

    async fn authorize_delete(
        &self,
        request: &RoundDeleteRequested,
    ) -> Result<OperationResult<RoundDeleteValidated, RoundDeleteError>, ServiceError> {
        let reject = |error: String| {
            Ok(OperationResult::failure(RoundDeleteError {
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
                error,
            }))
        };

        let round = match self.repo.fetch_round(&request.guild_id, request.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return reject("round not found".to_owned());
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };
        if round.state == RoundState::Finalized {
            return reject("cannot delete a finalized round".to_owned());
        }
        if round.created_by != request.requested_by {
            warn!(
                guild_id = %request.guild_id,
                round_id = %request.round_id,
                requested_by = %request.requested_by,
                "unauthorized delete request"
            );
            return reject("unauthorized: only the round creator may delete this round".to_owned());
        }

        Ok(OperationResult::success(RoundDeleteValidated {
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            requested_by: request.requested_by.clone(),
        }))
    }

    async fn soft_delete(
        &self,
        authorized: &RoundDeleteAuthorized,
    ) -> Result<OperationResult<RoundDeleted, RoundDeleteError>, ServiceError> {
        let deleted = RoundDeleted {
            guild_id: authorized.guild_id.clone(),
            round_id: authorized.round_id,
        };
        match self
            .repo
            .transition_state(&authorized.guild_id, authorized.round_id, RoundState::Deleted)
            .await
        {
            Ok(_) => {
                info!(
                    guild_id = %authorized.guild_id,
                    round_id = %authorized.round_id,
                    "round soft-deleted"
                );
                Ok(OperationResult::success(deleted))
            }
            Err(RepositoryError::Conflict(e)) => {
                // Redelivery: the round may already be deleted.
                match self
                    .repo
                    .fetch_round(&authorized.guild_id, authorized.round_id)
                    .await
                {
                    Ok(round) if round.state == RoundState::Deleted => {
                        Ok(OperationResult::success(deleted))
                    }
                    Ok(_) => Ok(OperationResult::failure(RoundDeleteError {
                        guild_id: authorized.guild_id.clone(),
                        round_id: authorized.round_id,
                        error: e,
                    })),
                    Err(fetch_err) => Err(ServiceError::Repository(fetch_err)),
                }
            }
            Err(RepositoryError::RoundNotFound { .. }) => {
                Ok(OperationResult::failure(RoundDeleteError {
                    guild_id: authorized.guild_id.clone(),
                    round_id: authorized.round_id,
                    error: "round not found".to_owned(),
                }))
            }
            Err(e) => Err(ServiceError::Repository(e)),
        }
    }

    async fn process_start(
        &self,
        request: &RoundStartRequested,
    ) -> Result<Option<DiscordRoundStart>, ServiceError> {
        let current = self.repo.fetch_round(&request.guild_id, request.round_id).await?;
        let round = match current.state {
            // Redelivery: already started.
            RoundState::InProgress => current,
            RoundState::Upcoming => {
                self.repo
                    .transition_state(&request.guild_id, request.round_id, RoundState::InProgress)
                    .await?
            }
            // A finalized or deleted round can never start; redelivering
            // the request cannot change that.
            RoundState::Finalized | RoundState::Deleted => {
                warn!(
                    guild_id = %current.guild_id,
                    round_id = %current.round_id,
                    state = ?current.state,
                    "start requested for a round that can never start, dropping"
                );
                return Ok(None);
            }
        };
        info!(guild_id = %round.guild_id, round_id = %round.round_id, "round started");
        Ok(Some(DiscordRoundStart {
            guild_id: round.guild_id.clone(),
            round_id: round.round_id,
            title: round.title.clone(),
            location: round.location.clone(),
            start_time: round.start_time,
            participants: round.participants.clone(),
            event_message_id: round.event_message_id,
        }))
    }

    async fn finalize(
        &self,
        submitted: &RoundAllScoresSubmitted,
    ) -> Result<OperationResult<RoundFinalized, RoundFinalizationError>, ServiceError> {
        let current = match self.repo.fetch_round(&submitted.guild_id, submitted.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                return Ok(OperationResult::failure(RoundFinalizationError {
                    guild_id: submitted.guild_id.clone(),
                    round_id: submitted.round_id,
                    error: "round not found".to_owned(),
                }));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };

        // Redelivery: already finalized.
        let round = if current.state == RoundState::Finalized {
            current
        } else {
            match self
                .repo
                .transition_state(&submitted.guild_id, submitted.round_id, RoundState::Finalized)
                .await
            {
                Ok(round) => round,
                Err(RepositoryError::Conflict(e)) => {
                    return Ok(OperationResult::failure(RoundFinalizationError {
                        guild_id: submitted.guild_id.clone(),
                        round_id: submitted.round_id,
                        error: e,
                    }));
                }
                Err(e) => return Err(ServiceError::Repository(e)),
            }
        };

        info!(guild_id = %round.guild_id, round_id = %round.round_id, "round finalized");
        Ok(OperationResult::success(RoundFinalized {
            guild_id: round.guild_id.clone(),
            round_id: round.round_id,
            round,
        }))
    }

    async fn build_score_processing(
        &self,
        finalized: &RoundFinalized,
    ) -> Result<OperationResult<ProcessRoundScoresRequested, RoundFinalizationError>, ServiceError>
    {
        if finalized.round.state != RoundState::Finalized {
            return Ok(OperationResult::failure(RoundFinalizationError {
                guild_id: finalized.guild_id.clone(),
                round_id: finalized.round_id,
                error: "round is not finalized".to_owned(),
            }));
        }
        let scores = finalized
            .round
            .participants
            .iter()
            .filter(|p| p.response.expects_score())
            .filter_map(|p| {
                p.score.map(|score| ScoreEntry {
                    user_id: p.user_id.clone(),
                    tag_number: p.tag_number,
                    score,
                })
            })
            .collect();
        Ok(OperationResult::success(ProcessRoundScoresRequested {
            guild_id: finalized.guild_id.clone(),
            round_id: finalized.round_id,
            scores,
        }))
    }
}
