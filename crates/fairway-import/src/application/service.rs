//! Import service — the single collaborator each pipeline handler calls.

use std::sync::Arc;

use async_trait::async_trait;
use fairway_core::domain::{ImportJob, ImportJobState};
use fairway_core::error::{RepositoryError, ServiceError};
use fairway_core::outcome::OperationResult;
use fairway_core::repository::{ImportJobRepository, RoundRepository};
use fairway_round::domain::events::RoundAllScoresSubmitted;
use fairway_score::domain::events::{RoundScoresPartiallySubmitted, ScoreCompleteness};
use tracing::{info, warn};

use crate::domain::events::{
    ImportCompleted, ImportFailed, IngestNormalizedScorecard, ScorecardParseFailed,
    ScorecardParseRequested, ScorecardParsedForUser,
};
use crate::parser::{ParseError, ScorecardParser};

/// Collaborator contract for the import pipeline.
#[async_trait]
pub trait ImportService: Send + Sync {
    /// Creates the import job for `request`. A replayed create against an
    /// existing non-terminal job continues; a terminal job rejects.
    async fn create_job(
        &self,
        request: &ScorecardParseRequested,
    ) -> Result<OperationResult<ScorecardParseRequested, ImportFailed>, ServiceError>;

    /// Parses the scorecard source into rows via the parser collaborator.
    async fn parse_scorecard(
        &self,
        request: &ScorecardParseRequested,
    ) -> Result<OperationResult<ScorecardParsedForUser, ScorecardParseFailed>, ServiceError>;

    /// Records that matched scores were ingested.
    async fn ingest(
        &self,
        request: &IngestNormalizedScorecard,
    ) -> Result<OperationResult<ImportCompleted, ImportFailed>, ServiceError>;

    /// Applies ingested scores to the round and runs the completeness check.
    async fn apply_scores(
        &self,
        request: &ImportCompleted,
    ) -> Result<OperationResult<ScoreCompleteness, ImportFailed>, ServiceError>;
}

/// Production implementation over the repositories and the parser.
pub struct ImportServiceImpl {
    rounds: Arc<dyn RoundRepository>,
    jobs: Arc<dyn ImportJobRepository>,
    parser: Arc<dyn ScorecardParser>,
}

impl ImportServiceImpl {
    /// Creates a service over the given collaborators.
    #[must_use]
    pub fn new(
        rounds: Arc<dyn RoundRepository>,
        jobs: Arc<dyn ImportJobRepository>,
        parser: Arc<dyn ScorecardParser>,
    ) -> Self {
        Self {
            rounds,
            jobs,
            parser,
        }
    }

    fn import_failed(
        import_id: uuid::Uuid,
        guild_id: &str,
        round_id: uuid::Uuid,
        error: &str,
    ) -> ImportFailed {
        ImportFailed {
            import_id,
            guild_id: guild_id.to_owned(),
            round_id,
            error: error.to_owned(),
        }
    }

    /// Moves the job to `Failed`, tolerating a job that is already terminal.
    async fn fail_job(&self, import_id: uuid::Uuid) -> Result<(), ServiceError> {
        match self.jobs.advance_job(import_id, ImportJobState::Failed).await {
            Ok(_) | Err(RepositoryError::Conflict(_)) => Ok(()),
            Err(e) => Err(ServiceError::Repository(e)),
        }
    }
}

#[async_trait]
impl ImportService for ImportServiceImpl {
    async fn create_job(
        &self,
        request: &ScorecardParseRequested,
    ) -> Result<OperationResult<ScorecardParseRequested, ImportFailed>, ServiceError> {
        let job = ImportJob {
            import_id: request.import_id,
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            state: ImportJobState::Uploaded,
        };
        match self.jobs.insert_job(&job).await {
            Ok(()) => {
                info!(
                    import_id = %request.import_id,
                    guild_id = %request.guild_id,
                    round_id = %request.round_id,
                    "import job created"
                );
                Ok(OperationResult::success(request.clone()))
            }
            // Redelivery: the job already exists. Continue unless it is done.
            Err(RepositoryError::Conflict(_)) => {
                let existing = self
                    .jobs
                    .fetch_job(request.import_id)
                    .await
                    .map_err(ServiceError::Repository)?;
                if existing.state.is_terminal() {
                    return Ok(OperationResult::failure(Self::import_failed(
                        request.import_id,
                        &request.guild_id,
                        request.round_id,
                        "import job already finished",
                    )));
                }
                Ok(OperationResult::success(request.clone()))
            }
            Err(e) => Err(ServiceError::Repository(e)),
        }
    }

    async fn parse_scorecard(
        &self,
        request: &ScorecardParseRequested,
    ) -> Result<OperationResult<ScorecardParsedForUser, ScorecardParseFailed>, ServiceError> {
        let rejection = |error: String| {
            OperationResult::failure(ScorecardParseFailed {
                import_id: request.import_id,
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
                error,
            })
        };

        let rows = match self.parser.parse(&request.source).await {
            Ok(rows) if rows.is_empty() => {
                self.fail_job(request.import_id).await?;
                return Ok(rejection("scorecard contained no rows".to_owned()));
            }
            Ok(rows) => rows,
            Err(ParseError::Malformed(reason)) => {
                warn!(
                    import_id = %request.import_id,
                    %reason,
                    "scorecard failed to parse"
                );
                self.fail_job(request.import_id).await?;
                return Ok(rejection(reason));
            }
            Err(ParseError::Unavailable(reason)) => {
                return Err(ServiceError::Infrastructure(reason));
            }
        };

        match self
            .jobs
            .advance_job(request.import_id, ImportJobState::Parsed)
            .await
        {
            Ok(_) => {}
            // Redelivery: already past Parsed. Re-emit unless the job failed.
            Err(RepositoryError::Conflict(_)) => {
                let existing = self
                    .jobs
                    .fetch_job(request.import_id)
                    .await
                    .map_err(ServiceError::Repository)?;
                if existing.state == ImportJobState::Failed {
                    return Ok(rejection("import job already failed".to_owned()));
                }
            }
            Err(RepositoryError::ImportJobNotFound(_)) => {
                return Ok(rejection("unknown import job".to_owned()));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        }

        Ok(OperationResult::success(ScorecardParsedForUser {
            import_id: request.import_id,
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            rows,
        }))
    }

    async fn ingest(
        &self,
        request: &IngestNormalizedScorecard,
    ) -> Result<OperationResult<ImportCompleted, ImportFailed>, ServiceError> {
        if request.scores.is_empty() {
            self.fail_job(request.import_id).await?;
            return Ok(OperationResult::failure(Self::import_failed(
                request.import_id,
                &request.guild_id,
                request.round_id,
                "no rows matched a user",
            )));
        }

        let job = match self.jobs.fetch_job(request.import_id).await {
            Ok(job) => job,
            Err(RepositoryError::ImportJobNotFound(_)) => {
                return Ok(OperationResult::failure(Self::import_failed(
                    request.import_id,
                    &request.guild_id,
                    request.round_id,
                    "unknown import job",
                )));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };
        if job.state == ImportJobState::Failed {
            return Ok(OperationResult::failure(Self::import_failed(
                request.import_id,
                &request.guild_id,
                request.round_id,
                "import job already failed",
            )));
        }

        let completed = ImportCompleted {
            import_id: request.import_id,
            guild_id: request.guild_id.clone(),
            round_id: request.round_id,
            scores: request.scores.clone(),
        };
        // Applied already includes Ingested; a replay just re-emits.
        if job.state == ImportJobState::Applied {
            return Ok(OperationResult::success(completed));
        }
        match self
            .jobs
            .advance_job(request.import_id, ImportJobState::Ingested)
            .await
        {
            Ok(_) | Err(RepositoryError::Conflict(_)) => {}
            Err(e) => return Err(ServiceError::Repository(e)),
        }
        info!(
            import_id = %request.import_id,
            scores = request.scores.len(),
            "matched scores ingested"
        );
        Ok(OperationResult::success(completed))
    }

    async fn apply_scores(
        &self,
        request: &ImportCompleted,
    ) -> Result<OperationResult<ScoreCompleteness, ImportFailed>, ServiceError> {
        let mut round = match self.rounds.fetch_round(&request.guild_id, request.round_id).await {
            Ok(round) => round,
            Err(RepositoryError::RoundNotFound { .. }) => {
                self.fail_job(request.import_id).await?;
                return Ok(OperationResult::failure(Self::import_failed(
                    request.import_id,
                    &request.guild_id,
                    request.round_id,
                    "round not found",
                )));
            }
            Err(e) => return Err(ServiceError::Repository(e)),
        };

        for matched in &request.scores {
            match self
                .rounds
                .record_score(&request.guild_id, request.round_id, &matched.user_id, matched.score)
                .await
            {
                Ok(updated) => round = updated,
                // Rows matched to users who never joined the round are skipped.
                Err(RepositoryError::NoRowsAffected) => {
                    warn!(
                        import_id = %request.import_id,
                        user_id = %matched.user_id,
                        "imported score for a non-participant, skipping"
                    );
                }
                Err(e) => return Err(ServiceError::Repository(e)),
            }
        }

        match self
            .jobs
            .advance_job(request.import_id, ImportJobState::Applied)
            .await
        {
            Ok(_) | Err(RepositoryError::Conflict(_)) => {}
            Err(e) => return Err(ServiceError::Repository(e)),
        }

        let completeness = if round.all_scores_submitted() {
            ScoreCompleteness::AllSubmitted(RoundAllScoresSubmitted {
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
            })
        } else {
            ScoreCompleteness::Partial(RoundScoresPartiallySubmitted {
                guild_id: request.guild_id.clone(),
                round_id: request.round_id,
                remaining: round.outstanding_scores(),
            })
        };
        Ok(OperationResult::success(completeness))
    }
}
