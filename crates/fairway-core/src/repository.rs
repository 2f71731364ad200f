//! Repository collaborator contracts.
//!
//! The persistence engine is external; these traits specify the call
//! contract the sagas depend on. Implementations own per-round consistency
//! (optimistic state transitions, participant-set updates).

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{ImportJob, ImportJobState, Participant, Round, RoundState};
use crate::error::RepositoryError;

/// Per-guild CRUD for rounds and their participants.
#[async_trait]
pub trait RoundRepository: Send + Sync {
    /// Inserts a new round.
    ///
    /// # Errors
    ///
    /// `Conflict` if a round with the same identity already exists.
    async fn insert_round(&self, round: &Round) -> Result<(), RepositoryError>;

    /// Fetches a round by identity.
    ///
    /// # Errors
    ///
    /// `RoundNotFound` if no such round exists.
    async fn fetch_round(&self, guild_id: &str, round_id: Uuid) -> Result<Round, RepositoryError>;

    /// Replaces a round's stored fields.
    ///
    /// # Errors
    ///
    /// `RoundNotFound` if no such round exists.
    async fn save_round(&self, round: &Round) -> Result<(), RepositoryError>;

    /// Applies an optimistic state transition, returning the updated round.
    ///
    /// # Errors
    ///
    /// `Conflict` if the transition is illegal from the current state.
    async fn transition_state(
        &self,
        guild_id: &str,
        round_id: Uuid,
        next: RoundState,
    ) -> Result<Round, RepositoryError>;

    /// Inserts or replaces a participant entry, returning the updated round.
    ///
    /// # Errors
    ///
    /// `RoundNotFound` if no such round exists.
    async fn upsert_participant(
        &self,
        guild_id: &str,
        round_id: Uuid,
        participant: Participant,
    ) -> Result<Round, RepositoryError>;

    /// Removes a participant entry, returning the updated round.
    ///
    /// # Errors
    ///
    /// `NoRowsAffected` if the user was not a participant.
    async fn remove_participant(
        &self,
        guild_id: &str,
        round_id: Uuid,
        user_id: &str,
    ) -> Result<Round, RepositoryError>;

    /// Records a participant's score, returning the updated round.
    ///
    /// # Errors
    ///
    /// `NoRowsAffected` if the user was not a participant.
    async fn record_score(
        &self,
        guild_id: &str,
        round_id: Uuid,
        user_id: &str,
        score: i32,
    ) -> Result<Round, RepositoryError>;
}

/// Storage for scorecard import jobs.
#[async_trait]
pub trait ImportJobRepository: Send + Sync {
    /// Inserts a new job.
    ///
    /// # Errors
    ///
    /// `Conflict` if a job with the same import id already exists.
    async fn insert_job(&self, job: &ImportJob) -> Result<(), RepositoryError>;

    /// Fetches a job by import id.
    ///
    /// # Errors
    ///
    /// `ImportJobNotFound` if no such job exists.
    async fn fetch_job(&self, import_id: Uuid) -> Result<ImportJob, RepositoryError>;

    /// Advances a job to `next`, returning the updated job. Forward moves
    /// only; terminal jobs are never resumed.
    ///
    /// # Errors
    ///
    /// `Conflict` on a backward move or a move out of a terminal state.
    async fn advance_job(
        &self,
        import_id: Uuid,
        next: ImportJobState,
    ) -> Result<ImportJob, RepositoryError>;
}
