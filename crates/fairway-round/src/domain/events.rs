//! Event payloads for the round lifecycle saga.

use chrono::{DateTime, Utc};
use fairway_core::domain::{Participant, Round};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user asked to schedule a new round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundCreationRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional location.
    pub location: Option<String>,
    /// Raw start time as entered by the user.
    pub start_time: String,
    /// User making the request; becomes the round creator.
    pub created_by: String,
}

/// Creation input was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundValidationFailed {
    /// Tenant the request belonged to.
    pub guild_id: String,
    /// User whose request was rejected.
    pub created_by: String,
    /// One entry per rejected field.
    pub errors: Vec<String>,
}

/// A validated round entity, ready to persist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundEntityCreated {
    /// The round to persist.
    pub round: Round,
}

/// The round was persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundCreated {
    /// The persisted round.
    pub round: Round,
}

/// Persisting the round failed in an expected way.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundCreationFailed {
    /// Tenant the round belonged to.
    pub guild_id: String,
    /// The round that could not be persisted.
    pub round_id: Uuid,
    /// Why.
    pub error: String,
}

/// A user asked to change a round's details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundUpdateRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to update.
    pub round_id: Uuid,
    /// User making the request.
    pub requested_by: String,
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New location, if changing.
    pub location: Option<String>,
    /// New raw start time, if changing.
    pub start_time: Option<String>,
}

/// The update passed validation; times are parsed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundUpdateValidated {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to update.
    pub round_id: Uuid,
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New location, if changing.
    pub location: Option<String>,
    /// New start time, if changing.
    pub start_time: Option<DateTime<Utc>>,
}

/// The update was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundUpdateError {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round the update targeted.
    pub round_id: Uuid,
    /// Why.
    pub error: String,
}

/// The update was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundUpdated {
    /// The round after the update.
    pub round: Round,
}

/// The round's start time changed; reminder schedules must follow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundScheduleUpdated {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The rescheduled round.
    pub round_id: Uuid,
    /// The new start time.
    pub start_time: DateTime<Utc>,
}

/// Outcome of persisting a validated update. Internal to the saga: the
/// handler fans this out into `RoundUpdated` and, when the start time
/// changed, `RoundScheduleUpdated`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundUpdateApplied {
    /// The round after the update.
    pub round: Round,
    /// Whether the start time changed.
    pub schedule_changed: bool,
}

/// A user asked to delete a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDeleteRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to delete.
    pub round_id: Uuid,
    /// User making the request; must be the creator.
    pub requested_by: String,
}

/// The delete request passed authorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDeleteValidated {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to delete.
    pub round_id: Uuid,
    /// The authorized requester.
    pub requested_by: String,
}

/// The delete is authorized and ready to apply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDeleteAuthorized {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to delete.
    pub round_id: Uuid,
}

/// The delete was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDeleteError {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round the delete targeted.
    pub round_id: Uuid,
    /// Why.
    pub error: String,
}

/// The round was soft-deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundDeleted {
    /// Tenant the round belonged to.
    pub guild_id: String,
    /// The deleted round.
    pub round_id: Uuid,
}

/// A round should move from upcoming to in-progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundStartRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to start.
    pub round_id: Uuid,
}

/// Terminal hand-off to the presentation service for a started round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordRoundStart {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The started round.
    pub round_id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional location.
    pub location: Option<String>,
    /// Scheduled start time.
    pub start_time: DateTime<Utc>,
    /// Current participant roster.
    pub participants: Vec<Participant>,
    /// Presentation message reference, once assigned.
    pub event_message_id: Option<String>,
}

/// Every expected score is in; finalize the round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundAllScoresSubmitted {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to finalize.
    pub round_id: Uuid,
}

/// The round was finalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundFinalized {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The finalized round.
    pub round_id: Uuid,
    /// The round with its settled scores.
    pub round: Round,
}

/// Finalization was rejected or could not proceed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundFinalizationError {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round finalization targeted.
    pub round_id: Uuid,
    /// Why.
    pub error: String,
}

/// One settled score for the scoring collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// The scoring user.
    pub user_id: String,
    /// The user's tag number at finalization, if resolved.
    pub tag_number: Option<u32>,
    /// The settled score.
    pub score: i32,
}

/// Hand-off asking the scoring collaborator to process final scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRoundScoresRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The finalized round.
    pub round_id: Uuid,
    /// Settled scores, in roster order.
    pub scores: Vec<ScoreEntry>,
}
