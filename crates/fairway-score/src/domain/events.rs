//! Event payloads for the score saga.

use fairway_core::domain::Participant;
use fairway_round::domain::events::RoundAllScoresSubmitted;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A participant submitted (or corrected) a score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundScoreUpdateRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being scored.
    pub round_id: Uuid,
    /// The scoring user.
    pub user_id: String,
    /// The submitted score, relative to par.
    pub score: i32,
}

/// A score update that passed validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundScoreUpdateValidated {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being scored.
    pub round_id: Uuid,
    /// The scoring user.
    pub user_id: String,
    /// The validated score.
    pub score: i32,
}

/// A score update was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundScoreUpdateError {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round the update targeted.
    pub round_id: Uuid,
    /// The user whose update was rejected.
    pub user_id: String,
    /// Why.
    pub error: String,
}

/// A score was persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundParticipantScoreUpdated {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The scored round.
    pub round_id: Uuid,
    /// The scoring user.
    pub user_id: String,
    /// The persisted score.
    pub score: i32,
    /// The full roster after the update.
    pub participants: Vec<Participant>,
}

/// Some expected scores are still outstanding; the round stays open.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundScoresPartiallySubmitted {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round awaiting scores.
    pub round_id: Uuid,
    /// Number of expected scores not yet submitted.
    pub remaining: usize,
}

/// Outcome of the completeness check. One variant per continuation, so the
/// handler's branch is checked exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScoreCompleteness {
    /// Every expected score is in; finalization can begin.
    AllSubmitted(RoundAllScoresSubmitted),
    /// Scores are still outstanding; nothing further happens this hop.
    Partial(RoundScoresPartiallySubmitted),
}
