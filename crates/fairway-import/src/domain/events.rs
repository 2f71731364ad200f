//! Event payloads for the scorecard import pipeline.
//!
//! Every payload carries the import id: it is the idempotency key for the
//! whole pipeline, and a redelivered stage event is resolved against the
//! stored job state rather than re-run blindly.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where the scorecard bytes come from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ScorecardSource {
    /// An uploaded file.
    File {
        /// Original filename, for diagnostics.
        filename: String,
        /// Raw file bytes.
        content: Vec<u8>,
    },
    /// A URL the parser collaborator fetches itself.
    Url {
        /// Location of the scorecard.
        url: String,
    },
}

/// A scorecard file was uploaded for a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardUploaded {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// Original filename.
    pub filename: String,
    /// Raw file bytes.
    pub content: Vec<u8>,
}

/// A scorecard was referenced by URL instead of uploaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardUrlRequested {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// Location of the scorecard.
    pub url: String,
}

/// The job exists; the source is ready to parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardParseRequested {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// The scorecard source.
    pub source: ScorecardSource,
}

/// One row parsed out of a scorecard, not yet matched to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedScoreRow {
    /// Player name as written on the scorecard.
    pub display_name: String,
    /// Score relative to par.
    pub score: i32,
}

/// The scorecard parsed into rows; the user-matching collaborator takes over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardParsedForUser {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// The parsed rows.
    pub rows: Vec<ParsedScoreRow>,
}

/// The scorecard could not be parsed. Terminal for the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorecardParseFailed {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// Why.
    pub error: String,
}

/// One parsed row matched to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedScore {
    /// The matched user.
    pub user_id: String,
    /// Score relative to par.
    pub score: i32,
}

/// The user-matching collaborator's reply: rows resolved to user ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestNormalizedScorecard {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// The matched scores.
    pub scores: Vec<MatchedScore>,
}

/// The matched scores were ingested; application to the round follows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportCompleted {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// The scores to apply.
    pub scores: Vec<MatchedScore>,
}

/// The import failed. Terminal for the job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportFailed {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// Why.
    pub error: String,
}
