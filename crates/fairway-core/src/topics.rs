//! Topic vocabulary.
//!
//! Topics follow `<module>.<noun>.<verb_past_tense>.<version>`; the
//! guild-scoped variant appends `.<guild_id>`.

// Round lifecycle.

/// A round creation was requested.
pub const ROUND_CREATION_REQUESTED: &str = "round.creation.requested.v1";
/// Creation input was rejected by validation.
pub const ROUND_VALIDATION_FAILED: &str = "round.validation.failed.v1";
/// A validated round entity is ready to persist.
pub const ROUND_ENTITY_CREATED: &str = "round.entity.created.v1";
/// The round was persisted.
pub const ROUND_CREATED: &str = "round.creation.completed.v1";
/// Persisting the round was rejected.
pub const ROUND_CREATION_FAILED: &str = "round.creation.failed.v1";

/// A round update was requested.
pub const ROUND_UPDATE_REQUESTED: &str = "round.update.requested.v1";
/// The update passed validation.
pub const ROUND_UPDATE_VALIDATED: &str = "round.update.validated.v1";
/// The update was rejected.
pub const ROUND_UPDATE_ERROR: &str = "round.update.failed.v1";
/// The update was applied.
pub const ROUND_UPDATED: &str = "round.update.completed.v1";
/// The round's start time changed.
pub const ROUND_SCHEDULE_UPDATED: &str = "round.schedule.updated.v1";

/// A round deletion was requested.
pub const ROUND_DELETE_REQUESTED: &str = "round.delete.requested.v1";
/// The deletion request passed authorization.
pub const ROUND_DELETE_VALIDATED: &str = "round.delete.validated.v1";
/// The deletion is authorized and ready to apply.
pub const ROUND_DELETE_AUTHORIZED: &str = "round.delete.authorized.v1";
/// The deletion was rejected.
pub const ROUND_DELETE_ERROR: &str = "round.delete.failed.v1";
/// The round was soft-deleted.
pub const ROUND_DELETED: &str = "round.delete.completed.v1";

/// A round start was requested.
pub const ROUND_START_REQUESTED: &str = "round.start.requested.v1";
/// Presentation hand-off for a started round.
pub const DISCORD_ROUND_START: &str = "discord.round.started.v1";

/// Every expected score has been submitted; finalization may begin.
pub const ROUND_ALL_SCORES_SUBMITTED: &str = "round.scores.submitted.v1";
/// Some expected scores are still outstanding.
pub const ROUND_SCORES_PARTIALLY_SUBMITTED: &str = "round.scores.partially_submitted.v1";
/// The round was finalized (backend record).
pub const ROUND_FINALIZED: &str = "round.finalization.completed.v1";
/// Presentation hand-off for a finalized round.
pub const DISCORD_ROUND_FINALIZED: &str = "discord.round.finalized.v1";
/// Finalization was rejected or could not proceed.
pub const ROUND_FINALIZATION_ERROR: &str = "round.finalization.failed.v1";
/// The submission-completeness check itself failed.
pub const ROUND_FINALIZATION_FAILED: &str = "round.finalization.check_failed.v1";
/// Hand-off asking the scoring collaborator to process final scores.
pub const PROCESS_ROUND_SCORES_REQUESTED: &str = "leaderboard.scores.requested.v1";

// Participant join saga.

/// A user asked to join (or change their RSVP on) a round.
pub const PARTICIPANT_JOIN_REQUESTED: &str = "round.participant.join_requested.v1";
/// The join request was routed onward for validation.
pub const PARTICIPANT_JOIN_VALIDATION_REQUESTED: &str = "round.participant.validation_requested.v1";
/// A participant status update is ready to persist.
pub const PARTICIPANT_STATUS_UPDATE_REQUESTED: &str = "round.participant.update_requested.v1";
/// The participant joined (or their RSVP was updated).
pub const ROUND_PARTICIPANT_JOINED: &str = "round.participant.joined.v1";
/// The join was rejected.
pub const ROUND_PARTICIPANT_JOIN_ERROR: &str = "round.participant.join_failed.v1";
/// A participant removal was requested.
pub const PARTICIPANT_REMOVAL_REQUESTED: &str = "round.participant.removal_requested.v1";
/// The participant was removed.
pub const ROUND_PARTICIPANT_REMOVED: &str = "round.participant.removed.v1";
/// The removal was rejected.
pub const ROUND_PARTICIPANT_REMOVAL_ERROR: &str = "round.participant.removal_failed.v1";

// Ranking/tag service round-trip.

/// Request to the ranking service for a user's tag number.
pub const ROUND_TAG_LOOKUP_REQUESTED: &str = "leaderboard.tag.requested.v1";
/// The ranking service resolved a tag number.
pub const ROUND_TAG_LOOKUP_FOUND: &str = "leaderboard.tag.found.v1";
/// The ranking service has no tag for the user.
pub const ROUND_TAG_LOOKUP_NOT_FOUND: &str = "leaderboard.tag.not_found.v1";
/// The ranking service failed to answer.
pub const ROUND_TAG_LOOKUP_FAILED: &str = "leaderboard.tag.failed.v1";

// Score saga.

/// A score update was requested.
pub const ROUND_SCORE_UPDATE_REQUESTED: &str = "round.score.update_requested.v1";
/// The score update passed validation.
pub const ROUND_SCORE_UPDATE_VALIDATED: &str = "round.score.validated.v1";
/// The score update was rejected.
pub const ROUND_SCORE_UPDATE_ERROR: &str = "round.score.update_failed.v1";
/// A participant's score was persisted.
pub const ROUND_PARTICIPANT_SCORE_UPDATED: &str = "round.score.updated.v1";

// Scorecard import pipeline.

/// A scorecard file was uploaded.
pub const SCORECARD_UPLOADED: &str = "import.scorecard.uploaded.v1";
/// A scorecard should be fetched from a URL.
pub const SCORECARD_URL_REQUESTED: &str = "import.scorecard.url_requested.v1";
/// An import job exists and parsing should begin.
pub const SCORECARD_PARSE_REQUESTED: &str = "import.parse.requested.v1";
/// The scorecard parsed into rows awaiting user matching.
pub const SCORECARD_PARSED_FOR_USER: &str = "import.scorecard.parsed.v1";
/// The scorecard could not be parsed.
pub const SCORECARD_PARSE_FAILED: &str = "import.parse.failed.v1";
/// The user-matching collaborator returned normalized, matched scores.
pub const INGEST_NORMALIZED_SCORECARD: &str = "import.scorecard.normalized.v1";
/// Matched scores were ingested; the job may be applied.
pub const IMPORT_COMPLETED: &str = "import.job.completed.v1";
/// The import job failed.
pub const IMPORT_FAILED: &str = "import.job.failed.v1";

/// Returns the guild-scoped variant of `base_topic`.
#[must_use]
pub fn guild_scoped(base_topic: &str, guild_id: &str) -> String {
    format!("{base_topic}.{guild_id}")
}
