//! Shared domain model: rounds, participants, and import jobs.
//!
//! These are plain state-bearing types; all durable state lives behind the
//! repository collaborator, which owns per-round consistency.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a round.
///
/// Transitions are monotonic forward, with `Deleted` reachable as a terminal
/// soft-delete from any non-`Finalized` state. Physical deletion never occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundState {
    /// Scheduled, not yet started.
    Upcoming,
    /// Currently being played.
    InProgress,
    /// Finished; scores are settled.
    Finalized,
    /// Soft-deleted.
    Deleted,
}

impl RoundState {
    /// Whether `self → next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(self, next: RoundState) -> bool {
        matches!(
            (self, next),
            (RoundState::Upcoming, RoundState::InProgress)
                | (RoundState::InProgress, RoundState::Finalized)
                | (RoundState::Upcoming | RoundState::InProgress, RoundState::Deleted)
        )
    }

    /// Whether the round can still be mutated (joined, scored, updated).
    #[must_use]
    pub fn is_open(self) -> bool {
        matches!(self, RoundState::Upcoming | RoundState::InProgress)
    }
}

/// A participant's RSVP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpResponse {
    /// Will play.
    Accept,
    /// May play.
    Tentative,
    /// Will not play.
    Decline,
}

impl RsvpResponse {
    /// Whether a score is expected from (and may be set for) this response.
    #[must_use]
    pub fn expects_score(self) -> bool {
        !matches!(self, RsvpResponse::Decline)
    }
}

/// One participant entry, unique within a round by user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// The user's id.
    pub user_id: String,
    /// Externally-resolved ranking value; may be absent.
    pub tag_number: Option<u32>,
    /// The user's RSVP.
    pub response: RsvpResponse,
    /// Submitted score, if any.
    pub score: Option<i32>,
}

/// A scheduled group event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Round {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// Round identity within the guild.
    pub round_id: Uuid,
    /// Display title.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Optional location.
    pub location: Option<String>,
    /// Scheduled start time.
    pub start_time: DateTime<Utc>,
    /// Lifecycle state.
    pub state: RoundState,
    /// User who created the round; the only user allowed to delete it.
    pub created_by: String,
    /// Participants, ordered by join time, unique by user id.
    pub participants: Vec<Participant>,
    /// Opaque presentation message reference, once assigned.
    pub event_message_id: Option<String>,
    /// Optional external calendar event reference.
    pub calendar_event_id: Option<String>,
}

impl Round {
    /// Looks up a participant by user id.
    #[must_use]
    pub fn participant(&self, user_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user_id == user_id)
    }

    /// Inserts or replaces the entry for `participant.user_id`, preserving
    /// join order for existing entries.
    pub fn upsert_participant(&mut self, participant: Participant) {
        match self
            .participants
            .iter_mut()
            .find(|p| p.user_id == participant.user_id)
        {
            Some(existing) => *existing = participant,
            None => self.participants.push(participant),
        }
    }

    /// Removes the entry for `user_id`. Returns whether an entry existed.
    pub fn remove_participant(&mut self, user_id: &str) -> bool {
        let before = self.participants.len();
        self.participants.retain(|p| p.user_id != user_id);
        self.participants.len() != before
    }

    /// Whether every participant expected to score has submitted a score.
    /// Declined participants are exempt; a round with no scoring participants
    /// is never considered complete.
    #[must_use]
    pub fn all_scores_submitted(&self) -> bool {
        let mut scoring = self
            .participants
            .iter()
            .filter(|p| p.response.expects_score())
            .peekable();
        scoring.peek().is_some() && scoring.all(|p| p.score.is_some())
    }

    /// Number of expected scores still outstanding.
    #[must_use]
    pub fn outstanding_scores(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.response.expects_score() && p.score.is_none())
            .count()
    }
}

/// Pipeline state of an import job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ImportJobState {
    /// The scorecard source was received.
    Uploaded,
    /// The scorecard parsed into rows.
    Parsed,
    /// Rows were normalized.
    Normalized,
    /// Rows were matched to users.
    Matched,
    /// Matched scores were ingested.
    Ingested,
    /// Scores were applied to the round. Terminal.
    Applied,
    /// The job failed. Terminal.
    Failed,
}

impl ImportJobState {
    /// Whether the job can no longer progress.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, ImportJobState::Applied | ImportJobState::Failed)
    }
}

/// A scorecard import job. The import id is the idempotency key across the
/// whole pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    /// Idempotency key for the pipeline.
    pub import_id: Uuid,
    /// Tenant the job belongs to.
    pub guild_id: String,
    /// Round the scores apply to.
    pub round_id: Uuid,
    /// Pipeline state.
    pub state: ImportJobState,
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::{ImportJobState, Participant, Round, RoundState, RsvpResponse};

    fn round_with(participants: Vec<Participant>) -> Round {
        Round {
            guild_id: "g1".to_owned(),
            round_id: Uuid::new_v4(),
            title: "Saturday round".to_owned(),
            description: None,
            location: None,
            start_time: chrono::Utc::now(),
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

    #[test]
    fn test_state_transitions_are_monotonic_forward() {
        assert!(RoundState::Upcoming.can_transition_to(RoundState::InProgress));
        assert!(RoundState::InProgress.can_transition_to(RoundState::Finalized));
        assert!(RoundState::Upcoming.can_transition_to(RoundState::Deleted));
        assert!(RoundState::InProgress.can_transition_to(RoundState::Deleted));

        assert!(!RoundState::Finalized.can_transition_to(RoundState::Deleted));
        assert!(!RoundState::InProgress.can_transition_to(RoundState::Upcoming));
        assert!(!RoundState::Deleted.can_transition_to(RoundState::Upcoming));
        assert!(!RoundState::Upcoming.can_transition_to(RoundState::Finalized));
    }

    #[test]
    fn test_upsert_participant_is_keyed_by_user_id() {
        let mut round = round_with(vec![
            player("a", RsvpResponse::Accept, None),
            player("b", RsvpResponse::Tentative, None),
        ]);

        round.upsert_participant(player("a", RsvpResponse::Accept, Some(54)));

        assert_eq!(round.participants.len(), 2);
        assert_eq!(round.participants[0].user_id, "a");
        assert_eq!(round.participants[0].score, Some(54));
    }

    #[test]
    fn test_all_scores_submitted_exempts_declines() {
        let round = round_with(vec![
            player("a", RsvpResponse::Accept, Some(52)),
            player("b", RsvpResponse::Decline, None),
        ]);
        assert!(round.all_scores_submitted());

        let round = round_with(vec![
            player("a", RsvpResponse::Accept, Some(52)),
            player("b", RsvpResponse::Tentative, None),
        ]);
        assert!(!round.all_scores_submitted());
        assert_eq!(round.outstanding_scores(), 1);
    }

    #[test]
    fn test_all_scores_submitted_requires_a_scoring_participant() {
        let round = round_with(vec![player("a", RsvpResponse::Decline, None)]);
        assert!(!round.all_scores_submitted());
    }

    #[test]
    fn test_import_job_terminal_states() {
        assert!(ImportJobState::Applied.is_terminal());
        assert!(ImportJobState::Failed.is_terminal());
        assert!(!ImportJobState::Ingested.is_terminal());
    }
}
