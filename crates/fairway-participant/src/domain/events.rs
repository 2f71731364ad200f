//! Event payloads for the participant join saga.

use fairway_core::domain::{Participant, RsvpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user asked to join a round or change their RSVP.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantJoinRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being joined.
    pub round_id: Uuid,
    /// The joining user.
    pub user_id: String,
    /// The requested RSVP.
    pub response: RsvpResponse,
    /// Whether this is a late join; resolved during validation when absent.
    pub joined_late: Option<bool>,
}

/// A join or status update was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantJoinError {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round the request targeted.
    pub round_id: Uuid,
    /// The user whose request was rejected.
    pub user_id: String,
    /// Why.
    pub error: String,
}

/// Routing decision for an inbound join request. One variant per expected
/// continuation, so the handler's branch is checked exhaustively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum JoinRouting {
    /// The user is withdrawing from the round.
    Withdraw(ParticipantRemovalRequested),
    /// The request continues to validation.
    Validate(ParticipantJoinValidationRequested),
}

/// A join request that passed status routing and awaits validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantJoinValidationRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being joined.
    pub round_id: Uuid,
    /// The joining user.
    pub user_id: String,
    /// The requested RSVP.
    pub response: RsvpResponse,
    /// Whether this is a late join; resolved during validation when absent.
    pub joined_late: Option<bool>,
}

/// A join request that passed validation. Internal to the saga: the handler
/// decides between the tag lookup round-trip and a direct status update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantJoinValidated {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being joined.
    pub round_id: Uuid,
    /// The joining user.
    pub user_id: String,
    /// The requested RSVP.
    pub response: RsvpResponse,
    /// Whether the user is joining an in-progress round.
    pub joined_late: bool,
}

/// Request to the external ranking service. Carries the original response
/// and late-join flag so the resuming hop can reconstruct full intent; no
/// server-side session state exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTagLookupRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being joined.
    pub round_id: Uuid,
    /// The user whose tag is being resolved.
    pub user_id: String,
    /// The original RSVP, echoed back by the ranking service.
    pub response: RsvpResponse,
    /// The original late-join flag, echoed back by the ranking service.
    pub joined_late: bool,
}

/// The ranking service resolved a tag number.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTagLookupFound {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being joined.
    pub round_id: Uuid,
    /// The user whose tag was resolved.
    pub user_id: String,
    /// The resolved tag number.
    pub tag_number: u32,
    /// The original RSVP, echoed from the request.
    pub original_response: RsvpResponse,
    /// The original late-join flag, echoed from the request.
    pub joined_late: Option<bool>,
}

/// The ranking service has no tag for the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTagLookupNotFound {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being joined.
    pub round_id: Uuid,
    /// The user with no tag.
    pub user_id: String,
    /// The original RSVP, echoed from the request.
    pub original_response: RsvpResponse,
    /// The original late-join flag, echoed from the request.
    pub joined_late: Option<bool>,
}

/// The ranking service failed to answer. Fields are optional because the
/// upstream error path cannot always echo the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundTagLookupFailed {
    /// Tenant the round belongs to, when known.
    #[serde(default)]
    pub guild_id: String,
    /// The round being joined, when known.
    pub round_id: Option<Uuid>,
    /// The user being looked up, when known.
    #[serde(default)]
    pub user_id: String,
    /// The original RSVP, when echoed.
    pub original_response: Option<RsvpResponse>,
    /// The original late-join flag, when echoed.
    pub joined_late: Option<bool>,
    /// Why the lookup failed.
    #[serde(default)]
    pub reason: String,
}

/// A participant status update ready to persist: the shared entry point for
/// the decline short-circuit and all three tag lookup resumptions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantStatusUpdateRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round being joined.
    pub round_id: Uuid,
    /// The user being updated.
    pub user_id: String,
    /// The RSVP to record.
    pub response: RsvpResponse,
    /// The resolved tag number, if any.
    pub tag_number: Option<u32>,
    /// Whether the user is joining an in-progress round.
    pub joined_late: Option<bool>,
}

/// The participant joined (or their RSVP was updated).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundParticipantJoined {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round that was joined.
    pub round_id: Uuid,
    /// The full roster after the update.
    pub participants: Vec<Participant>,
    /// Whether the join happened after the round started.
    pub joined_late: Option<bool>,
}

/// A user asked to be removed from a round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRemovalRequested {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round to leave.
    pub round_id: Uuid,
    /// The user to remove.
    pub user_id: String,
}

/// The participant was removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundParticipantRemoved {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round that was left.
    pub round_id: Uuid,
    /// The removed user.
    pub user_id: String,
    /// The full roster after the removal.
    pub participants: Vec<Participant>,
}

/// The removal was rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantRemovalError {
    /// Tenant the round belongs to.
    pub guild_id: String,
    /// The round the removal targeted.
    pub round_id: Uuid,
    /// The user whose removal was rejected.
    pub user_id: String,
    /// Why.
    pub error: String,
}
