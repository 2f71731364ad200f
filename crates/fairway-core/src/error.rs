//! Error taxonomy for the saga layer.
//!
//! Four layers of failure are kept distinct: repository faults, collaborator
//! call faults, handler contract violations, and publish faults. Expected
//! business rejections are *not* errors — they travel as the failure arm of
//! an [`crate::outcome::OperationResult`].

use thiserror::Error;
use uuid::Uuid;

/// Errors returned by the repository collaborator.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The requested round does not exist in the guild.
    #[error("round {round_id} not found in guild {guild_id}")]
    RoundNotFound {
        /// The guild that was queried.
        guild_id: String,
        /// The round that was queried.
        round_id: Uuid,
    },

    /// The requested import job does not exist.
    #[error("import job {0} not found")]
    ImportJobNotFound(Uuid),

    /// The write matched no rows (e.g. scoring a user who never joined).
    #[error("no rows affected")]
    NoRowsAffected,

    /// An optimistic state transition was rejected.
    #[error("conflicting state transition: {0}")]
    Conflict(String),

    /// A storage-level fault.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Call-level fault from a collaborating service. Distinct from a populated
/// failure arm, which is an expected business rejection.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The repository collaborator faulted.
    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Any other collaborator fault.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

/// Error returned by a saga handler to the dispatcher. Never published as an
/// event; the dispatcher leaves the inbound message for redelivery.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The single collaborating call faulted.
    #[error("collaborator call failed: {0}")]
    Service(#[from] ServiceError),

    /// An operation result violated the success-xor-failure contract.
    #[error("operation result contract violated: {0}")]
    Contract(&'static str),
}

/// Errors raised while publishing an envelope.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Guild-scoped publishing was attempted without a guild id.
    #[error("guild-scoped publish requires a non-empty guild id")]
    MissingGuildId,

    /// The underlying transport faulted.
    #[error("transport error: {0}")]
    Transport(String),
}
