//! Scorecard parser collaborator contract.
//!
//! The concrete parsers (per file format, plus URL fetching) live outside
//! this layer; the pipeline only depends on bytes-to-rows.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::events::{ParsedScoreRow, ScorecardSource};

/// Why a parse attempt produced no rows.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The source is not a scorecard this parser understands. Not retryable.
    #[error("malformed scorecard: {0}")]
    Malformed(String),
    /// The parser could not be reached or could not fetch the source.
    /// Retryable via redelivery.
    #[error("parser unavailable: {0}")]
    Unavailable(String),
}

/// Turns a scorecard source into normalized rows.
#[async_trait]
pub trait ScorecardParser: Send + Sync {
    /// Parses `source` into rows.
    ///
    /// # Errors
    ///
    /// `Malformed` when the source is not a readable scorecard,
    /// `Unavailable` on transient collaborator faults.
    async fn parse(&self, source: &ScorecardSource) -> Result<Vec<ParsedScoreRow>, ParseError>;
}
