//! Saga handlers for the scorecard import pipeline.

use fairway_core::envelope::{HandlerContext, HandlerResult};
use fairway_core::error::HandlerError;
use fairway_core::outcome::map_operation_result;
use fairway_core::topics;
use fairway_score::domain::events::ScoreCompleteness;

use crate::application::service::ImportService;
use crate::domain::events::{
    ImportCompleted, IngestNormalizedScorecard, ScorecardParseRequested, ScorecardSource,
    ScorecardUploaded, ScorecardUrlRequested,
};

/// `ScorecardUploaded` → create job → `ScorecardParseRequested` |
/// `ImportFailed`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_scorecard_uploaded(
    service: &dyn ImportService,
    _ctx: &HandlerContext,
    payload: ScorecardUploaded,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let request = ScorecardParseRequested {
        import_id: payload.import_id,
        guild_id: payload.guild_id,
        round_id: payload.round_id,
        source: ScorecardSource::File {
            filename: payload.filename,
            content: payload.content,
        },
    };
    let outcome = service.create_job(&request).await?;
    map_operation_result(
        outcome,
        topics::SCORECARD_PARSE_REQUESTED,
        topics::IMPORT_FAILED,
    )
}

/// `ScorecardUrlRequested` → create job → `ScorecardParseRequested` |
/// `ImportFailed`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_scorecard_url_requested(
    service: &dyn ImportService,
    _ctx: &HandlerContext,
    payload: ScorecardUrlRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let request = ScorecardParseRequested {
        import_id: payload.import_id,
        guild_id: payload.guild_id,
        round_id: payload.round_id,
        source: ScorecardSource::Url { url: payload.url },
    };
    let outcome = service.create_job(&request).await?;
    map_operation_result(
        outcome,
        topics::SCORECARD_PARSE_REQUESTED,
        topics::IMPORT_FAILED,
    )
}

/// `ScorecardParseRequested` → parse via the parser collaborator →
/// `ScorecardParsedForUser` | `ScorecardParseFailed`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_parse_requested(
    service: &dyn ImportService,
    _ctx: &HandlerContext,
    payload: ScorecardParseRequested,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.parse_scorecard(&payload).await?;
    map_operation_result(
        outcome,
        topics::SCORECARD_PARSED_FOR_USER,
        topics::SCORECARD_PARSE_FAILED,
    )
}

/// `IngestNormalizedScorecard` → record the ingest → `ImportCompleted` |
/// `ImportFailed`.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_ingest_normalized(
    service: &dyn ImportService,
    _ctx: &HandlerContext,
    payload: IngestNormalizedScorecard,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.ingest(&payload).await?;
    map_operation_result(outcome, topics::IMPORT_COMPLETED, topics::IMPORT_FAILED)
}

/// `ImportCompleted` → apply scores to the round → `RoundAllScoresSubmitted`
/// | `RoundScoresPartiallySubmitted` | `ImportFailed`. Re-enters the
/// finalization saga through the same topics as direct score submission.
///
/// # Errors
///
/// Propagates collaborator faults and contract violations for redelivery.
pub async fn handle_import_completed(
    service: &dyn ImportService,
    _ctx: &HandlerContext,
    payload: ImportCompleted,
) -> Result<Vec<HandlerResult>, HandlerError> {
    let outcome = service.apply_scores(&payload).await?;
    match (outcome.success, outcome.failure) {
        (Some(_), Some(_)) => Err(HandlerError::Contract(
            "operation result populated both arms",
        )),
        (None, None) => Err(HandlerError::Contract(
            "operation result populated neither arm",
        )),
        (Some(ScoreCompleteness::AllSubmitted(all)), None) => Ok(vec![HandlerResult::new(
            topics::ROUND_ALL_SCORES_SUBMITTED,
            &all,
        )]),
        (Some(ScoreCompleteness::Partial(partial)), None) => Ok(vec![HandlerResult::new(
            topics::ROUND_SCORES_PARTIALLY_SUBMITTED,
            &partial,
        )]),
        (None, Some(error)) => Ok(vec![HandlerResult::new(topics::IMPORT_FAILED, &error)]),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use fairway_core::domain::{
        ImportJob, ImportJobState, Participant, Round, RoundState, RsvpResponse,
    };
    use fairway_core::envelope::HandlerContext;
    use fairway_core::error::HandlerError;
    use fairway_core::topics;
    use fairway_test_support::{InMemoryImportJobRepository, InMemoryRoundRepository};
    use uuid::Uuid;

    use crate::application::handlers::{
        handle_import_completed, handle_ingest_normalized, handle_parse_requested,
        handle_scorecard_uploaded,
    };
    use crate::application::service::ImportServiceImpl;
    use crate::domain::events::{
        ImportCompleted, IngestNormalizedScorecard, MatchedScore, ParsedScoreRow,
        ScorecardParseRequested, ScorecardSource, ScorecardUploaded,
    };
    use crate::parser::{ParseError, ScorecardParser};

    /// A parser that replays a canned outcome.
    struct StubParser(Result<Vec<ParsedScoreRow>, &'static str>);

    #[async_trait]
    impl ScorecardParser for StubParser {
        async fn parse(
            &self,
            _source: &ScorecardSource,
        ) -> Result<Vec<ParsedScoreRow>, ParseError> {
            match &self.0 {
                Ok(rows) => Ok(rows.clone()),
                Err(reason) => Err(ParseError::Malformed((*reason).to_owned())),
            }
        }
    }

    /// A parser whose collaborator is down.
    struct UnavailableParser;

    #[async_trait]
    impl ScorecardParser for UnavailableParser {
        async fn parse(
            &self,
            _source: &ScorecardSource,
        ) -> Result<Vec<ParsedScoreRow>, ParseError> {
            Err(ParseError::Unavailable("parser timeout".to_owned()))
        }
    }

    fn in_progress_round(participants: Vec<Participant>) -> Round {
        Round {
            guild_id: "g1".to_owned(),
            round_id: Uuid::new_v4(),
            title: "Saturday round".to_owned(),
            description: None,
            location: None,
            start_time: Utc.with_ymd_and_hms(2026, 6, 2, 9, 0, 0).unwrap(),
            state: RoundState::InProgress,
            created_by: "creator".to_owned(),
            participants,
            event_message_id: None,
            calendar_event_id: None,
        }
    }

    fn player(user_id: &str, score: Option<i32>) -> Participant {
        Participant {
            user_id: user_id.to_owned(),
            tag_number: None,
            response: RsvpResponse::Accept,
            score,
        }
    }

    fn rows(entries: &[(&str, i32)]) -> Vec<ParsedScoreRow> {
        entries
            .iter()
            .map(|(name, score)| ParsedScoreRow {
                display_name: (*name).to_owned(),
                score: *score,
            })
            .collect()
    }

    fn service(
        rounds: Arc<InMemoryRoundRepository>,
        jobs: Arc<InMemoryImportJobRepository>,
        parser: impl ScorecardParser + 'static,
    ) -> ImportServiceImpl {
        ImportServiceImpl::new(rounds, jobs, Arc::new(parser))
    }

    fn upload(import_id: Uuid, round_id: Uuid) -> ScorecardUploaded {
        ScorecardUploaded {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            filename: "scorecard.csv".to_owned(),
            content: b"alice,-3\nbob,1\n".to_vec(),
        }
    }

    fn parse_request(import_id: Uuid, round_id: Uuid) -> ScorecardParseRequested {
        ScorecardParseRequested {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            source: ScorecardSource::File {
                filename: "scorecard.csv".to_owned(),
                content: b"alice,-3\nbob,1\n".to_vec(),
            },
        }
    }

    #[tokio::test]
    async fn test_upload_creates_job_and_requests_parse() {
        // Arrange
        let jobs = Arc::new(InMemoryImportJobRepository::new());
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs.clone(),
            StubParser(Ok(vec![])),
        );
        let import_id = Uuid::new_v4();

        // Act
        let results = handle_scorecard_uploaded(
            &service,
            &HandlerContext::default(),
            upload(import_id, Uuid::new_v4()),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::SCORECARD_PARSE_REQUESTED);
        let job = jobs.stored_job(import_id).unwrap();
        assert_eq!(job.state, ImportJobState::Uploaded);
    }

    #[tokio::test]
    async fn test_replayed_upload_continues_against_open_job() {
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Uploaded,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs,
            StubParser(Ok(vec![])),
        );

        let results = handle_scorecard_uploaded(
            &service,
            &HandlerContext::default(),
            upload(import_id, round_id),
        )
        .await
        .unwrap();

        assert_eq!(results[0].topic, topics::SCORECARD_PARSE_REQUESTED);
    }

    #[tokio::test]
    async fn test_upload_against_finished_job_fails() {
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Applied,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs,
            StubParser(Ok(vec![])),
        );

        let results = handle_scorecard_uploaded(
            &service,
            &HandlerContext::default(),
            upload(import_id, round_id),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::IMPORT_FAILED);
    }

    #[tokio::test]
    async fn test_parse_advances_job_and_emits_rows() {
        // Arrange
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Uploaded,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs.clone(),
            StubParser(Ok(rows(&[("alice", -3), ("bob", 1)]))),
        );

        // Act
        let results = handle_parse_requested(
            &service,
            &HandlerContext::default(),
            parse_request(import_id, round_id),
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::SCORECARD_PARSED_FOR_USER);
        assert_eq!(results[0].payload["rows"].as_array().unwrap().len(), 2);
        assert_eq!(jobs.stored_job(import_id).unwrap().state, ImportJobState::Parsed);
    }

    #[tokio::test]
    async fn test_malformed_scorecard_fails_the_job() {
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Uploaded,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs.clone(),
            StubParser(Err("not a scorecard")),
        );

        let results = handle_parse_requested(
            &service,
            &HandlerContext::default(),
            parse_request(import_id, round_id),
        )
        .await
        .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::SCORECARD_PARSE_FAILED);
        assert_eq!(results[0].payload["error"], "not a scorecard");
        assert_eq!(jobs.stored_job(import_id).unwrap().state, ImportJobState::Failed);
    }

    #[tokio::test]
    async fn test_unavailable_parser_propagates_for_redelivery() {
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Uploaded,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs.clone(),
            UnavailableParser,
        );

        let err = handle_parse_requested(
            &service,
            &HandlerContext::default(),
            parse_request(import_id, round_id),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, HandlerError::Service(_)));
        // The job is untouched; the message will come back.
        assert_eq!(jobs.stored_job(import_id).unwrap().state, ImportJobState::Uploaded);
    }

    #[tokio::test]
    async fn test_ingest_carries_scores_into_completion() {
        // Arrange
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Parsed,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs.clone(),
            StubParser(Ok(vec![])),
        );
        let payload = IngestNormalizedScorecard {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            scores: vec![MatchedScore {
                user_id: "u1".to_owned(),
                score: -3,
            }],
        };

        // Act
        let results = handle_ingest_normalized(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::IMPORT_COMPLETED);
        assert_eq!(results[0].payload["scores"].as_array().unwrap().len(), 1);
        assert_eq!(jobs.stored_job(import_id).unwrap().state, ImportJobState::Ingested);
    }

    #[tokio::test]
    async fn test_ingest_with_no_matches_fails_the_job() {
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Parsed,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs.clone(),
            StubParser(Ok(vec![])),
        );
        let payload = IngestNormalizedScorecard {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            scores: vec![],
        };

        let results = handle_ingest_normalized(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        assert_eq!(results[0].topic, topics::IMPORT_FAILED);
        assert_eq!(jobs.stored_job(import_id).unwrap().state, ImportJobState::Failed);
    }

    #[tokio::test]
    async fn test_replayed_ingest_against_applied_job_reemits() {
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Applied,
        }]));
        let service = service(
            Arc::new(InMemoryRoundRepository::new()),
            jobs,
            StubParser(Ok(vec![])),
        );
        let payload = IngestNormalizedScorecard {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            scores: vec![MatchedScore {
                user_id: "u1".to_owned(),
                score: -3,
            }],
        };

        let results = handle_ingest_normalized(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::IMPORT_COMPLETED);
    }

    #[tokio::test]
    async fn test_applied_import_bridges_into_finalization() {
        // Arrange: the imported scores complete the round.
        let round = in_progress_round(vec![player("u1", None), player("u2", None)]);
        let round_id = round.round_id;
        let import_id = Uuid::new_v4();
        let rounds = Arc::new(InMemoryRoundRepository::with_rounds(vec![round]));
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Ingested,
        }]));
        let service = service(rounds.clone(), jobs.clone(), StubParser(Ok(vec![])));
        let payload = ImportCompleted {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            scores: vec![
                MatchedScore {
                    user_id: "u1".to_owned(),
                    score: -3,
                },
                MatchedScore {
                    user_id: "u2".to_owned(),
                    score: 1,
                },
            ],
        };

        // Act
        let results = handle_import_completed(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        // Assert
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].topic, topics::ROUND_ALL_SCORES_SUBMITTED);
        assert_eq!(jobs.stored_job(import_id).unwrap().state, ImportJobState::Applied);
        let stored = rounds.stored_round("g1", round_id).unwrap();
        assert_eq!(stored.participant("u1").unwrap().score, Some(-3));
        assert_eq!(stored.participant("u2").unwrap().score, Some(1));
    }

    #[tokio::test]
    async fn test_partial_import_parks_the_round() {
        let round = in_progress_round(vec![player("u1", None), player("u2", None)]);
        let round_id = round.round_id;
        let import_id = Uuid::new_v4();
        let rounds = Arc::new(InMemoryRoundRepository::with_rounds(vec![round]));
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Ingested,
        }]));
        let service = service(rounds, jobs, StubParser(Ok(vec![])));
        let payload = ImportCompleted {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            scores: vec![MatchedScore {
                user_id: "u1".to_owned(),
                score: -3,
            }],
        };

        let results = handle_import_completed(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        assert_eq!(results[0].topic, topics::ROUND_SCORES_PARTIALLY_SUBMITTED);
        assert_eq!(results[0].payload["remaining"], 1);
    }

    #[tokio::test]
    async fn test_scores_for_non_participants_are_skipped() {
        let round = in_progress_round(vec![player("u1", None)]);
        let round_id = round.round_id;
        let import_id = Uuid::new_v4();
        let rounds = Arc::new(InMemoryRoundRepository::with_rounds(vec![round]));
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Ingested,
        }]));
        let service = service(rounds.clone(), jobs, StubParser(Ok(vec![])));
        let payload = ImportCompleted {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            scores: vec![
                MatchedScore {
                    user_id: "u1".to_owned(),
                    score: -3,
                },
                MatchedScore {
                    user_id: "stranger".to_owned(),
                    score: 9,
                },
            ],
        };

        let results = handle_import_completed(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        assert_eq!(results[0].topic, topics::ROUND_ALL_SCORES_SUBMITTED);
        let stored = rounds.stored_round("g1", round_id).unwrap();
        assert_eq!(stored.participants.len(), 1);
    }

    #[tokio::test]
    async fn test_import_against_missing_round_fails() {
        let import_id = Uuid::new_v4();
        let round_id = Uuid::new_v4();
        let jobs = Arc::new(InMemoryImportJobRepository::with_jobs(vec![ImportJob {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            state: ImportJobState::Ingested,
        }]));
        let service = service(Arc::new(InMemoryRoundRepository::new()), jobs.clone(), StubParser(Ok(vec![])));
        let payload = ImportCompleted {
            import_id,
            guild_id: "g1".to_owned(),
            round_id,
            scores: vec![MatchedScore {
                user_id: "u1".to_owned(),
                score: -3,
            }],
        };

        let results = handle_import_completed(&service, &HandlerContext::default(), payload)
            .await
            .unwrap();

        assert_eq!(results[0].topic, topics::IMPORT_FAILED);
        assert_eq!(jobs.stored_job(import_id).unwrap().state, ImportJobState::Failed);
    }
}
