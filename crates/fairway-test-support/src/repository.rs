//! Test repositories — in-memory and failing implementations of the
//! repository contracts, honoring the optimistic transition rules a real
//! store would enforce.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use fairway_core::domain::{ImportJob, ImportJobState, Participant, Round, RoundState};
use fairway_core::error::RepositoryError;
use fairway_core::repository::{ImportJobRepository, RoundRepository};
use uuid::Uuid;

/// An in-memory `RoundRepository` keyed by (guild id, round id).
#[derive(Debug, Default)]
pub struct InMemoryRoundRepository {
    rounds: Mutex<HashMap<(String, Uuid), Round>>,
}

impl InMemoryRoundRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with `rounds`.
    #[must_use]
    pub fn with_rounds(rounds: Vec<Round>) -> Self {
        let map = rounds
            .into_iter()
            .map(|r| ((r.guild_id.clone(), r.round_id), r))
            .collect();
        Self {
            rounds: Mutex::new(map),
        }
    }

    /// Returns a snapshot of the stored round, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stored_round(&self, guild_id: &str, round_id: Uuid) -> Option<Round> {
        self.rounds
            .lock()
            .unwrap()
            .get(&(guild_id.to_owned(), round_id))
            .cloned()
    }
}

#[async_trait]
impl RoundRepository for InMemoryRoundRepository {
    async fn insert_round(&self, round: &Round) -> Result<(), RepositoryError> {
        let mut rounds = self.rounds.lock().unwrap();
        let key = (round.guild_id.clone(), round.round_id);
        if rounds.contains_key(&key) {
            return Err(RepositoryError::Conflict(format!(
                "round {} already exists",
                round.round_id
            )));
        }
        rounds.insert(key, round.clone());
        Ok(())
    }

    async fn fetch_round(&self, guild_id: &str, round_id: Uuid) -> Result<Round, RepositoryError> {
        self.rounds
            .lock()
            .unwrap()
            .get(&(guild_id.to_owned(), round_id))
            .cloned()
            .ok_or_else(|| RepositoryError::RoundNotFound {
                guild_id: guild_id.to_owned(),
                round_id,
            })
    }

    async fn save_round(&self, round: &Round) -> Result<(), RepositoryError> {
        let mut rounds = self.rounds.lock().unwrap();
        let key = (round.guild_id.clone(), round.round_id);
        match rounds.get_mut(&key) {
            Some(stored) => {
                *stored = round.clone();
                Ok(())
            }
            None => Err(RepositoryError::RoundNotFound {
                guild_id: round.guild_id.clone(),
                round_id: round.round_id,
            }),
        }
    }

    async fn transition_state(
        &self,
        guild_id: &str,
        round_id: Uuid,
        next: RoundState,
    ) -> Result<Round, RepositoryError> {
        let mut rounds = self.rounds.lock().unwrap();
        let round = rounds
            .get_mut(&(guild_id.to_owned(), round_id))
            .ok_or_else(|| RepositoryError::RoundNotFound {
                guild_id: guild_id.to_owned(),
                round_id,
            })?;
        if !round.state.can_transition_to(next) {
            return Err(RepositoryError::Conflict(format!(
                "cannot transition round {round_id} from {:?} to {next:?}",
                round.state
            )));
        }
        round.state = next;
        Ok(round.clone())
    }

    async fn upsert_participant(
        &self,
        guild_id: &str,
        round_id: Uuid,
        participant: Participant,
    ) -> Result<Round, RepositoryError> {
        let mut rounds = self.rounds.lock().unwrap();
        let round = rounds
            .get_mut(&(guild_id.to_owned(), round_id))
            .ok_or_else(|| RepositoryError::RoundNotFound {
                guild_id: guild_id.to_owned(),
                round_id,
            })?;
        round.upsert_participant(participant);
        Ok(round.clone())
    }

    async fn remove_participant(
        &self,
        guild_id: &str,
        round_id: Uuid,
        user_id: &str,
    ) -> Result<Round, RepositoryError> {
        let mut rounds = self.rounds.lock().unwrap();
        let round = rounds
            .get_mut(&(guild_id.to_owned(), round_id))
            .ok_or_else(|| RepositoryError::RoundNotFound {
                guild_id: guild_id.to_owned(),
                round_id,
            })?;
        if !round.remove_participant(user_id) {
            return Err(RepositoryError::NoRowsAffected);
        }
        Ok(round.clone())
    }

    async fn record_score(
        &self,
        guild_id: &str,
        round_id: Uuid,
        user_id: &str,
        score: i32,
    ) -> Result<Round, RepositoryError> {
        let mut rounds = self.rounds.lock().unwrap();
        let round = rounds
            .get_mut(&(guild_id.to_owned(), round_id))
            .ok_or_else(|| RepositoryError::RoundNotFound {
                guild_id: guild_id.to_owned(),
                round_id,
            })?;
        let Some(participant) = round
            .participants
            .iter_mut()
            .find(|p| p.user_id == user_id)
        else {
            return Err(RepositoryError::NoRowsAffected);
        };
        participant.score = Some(score);
        Ok(round.clone())
    }
}

/// A round repository that always returns an infrastructure error. Useful
/// for testing redelivery paths.
#[derive(Debug)]
pub struct FailingRoundRepository;

#[async_trait]
impl RoundRepository for FailingRoundRepository {
    async fn insert_round(&self, _round: &Round) -> Result<(), RepositoryError> {
        Err(RepositoryError::Infrastructure("connection refused".into()))
    }

    async fn fetch_round(
        &self,
        _guild_id: &str,
        _round_id: Uuid,
    ) -> Result<Round, RepositoryError> {
        Err(RepositoryError::Infrastructure("connection refused".into()))
    }

    async fn save_round(&self, _round: &Round) -> Result<(), RepositoryError> {
        Err(RepositoryError::Infrastructure("connection refused".into()))
    }

    async fn transition_state(
        &self,
        _guild_id: &str,
        _round_id: Uuid,
        _next: RoundState,
    ) -> Result<Round, RepositoryError> {
        Err(RepositoryError::Infrastructure("connection refused".into()))
    }

    async fn upsert_participant(
        &self,
        _guild_id: &str,
        _round_id: Uuid,
        _participant: Participant,
    ) -> Result<Round, RepositoryError> {
        Err(RepositoryError::Infrastructure("connection refused".into()))
    }

    async fn remove_participant(
        &self,
        _guild_id: &str,
        _round_id: Uuid,
        _user_id: &str,
    ) -> Result<Round, RepositoryError> {
        Err(RepositoryError::Infrastructure("connection refused".into()))
    }

    async fn record_score(
        &self,
        _guild_id: &str,
        _round_id: Uuid,
        _user_id: &str,
        _score: i32,
    ) -> Result<Round, RepositoryError> {
        Err(RepositoryError::Infrastructure("connection refused".into()))
    }
}

/// An in-memory `ImportJobRepository` keyed by import id.
#[derive(Debug, Default)]
pub struct InMemoryImportJobRepository {
    jobs: Mutex<HashMap<Uuid, ImportJob>>,
}

impl InMemoryImportJobRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-seeded with `jobs`.
    #[must_use]
    pub fn with_jobs(jobs: Vec<ImportJob>) -> Self {
        let map = jobs.into_iter().map(|j| (j.import_id, j)).collect();
        Self {
            jobs: Mutex::new(map),
        }
    }

    /// Returns a snapshot of the stored job, if any.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    #[must_use]
    pub fn stored_job(&self, import_id: Uuid) -> Option<ImportJob> {
        self.jobs.lock().unwrap().get(&import_id).cloned()
    }
}

#[async_trait]
impl ImportJobRepository for InMemoryImportJobRepository {
    async fn insert_job(&self, job: &ImportJob) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        if jobs.contains_key(&job.import_id) {
            return Err(RepositoryError::Conflict(format!(
                "import job {} already exists",
                job.import_id
            )));
        }
        jobs.insert(job.import_id, job.clone());
        Ok(())
    }

    async fn fetch_job(&self, import_id: Uuid) -> Result<ImportJob, RepositoryError> {
        self.jobs
            .lock()
            .unwrap()
            .get(&import_id)
            .cloned()
            .ok_or(RepositoryError::ImportJobNotFound(import_id))
    }

    async fn advance_job(
        &self,
        import_id: Uuid,
        next: ImportJobState,
    ) -> Result<ImportJob, RepositoryError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .get_mut(&import_id)
            .ok_or(RepositoryError::ImportJobNotFound(import_id))?;
        if job.state.is_terminal() || next <= job.state {
            return Err(RepositoryError::Conflict(format!(
                "cannot advance import job {import_id} from {:?} to {next:?}",
                job.state
            )));
        }
        job.state = next;
        Ok(job.clone())
    }
}
