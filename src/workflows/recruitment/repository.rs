use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::{Recruitment, RecruitmentId};
use crate::workflows::auth::domain::AdministratorId;

/// Error enumeration shared by the relational-store abstractions.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for recruitment aggregates. Implementations must
/// persist the aggregate together with its owned subtree atomically: an
/// `update` replaces the entire prior subtree, never a part of it.
pub trait RecruitmentRepository: Send + Sync {
    /// Inserts a new aggregate. A publisher owns at most one recruitment, so
    /// a second insert for the same publisher is a `Conflict`.
    fn insert(&self, recruitment: Recruitment) -> Result<Recruitment, RepositoryError>;
    fn update(&self, recruitment: Recruitment) -> Result<(), RepositoryError>;
    fn fetch(&self, id: RecruitmentId) -> Result<Option<Recruitment>, RepositoryError>;
    /// Like `fetch`, but guaranteed to hydrate the owned subtree.
    fn fetch_with_sections(&self, id: RecruitmentId)
        -> Result<Option<Recruitment>, RepositoryError>;
    fn find_by_publisher(
        &self,
        publisher: AdministratorId,
    ) -> Result<Option<Recruitment>, RepositoryError>;
    fn find_by_code(&self, code: &str) -> Result<Option<Recruitment>, RepositoryError>;
    /// Removes the aggregate and, by ownership, its entire subtree.
    fn delete(&self, id: RecruitmentId) -> Result<(), RepositoryError>;
}

/// In-process store used by the demo server and tests. Each aggregate is held
/// as one value, so subtree replacement is atomic by construction.
#[derive(Default)]
pub struct InMemoryRecruitments {
    records: Mutex<HashMap<RecruitmentId, Recruitment>>,
}

impl InMemoryRecruitments {
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<RecruitmentId, Recruitment>>, RepositoryError> {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("recruitment store lock poisoned".to_string()))
    }
}

impl RecruitmentRepository for InMemoryRecruitments {
    fn insert(&self, recruitment: Recruitment) -> Result<Recruitment, RepositoryError> {
        let mut records = self.lock()?;
        let duplicate = records.values().any(|existing| {
            existing.id == recruitment.id || existing.publisher == recruitment.publisher
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        records.insert(recruitment.id, recruitment.clone());
        Ok(recruitment)
    }

    fn update(&self, recruitment: Recruitment) -> Result<(), RepositoryError> {
        let mut records = self.lock()?;
        if !records.contains_key(&recruitment.id) {
            return Err(RepositoryError::NotFound);
        }
        records.insert(recruitment.id, recruitment);
        Ok(())
    }

    fn fetch(&self, id: RecruitmentId) -> Result<Option<Recruitment>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn fetch_with_sections(
        &self,
        id: RecruitmentId,
    ) -> Result<Option<Recruitment>, RepositoryError> {
        // The in-memory store always holds the full aggregate.
        self.fetch(id)
    }

    fn find_by_publisher(
        &self,
        publisher: AdministratorId,
    ) -> Result<Option<Recruitment>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|recruitment| recruitment.publisher == publisher)
            .cloned())
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Recruitment>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|recruitment| recruitment.code == code)
            .cloned())
    }

    fn delete(&self, id: RecruitmentId) -> Result<(), RepositoryError> {
        match self.lock()?.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::NotFound),
        }
    }
}
