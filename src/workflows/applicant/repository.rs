use std::collections::HashMap;
use std::sync::Mutex;

use super::domain::{Application, ApplicationId};
use crate::workflows::auth::domain::ApplicantId;
use crate::workflows::recruitment::domain::RecruitmentId;
use crate::workflows::recruitment::repository::RepositoryError;

/// Storage abstraction for submitted applications.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn find_by_applicant(&self, applicant: ApplicantId)
        -> Result<Option<Application>, RepositoryError>;
    fn find_all_by_recruitment(
        &self,
        recruitment: RecruitmentId,
    ) -> Result<Vec<Application>, RepositoryError>;
    fn count_by_recruitment(&self, recruitment: RecruitmentId) -> Result<usize, RepositoryError>;
}

#[derive(Default)]
pub struct InMemoryApplications {
    records: Mutex<HashMap<ApplicationId, Application>>,
}

impl InMemoryApplications {
    fn lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<ApplicationId, Application>>, RepositoryError>
    {
        self.records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("application store lock poisoned".to_string()))
    }
}

impl ApplicationRepository for InMemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut records = self.lock()?;
        let duplicate = records.values().any(|existing| {
            existing.id == application.id
                || (existing.applicant_id == application.applicant_id
                    && existing.recruitment_id == application.recruitment_id)
        });
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        records.insert(application.id, application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut records = self.lock()?;
        if !records.contains_key(&application.id) {
            return Err(RepositoryError::NotFound);
        }
        records.insert(application.id, application);
        Ok(())
    }

    fn fetch(&self, id: ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Ok(self.lock()?.get(&id).cloned())
    }

    fn find_by_applicant(
        &self,
        applicant: ApplicantId,
    ) -> Result<Option<Application>, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .find(|application| application.applicant_id == applicant)
            .cloned())
    }

    fn find_all_by_recruitment(
        &self,
        recruitment: RecruitmentId,
    ) -> Result<Vec<Application>, RepositoryError> {
        let mut applications: Vec<Application> = self
            .lock()?
            .values()
            .filter(|application| application.recruitment_id == recruitment)
            .cloned()
            .collect();
        applications.sort_by_key(|application| application.id.0);
        Ok(applications)
    }

    fn count_by_recruitment(&self, recruitment: RecruitmentId) -> Result<usize, RepositoryError> {
        Ok(self
            .lock()?
            .values()
            .filter(|application| application.recruitment_id == recruitment)
            .count())
    }
}
