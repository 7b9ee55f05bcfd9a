use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use super::domain::{Administrator, AdministratorId, Applicant, ApplicantId};
use crate::workflows::recruitment::domain::RecruitmentId;
use crate::workflows::recruitment::repository::RepositoryError;

/// Administrator identities, unique by club name.
pub trait AdministratorRepository: Send + Sync {
    /// Assigns the identifier; a duplicate club name is a `Conflict` so
    /// concurrent first logins cannot create two identities.
    fn insert(&self, club_name: &str, password: &str) -> Result<Administrator, RepositoryError>;
    fn find_by_club_name(&self, club_name: &str) -> Result<Option<Administrator>, RepositoryError>;
}

/// Applicant identities, unique by email within one recruitment.
pub trait ApplicantRepository: Send + Sync {
    fn insert(
        &self,
        email: &str,
        password: &str,
        recruitment_id: RecruitmentId,
    ) -> Result<Applicant, RepositoryError>;
    fn find_by_email_and_recruitment(
        &self,
        email: &str,
        recruitment_id: RecruitmentId,
    ) -> Result<Option<Applicant>, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<Applicant>, RepositoryError>;
}

#[derive(Default)]
pub struct InMemoryAdministrators {
    records: Mutex<Vec<Administrator>>,
    sequence: AtomicU64,
}

impl AdministratorRepository for InMemoryAdministrators {
    fn insert(&self, club_name: &str, password: &str) -> Result<Administrator, RepositoryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("administrator store lock poisoned".to_string()))?;
        if records.iter().any(|admin| admin.club_name == club_name) {
            return Err(RepositoryError::Conflict);
        }
        let administrator = Administrator {
            id: AdministratorId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1),
            club_name: club_name.to_owned(),
            password: password.to_owned(),
        };
        records.push(administrator.clone());
        Ok(administrator)
    }

    fn find_by_club_name(&self, club_name: &str) -> Result<Option<Administrator>, RepositoryError> {
        let records = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("administrator store lock poisoned".to_string()))?;
        Ok(records.iter().find(|admin| admin.club_name == club_name).cloned())
    }
}

#[derive(Default)]
pub struct InMemoryApplicants {
    records: Mutex<Vec<Applicant>>,
    sequence: AtomicU64,
}

impl ApplicantRepository for InMemoryApplicants {
    fn insert(
        &self,
        email: &str,
        password: &str,
        recruitment_id: RecruitmentId,
    ) -> Result<Applicant, RepositoryError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("applicant store lock poisoned".to_string()))?;
        let duplicate = records
            .iter()
            .any(|applicant| applicant.email == email && applicant.recruitment_id == recruitment_id);
        if duplicate {
            return Err(RepositoryError::Conflict);
        }
        let applicant = Applicant {
            id: ApplicantId(self.sequence.fetch_add(1, Ordering::Relaxed) + 1),
            email: email.to_owned(),
            password: password.to_owned(),
            recruitment_id,
        };
        records.push(applicant.clone());
        Ok(applicant)
    }

    fn find_by_email_and_recruitment(
        &self,
        email: &str,
        recruitment_id: RecruitmentId,
    ) -> Result<Option<Applicant>, RepositoryError> {
        let records = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("applicant store lock poisoned".to_string()))?;
        Ok(records
            .iter()
            .find(|applicant| applicant.email == email && applicant.recruitment_id == recruitment_id)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Applicant>, RepositoryError> {
        let records = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("applicant store lock poisoned".to_string()))?;
        Ok(records.iter().find(|applicant| applicant.email == email).cloned())
    }
}
