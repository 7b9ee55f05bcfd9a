use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Deserialize;

use super::domain::{Answer, Application, ApplicationId, Outcome};
use super::repository::ApplicationRepository;
use crate::workflows::auth::domain::{AdministratorId, ApplicantId};
use crate::workflows::recruitment::domain::{InvalidStateError, Progress, RecruitmentId};
use crate::workflows::recruitment::repository::{RecruitmentRepository, RepositoryError};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    ApplicationId(APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationSubmission {
    pub recruitment_id: RecruitmentId,
    pub applicant_email: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// Intake and scoring of applications, ahead of announcement.
pub struct ApplicationService<A, R> {
    applications: Arc<A>,
    recruitments: Arc<R>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("recruitment deadline {0} has passed")]
    DeadlinePassed(NaiveDateTime),
    #[error("administrator {actor} is not the publisher of recruitment {recruitment}")]
    NotPublisher {
        actor: AdministratorId,
        recruitment: RecruitmentId,
    },
}

impl<A, R> ApplicationService<A, R>
where
    A: ApplicationRepository + 'static,
    R: RecruitmentRepository + 'static,
{
    pub fn new(applications: Arc<A>, recruitments: Arc<R>) -> Self {
        Self {
            applications,
            recruitments,
        }
    }

    /// Submits an application while the recruitment is `InProgress` and the
    /// deadline has not passed. One application per applicant.
    pub fn submit(
        &self,
        applicant: ApplicantId,
        submission: ApplicationSubmission,
        now: NaiveDateTime,
    ) -> Result<Application, ApplicationServiceError> {
        let recruitment = self
            .recruitments
            .fetch(submission.recruitment_id)?
            .ok_or(RepositoryError::NotFound)?;

        if recruitment.progress != Progress::InProgress {
            return Err(InvalidStateError::WrongProgress {
                action: "apply",
                required: Progress::InProgress,
                actual: recruitment.progress,
            }
            .into());
        }
        if recruitment.has_passed_deadline(now) {
            return Err(ApplicationServiceError::DeadlinePassed(recruitment.deadline));
        }

        let application = Application {
            id: next_application_id(),
            applicant_id: applicant,
            recruitment_id: recruitment.id,
            applicant_email: submission.applicant_email,
            answers: submission.answers,
            outcome: Outcome::Pending,
        };
        let stored = self.applications.insert(application)?;
        Ok(stored)
    }

    /// Publisher sets the pass/fail outcome on one application. Permitted
    /// only before the outcome has been announced.
    pub fn decide(
        &self,
        actor: AdministratorId,
        application_id: ApplicationId,
        outcome: Outcome,
    ) -> Result<Application, ApplicationServiceError> {
        let mut application = self
            .applications
            .fetch(application_id)?
            .ok_or(RepositoryError::NotFound)?;

        let recruitment = self
            .recruitments
            .fetch(application.recruitment_id)?
            .ok_or(RepositoryError::NotFound)?;
        if !recruitment.is_published_by(actor) {
            return Err(ApplicationServiceError::NotPublisher {
                actor,
                recruitment: recruitment.id,
            });
        }
        if recruitment.is_announced() {
            return Err(InvalidStateError::AlreadyAnnounced.into());
        }

        application.outcome = outcome;
        self.applications.update(application.clone())?;
        Ok(application)
    }

    pub fn get(&self, id: ApplicationId) -> Result<Application, ApplicationServiceError> {
        let application = self
            .applications
            .fetch(id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(application)
    }

    pub fn count(&self, recruitment: RecruitmentId) -> Result<usize, ApplicationServiceError> {
        Ok(self.applications.count_by_recruitment(recruitment)?)
    }
}
