use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::info;

use super::outbox::{NotificationBatch, NotificationOutbox, OutboxError};
use super::repository::ApplicationRepository;
use crate::workflows::auth::domain::AdministratorId;
use crate::workflows::recruitment::domain::{InvalidStateError, RecruitmentId};
use crate::workflows::recruitment::repository::{RecruitmentRepository, RepositoryError};

/// Finalizes an outcome announcement: flips the recruitment to `Announced`
/// and stages exactly one notification batch per successful call. A repeated
/// call fails with no side effects.
pub struct OutcomeAnnouncer<R, A, O> {
    recruitments: Arc<R>,
    applications: Arc<A>,
    outbox: Arc<O>,
}

#[derive(Debug, thiserror::Error)]
pub enum AnnounceError {
    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Outbox(#[from] OutboxError),
    #[error("recruitment deadline {0} has not passed yet")]
    DeadlineNotPassed(NaiveDateTime),
}

/// What the administrator sees after a successful announcement. Delivery
/// failures never appear here; they surface only through tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnouncementSummary {
    pub recruitment_id: RecruitmentId,
    pub notified_applications: usize,
}

impl<R, A, O> OutcomeAnnouncer<R, A, O>
where
    R: RecruitmentRepository + 'static,
    A: ApplicationRepository + 'static,
    O: NotificationOutbox + 'static,
{
    pub fn new(recruitments: Arc<R>, applications: Arc<A>, outbox: Arc<O>) -> Self {
        Self {
            recruitments,
            applications,
            outbox,
        }
    }

    /// Announces the outcome of the recruitment published by `actor`.
    ///
    /// Guards, in order: the publisher must own a recruitment; re-entry is
    /// rejected while already `Announced`; the deadline must have passed;
    /// the recruitment must be `InProgress`. Only after the store write
    /// returns is the batch staged for the dispatcher.
    pub fn announce(
        &self,
        actor: AdministratorId,
        now: NaiveDateTime,
    ) -> Result<AnnouncementSummary, AnnounceError> {
        let mut recruitment = self
            .recruitments
            .find_by_publisher(actor)?
            .ok_or(RepositoryError::NotFound)?;

        if recruitment.is_announced() {
            return Err(InvalidStateError::AlreadyAnnounced.into());
        }
        if !recruitment.has_passed_deadline(now) {
            return Err(AnnounceError::DeadlineNotPassed(recruitment.deadline));
        }
        recruitment.announce()?;

        let applications = self
            .applications
            .find_all_by_recruitment(recruitment.id)?;

        // Commit point. The batch is staged only once this write succeeds,
        // never for a rolled-back transition.
        self.recruitments.update(recruitment.clone())?;

        let notified_applications = applications.len();
        self.outbox.stage(NotificationBatch {
            recruitment_id: recruitment.id,
            recruitment_title: recruitment.title.clone(),
            applications,
        })?;

        info!(
            recruitment = %recruitment.id,
            applications = notified_applications,
            "recruitment outcome announced"
        );

        Ok(AnnouncementSummary {
            recruitment_id: recruitment.id,
            notified_applications,
        })
    }
}
