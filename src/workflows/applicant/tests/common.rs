use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::workflows::applicant::dispatch::{EmailError, EmailGateway};
use crate::workflows::applicant::domain::{Answer, Application};
use crate::workflows::applicant::repository::InMemoryApplications;
use crate::workflows::applicant::service::{ApplicationService, ApplicationSubmission};
use crate::workflows::auth::domain::{AdministratorId, ApplicantId};
use crate::workflows::recruitment::domain::{
    ChoiceId, Progress, QuestionId, Recruitment, RecruitmentId,
};
use crate::workflows::recruitment::repository::{InMemoryRecruitments, RecruitmentRepository};

pub(super) const PUBLISHER: AdministratorId = AdministratorId(77);

pub(super) fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 9, 1)
        .expect("valid date")
        .and_hms_opt(10, 0, 0)
        .expect("valid time")
}

pub(super) fn deadline() -> NaiveDateTime {
    fixed_now() + Duration::hours(48)
}

pub(super) fn after_deadline() -> NaiveDateTime {
    deadline() + Duration::hours(1)
}

/// Seeds a recruitment at the given progress into the shared store.
pub(super) fn seed_recruitment(
    store: &InMemoryRecruitments,
    id: u64,
    progress: Progress,
) -> Recruitment {
    let mut recruitment = Recruitment::new(
        RecruitmentId(id),
        format!("crew-{id:06}"),
        "Backend Club".to_string(),
        "fixture".to_string(),
        deadline(),
        PUBLISHER,
        Vec::new(),
        fixed_now(),
    )
    .expect("valid fixture recruitment");

    if progress >= Progress::InProgress {
        recruitment.start().expect("fixture starts");
    }
    if progress >= Progress::Announced {
        recruitment.announce().expect("fixture announces");
    }
    if progress >= Progress::Completion {
        recruitment.close().expect("fixture closes");
    }

    store.insert(recruitment.clone()).expect("fixture inserts");
    recruitment
}

pub(super) fn submission(recruitment: RecruitmentId, email: &str) -> ApplicationSubmission {
    ApplicationSubmission {
        recruitment_id: recruitment,
        applicant_email: email.to_string(),
        answers: vec![
            Answer::Narrative {
                question_id: QuestionId(1),
                content: "I ship reliable services".to_string(),
            },
            Answer::Selective {
                question_id: QuestionId(2),
                choice_ids: vec![ChoiceId(10), ChoiceId(11)],
            },
        ],
    }
}

pub(super) type Service = ApplicationService<InMemoryApplications, InMemoryRecruitments>;

pub(super) fn build_service() -> (
    Arc<Service>,
    Arc<InMemoryApplications>,
    Arc<InMemoryRecruitments>,
) {
    let applications = Arc::new(InMemoryApplications::default());
    let recruitments = Arc::new(InMemoryRecruitments::default());
    let service = Arc::new(ApplicationService::new(
        applications.clone(),
        recruitments.clone(),
    ));
    (service, applications, recruitments)
}

/// Test double recording every delivery attempt. Recipients listed in
/// `failing` are rejected instead of recorded.
#[derive(Default)]
pub(super) struct RecordingGateway {
    pub sent: Mutex<Vec<(String, String)>>,
    pub failing: HashSet<String>,
}

impl RecordingGateway {
    pub fn failing_for(recipients: &[&str]) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: recipients.iter().map(|email| email.to_string()).collect(),
        }
    }

    pub fn recipients(&self) -> Vec<String> {
        self.sent
            .lock()
            .expect("gateway lock")
            .iter()
            .map(|(recipient, _)| recipient.clone())
            .collect()
    }
}

impl EmailGateway for RecordingGateway {
    fn send(&self, application: &Application, recruitment_title: &str) -> Result<(), EmailError> {
        if self.failing.contains(&application.applicant_email) {
            return Err(EmailError::Rejected {
                recipient: application.applicant_email.clone(),
                reason: "mailbox unavailable".to_string(),
            });
        }
        self.sent.lock().expect("gateway lock").push((
            application.applicant_email.clone(),
            recruitment_title.to_string(),
        ));
        Ok(())
    }
}

pub(super) fn applicant(id: u64) -> ApplicantId {
    ApplicantId(id)
}
