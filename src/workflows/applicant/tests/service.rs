use chrono::Duration;

use super::common::*;
use crate::workflows::applicant::domain::Outcome;
use crate::workflows::applicant::repository::ApplicationRepository;
use crate::workflows::applicant::service::ApplicationServiceError;
use crate::workflows::auth::domain::AdministratorId;
use crate::workflows::recruitment::domain::{InvalidStateError, Progress};
use crate::workflows::recruitment::repository::{RecruitmentRepository, RepositoryError};

#[test]
fn submit_stores_pending_application_with_answers() {
    let (service, applications, recruitments) = build_service();
    let recruitment = seed_recruitment(&recruitments, 1, Progress::InProgress);

    let stored = service
        .submit(
            applicant(1),
            submission(recruitment.id, "dev@example.com"),
            fixed_now(),
        )
        .expect("submission succeeds");

    assert_eq!(stored.outcome, Outcome::Pending);
    assert_eq!(stored.applicant_email, "dev@example.com");
    assert_eq!(stored.answers.len(), 2);

    let fetched = applications
        .fetch(stored.id)
        .expect("fetch succeeds")
        .expect("application persisted");
    assert_eq!(fetched, stored);
}

#[test]
fn submit_requires_in_progress() {
    let (service, _, recruitments) = build_service();
    let recruitment = seed_recruitment(&recruitments, 2, Progress::Ready);

    match service.submit(
        applicant(1),
        submission(recruitment.id, "dev@example.com"),
        fixed_now(),
    ) {
        Err(ApplicationServiceError::InvalidState(InvalidStateError::WrongProgress {
            action: "apply",
            required: Progress::InProgress,
            actual: Progress::Ready,
        })) => {}
        other => panic!("expected wrong progress, got {other:?}"),
    }
}

#[test]
fn submit_rejected_after_deadline() {
    let (service, _, recruitments) = build_service();
    let recruitment = seed_recruitment(&recruitments, 3, Progress::InProgress);

    match service.submit(
        applicant(1),
        submission(recruitment.id, "dev@example.com"),
        after_deadline(),
    ) {
        Err(ApplicationServiceError::DeadlinePassed(at)) => assert_eq!(at, deadline()),
        other => panic!("expected deadline rejection, got {other:?}"),
    }
}

#[test]
fn submit_accepted_exactly_at_deadline() {
    let (service, _, recruitments) = build_service();
    let recruitment = seed_recruitment(&recruitments, 4, Progress::InProgress);

    service
        .submit(
            applicant(1),
            submission(recruitment.id, "dev@example.com"),
            deadline(),
        )
        .expect("deadline instant is still open");
}

#[test]
fn one_application_per_applicant_and_recruitment() {
    let (service, _, recruitments) = build_service();
    let recruitment = seed_recruitment(&recruitments, 5, Progress::InProgress);

    service
        .submit(
            applicant(1),
            submission(recruitment.id, "dev@example.com"),
            fixed_now(),
        )
        .expect("first submission succeeds");

    match service.submit(
        applicant(1),
        submission(recruitment.id, "dev@example.com"),
        fixed_now() + Duration::hours(1),
    ) {
        Err(ApplicationServiceError::Repository(RepositoryError::Conflict)) => {}
        other => panic!("expected conflict, got {other:?}"),
    }

    service
        .submit(
            applicant(2),
            submission(recruitment.id, "other@example.com"),
            fixed_now(),
        )
        .expect("a different applicant may submit");
    assert_eq!(service.count(recruitment.id).expect("count succeeds"), 2);
}

#[test]
fn submit_to_unknown_recruitment_is_not_found() {
    let (service, _, _) = build_service();
    match service.submit(
        applicant(1),
        submission(crate::workflows::recruitment::domain::RecruitmentId(404), "dev@example.com"),
        fixed_now(),
    ) {
        Err(ApplicationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn decide_sets_the_outcome() {
    let (service, _, recruitments) = build_service();
    let recruitment = seed_recruitment(&recruitments, 6, Progress::InProgress);
    let stored = service
        .submit(
            applicant(1),
            submission(recruitment.id, "dev@example.com"),
            fixed_now(),
        )
        .expect("submission succeeds");

    let decided = service
        .decide(PUBLISHER, stored.id, Outcome::Pass)
        .expect("decision succeeds");
    assert!(decided.passed());
    assert_eq!(
        service.get(stored.id).expect("get succeeds").outcome,
        Outcome::Pass
    );
}

#[test]
fn decide_requires_the_publisher() {
    let (service, _, recruitments) = build_service();
    let recruitment = seed_recruitment(&recruitments, 7, Progress::InProgress);
    let stored = service
        .submit(
            applicant(1),
            submission(recruitment.id, "dev@example.com"),
            fixed_now(),
        )
        .expect("submission succeeds");

    match service.decide(AdministratorId(404), stored.id, Outcome::Pass) {
        Err(ApplicationServiceError::NotPublisher { .. }) => {}
        other => panic!("expected publisher guard, got {other:?}"),
    }
}

#[test]
fn decide_locked_after_announcement() {
    let (service, _, recruitments) = build_service();
    let mut recruitment = seed_recruitment(&recruitments, 8, Progress::InProgress);
    let stored = service
        .submit(
            applicant(1),
            submission(recruitment.id, "dev@example.com"),
            fixed_now(),
        )
        .expect("submission succeeds");

    recruitment.announce().expect("fixture announces");
    recruitments
        .update(recruitment)
        .expect("fixture update succeeds");

    match service.decide(PUBLISHER, stored.id, Outcome::Fail) {
        Err(ApplicationServiceError::InvalidState(InvalidStateError::AlreadyAnnounced)) => {}
        other => panic!("expected announcement lock, got {other:?}"),
    }
    assert_eq!(
        service.get(stored.id).expect("get succeeds").outcome,
        Outcome::Pending
    );
}
