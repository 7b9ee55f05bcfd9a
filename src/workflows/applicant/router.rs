use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::announce::{AnnounceError, OutcomeAnnouncer};
use super::dispatch::{EmailGateway, NotificationDispatcher};
use super::domain::{ApplicationId, Outcome};
use super::outbox::NotificationOutbox;
use super::repository::ApplicationRepository;
use super::service::{ApplicationService, ApplicationServiceError, ApplicationSubmission};
use crate::workflows::auth::domain::{AdministratorId, ApplicantId};
use crate::workflows::recruitment::repository::{RecruitmentRepository, RepositoryError};

pub struct ApplicationRouterState<A, R, O, G> {
    service: Arc<ApplicationService<A, R>>,
    announcer: Arc<OutcomeAnnouncer<R, A, O>>,
    dispatcher: Arc<NotificationDispatcher<G, O>>,
}

impl<A, R, O, G> Clone for ApplicationRouterState<A, R, O, G> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            announcer: self.announcer.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

/// Router builder for application intake, scoring, and announcement.
pub fn application_router<A, R, O, G>(
    service: Arc<ApplicationService<A, R>>,
    announcer: Arc<OutcomeAnnouncer<R, A, O>>,
    dispatcher: Arc<NotificationDispatcher<G, O>>,
) -> Router
where
    A: ApplicationRepository + 'static,
    R: RecruitmentRepository + 'static,
    O: NotificationOutbox + 'static,
    G: EmailGateway + 'static,
{
    let state = ApplicationRouterState {
        service,
        announcer,
        dispatcher,
    };
    Router::new()
        .route("/api/v1/applications", post(submit_handler::<A, R, O, G>))
        .route(
            "/api/v1/applications/:application_id",
            get(get_handler::<A, R, O, G>),
        )
        .route(
            "/api/v1/applications/:application_id/outcome",
            post(decide_handler::<A, R, O, G>),
        )
        .route(
            "/api/v1/announcements",
            post(announce_handler::<A, R, O, G>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitRequest {
    pub applicant_id: u64,
    #[serde(flatten)]
    pub submission: ApplicationSubmission,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DecideRequest {
    pub publisher_id: u64,
    pub outcome: Outcome,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnnounceRequest {
    pub publisher_id: u64,
}

pub(crate) async fn submit_handler<A, R, O, G>(
    State(state): State<ApplicationRouterState<A, R, O, G>>,
    axum::Json(request): axum::Json<SubmitRequest>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: RecruitmentRepository + 'static,
    O: NotificationOutbox + 'static,
    G: EmailGateway + 'static,
{
    let now = Utc::now().naive_utc();
    match state
        .service
        .submit(ApplicantId(request.applicant_id), request.submission, now)
    {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(err) => application_error_response(err),
    }
}

pub(crate) async fn get_handler<A, R, O, G>(
    State(state): State<ApplicationRouterState<A, R, O, G>>,
    Path(application_id): Path<u64>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: RecruitmentRepository + 'static,
    O: NotificationOutbox + 'static,
    G: EmailGateway + 'static,
{
    match state.service.get(ApplicationId(application_id)) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(err) => application_error_response(err),
    }
}

pub(crate) async fn decide_handler<A, R, O, G>(
    State(state): State<ApplicationRouterState<A, R, O, G>>,
    Path(application_id): Path<u64>,
    axum::Json(request): axum::Json<DecideRequest>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: RecruitmentRepository + 'static,
    O: NotificationOutbox + 'static,
    G: EmailGateway + 'static,
{
    match state.service.decide(
        AdministratorId(request.publisher_id),
        ApplicationId(application_id),
        request.outcome,
    ) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(err) => application_error_response(err),
    }
}

/// Announces the outcome and hands the staged batch to the dispatcher off
/// the request path. Delivery failures never reach the administrator; the
/// announcement has already committed.
pub(crate) async fn announce_handler<A, R, O, G>(
    State(state): State<ApplicationRouterState<A, R, O, G>>,
    axum::Json(request): axum::Json<AnnounceRequest>,
) -> Response
where
    A: ApplicationRepository + 'static,
    R: RecruitmentRepository + 'static,
    O: NotificationOutbox + 'static,
    G: EmailGateway + 'static,
{
    let now = Utc::now().naive_utc();
    match state
        .announcer
        .announce(AdministratorId(request.publisher_id), now)
    {
        Ok(summary) => {
            let dispatcher = state.dispatcher.clone();
            tokio::spawn(async move {
                dispatcher.dispatch_pending();
            });
            let payload = json!({
                "recruitment_id": summary.recruitment_id,
                "notified_applications": summary.notified_applications,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => announce_error_response(err),
    }
}

fn application_error_response(err: ApplicationServiceError) -> Response {
    let status = match &err {
        ApplicationServiceError::InvalidState(_) => StatusCode::CONFLICT,
        ApplicationServiceError::DeadlinePassed(_) => StatusCode::CONFLICT,
        ApplicationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        ApplicationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        ApplicationServiceError::NotPublisher { .. } => StatusCode::FORBIDDEN,
        ApplicationServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
}

fn announce_error_response(err: AnnounceError) -> Response {
    let status = match &err {
        AnnounceError::InvalidState(_) => StatusCode::CONFLICT,
        AnnounceError::DeadlineNotPassed(_) => StatusCode::BAD_REQUEST,
        AnnounceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        AnnounceError::Repository(_) | AnnounceError::Outbox(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, axum::Json(json!({ "error": err.to_string() }))).into_response()
}
