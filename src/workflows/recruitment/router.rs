use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::json;

use super::domain::RecruitmentId;
use super::repository::{RecruitmentRepository, RepositoryError};
use super::search::TitleIndexStore;
use super::service::{RecruitmentDraft, RecruitmentService, RecruitmentServiceError};
use crate::workflows::auth::domain::AdministratorId;

pub struct RecruitmentRouterState<R, S> {
    service: Arc<RecruitmentService<R, S>>,
    default_search_limit: usize,
}

impl<R, S> Clone for RecruitmentRouterState<R, S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            default_search_limit: self.default_search_limit,
        }
    }
}

/// Router builder exposing the recruitment lifecycle and title search.
pub fn recruitment_router<R, S>(
    service: Arc<RecruitmentService<R, S>>,
    default_search_limit: usize,
) -> Router
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    let state = RecruitmentRouterState {
        service,
        default_search_limit,
    };
    Router::new()
        .route("/api/v1/recruitments", post(create_handler::<R, S>))
        .route("/api/v1/recruitments/search", get(search_handler::<R, S>))
        .route(
            "/api/v1/recruitments/:recruitment_id",
            get(details_handler::<R, S>)
                .put(update_handler::<R, S>)
                .delete(delete_handler::<R, S>),
        )
        .route(
            "/api/v1/recruitments/:recruitment_id/start",
            post(start_handler::<R, S>),
        )
        .route(
            "/api/v1/recruitments/:recruitment_id/close",
            post(close_handler::<R, S>),
        )
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub(crate) struct SaveRecruitmentRequest {
    pub publisher_id: u64,
    #[serde(flatten)]
    pub draft: RecruitmentDraft,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PublisherAction {
    pub publisher_id: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchParams {
    #[serde(default)]
    pub prefix: String,
    pub limit: Option<usize>,
}

pub(crate) async fn create_handler<R, S>(
    State(state): State<RecruitmentRouterState<R, S>>,
    axum::Json(request): axum::Json<SaveRecruitmentRequest>,
) -> Response
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    let publisher = AdministratorId(request.publisher_id);
    match state.service.create(publisher, request.draft) {
        Ok(recruitment) => (StatusCode::CREATED, axum::Json(recruitment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<R, S>(
    State(state): State<RecruitmentRouterState<R, S>>,
    Path(recruitment_id): Path<u64>,
    axum::Json(request): axum::Json<SaveRecruitmentRequest>,
) -> Response
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    let publisher = AdministratorId(request.publisher_id);
    match state
        .service
        .update(publisher, RecruitmentId(recruitment_id), request.draft)
    {
        Ok(recruitment) => (StatusCode::OK, axum::Json(recruitment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn start_handler<R, S>(
    State(state): State<RecruitmentRouterState<R, S>>,
    Path(recruitment_id): Path<u64>,
    axum::Json(request): axum::Json<PublisherAction>,
) -> Response
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    let publisher = AdministratorId(request.publisher_id);
    match state.service.start(publisher, RecruitmentId(recruitment_id)) {
        Ok(recruitment) => (StatusCode::OK, axum::Json(recruitment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn close_handler<R, S>(
    State(state): State<RecruitmentRouterState<R, S>>,
    Path(recruitment_id): Path<u64>,
    axum::Json(request): axum::Json<PublisherAction>,
) -> Response
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    let publisher = AdministratorId(request.publisher_id);
    match state.service.close(publisher, RecruitmentId(recruitment_id)) {
        Ok(recruitment) => (StatusCode::OK, axum::Json(recruitment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn details_handler<R, S>(
    State(state): State<RecruitmentRouterState<R, S>>,
    Path(recruitment_id): Path<u64>,
) -> Response
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    match state.service.details(RecruitmentId(recruitment_id)) {
        Ok(recruitment) => (StatusCode::OK, axum::Json(recruitment)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<R, S>(
    State(state): State<RecruitmentRouterState<R, S>>,
    Path(recruitment_id): Path<u64>,
    axum::Json(request): axum::Json<PublisherAction>,
) -> Response
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    let publisher = AdministratorId(request.publisher_id);
    match state.service.delete(publisher, RecruitmentId(recruitment_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler<R, S>(
    State(state): State<RecruitmentRouterState<R, S>>,
    Query(params): Query<SearchParams>,
) -> Response
where
    R: RecruitmentRepository + 'static,
    S: TitleIndexStore + 'static,
{
    let limit = params.limit.unwrap_or(state.default_search_limit);
    match state.service.search_titles(&params.prefix, limit) {
        Ok(titles) => (StatusCode::OK, axum::Json(json!({ "titles": titles }))).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: RecruitmentServiceError) -> Response {
    let status = match &err {
        RecruitmentServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RecruitmentServiceError::InvalidState(_) => StatusCode::CONFLICT,
        RecruitmentServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RecruitmentServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RecruitmentServiceError::NotPublisher { .. } => StatusCode::FORBIDDEN,
        RecruitmentServiceError::Repository(_) | RecruitmentServiceError::Search(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
