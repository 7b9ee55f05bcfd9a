use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{Duration, NaiveDateTime};
use serde_json::{json, Value};
use tower::ServiceExt;

use super::common::*;
use crate::workflows::recruitment::router::recruitment_router;

fn build_router() -> axum::Router {
    let (service, _, _) = build_service();
    recruitment_router(service, 10)
}

fn save_payload(publisher_id: u64, title: &str, deadline: NaiveDateTime) -> Value {
    json!({
        "publisher_id": publisher_id,
        "title": title,
        "description": format!("{title} autumn recruitment"),
        "deadline": deadline.format("%Y-%m-%dT%H:%M:%S").to_string(),
        "sections": [
            {
                "name": "Backend",
                "narrative_questions": [
                    { "content": "Why us?", "required": true, "word_limit": 300 }
                ],
                "selective_questions": [
                    {
                        "content": "Preferred stack?",
                        "required": true,
                        "minimum_selection": 1,
                        "maximum_selection": 2,
                        "choices": ["Rust", "Kotlin", "TypeScript"]
                    }
                ]
            }
        ]
    })
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(payload).expect("serialize payload")))
        .expect("request")
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn create_route_persists_and_returns_created() {
    let router = build_router();
    let payload = save_payload(77, "Backend Club", upcoming_deadline(48));

    let response = router
        .clone()
        .oneshot(post_json("/api/v1/recruitments", &payload))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = json_body(response).await;
    assert_eq!(body["title"], "Backend Club");
    assert_eq!(body["progress"], "ready");
    let id = body["id"].as_u64().expect("numeric id");

    let details = router
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/recruitments/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(details.status(), StatusCode::OK);
    let details = json_body(details).await;
    assert_eq!(details["sections"].as_array().expect("sections").len(), 1);
}

#[tokio::test]
async fn create_route_rejects_misaligned_deadline() {
    let router = build_router();
    let payload = save_payload(
        77,
        "Backend Club",
        upcoming_deadline(48) + Duration::minutes(30),
    );

    let response = router
        .oneshot(post_json("/api/v1/recruitments", &payload))
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(response).await;
    assert!(body["error"].as_str().expect("error message").contains("hour"));
}

#[tokio::test]
async fn details_route_returns_not_found_for_unknown_id() {
    let router = build_router();

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/recruitments/987654")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_route_rejects_foreign_publisher() {
    let router = build_router();
    let deadline = upcoming_deadline(48);

    let created = router
        .clone()
        .oneshot(post_json(
            "/api/v1/recruitments",
            &save_payload(77, "Backend Club", deadline),
        ))
        .await
        .expect("router dispatch");
    let id = json_body(created).await["id"].as_u64().expect("numeric id");

    let hijack = save_payload(404, "Hijacked", deadline);
    let response = router
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri(format!("/api/v1/recruitments/{id}"))
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&hijack).expect("serialize payload")))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn start_route_conflicts_when_repeated() {
    let router = build_router();

    let created = router
        .clone()
        .oneshot(post_json(
            "/api/v1/recruitments",
            &save_payload(77, "Backend Club", upcoming_deadline(48)),
        ))
        .await
        .expect("router dispatch");
    let id = json_body(created).await["id"].as_u64().expect("numeric id");

    let action = json!({ "publisher_id": 77 });
    let first = router
        .clone()
        .oneshot(post_json(&format!("/api/v1/recruitments/{id}/start"), &action))
        .await
        .expect("router dispatch");
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(json_body(first).await["progress"], "in_progress");

    let second = router
        .oneshot(post_json(&format!("/api/v1/recruitments/{id}/start"), &action))
        .await
        .expect("router dispatch");
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn search_route_filters_by_prefix() {
    let (service, _, index) = build_service();
    for title in ["Backend Club", "Back Office", "Design Club"] {
        index.add(title).expect("index accepts title");
    }
    let router = recruitment_router(service, 10);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/recruitments/search?prefix=Back")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["titles"], json!(["Back Office", "Backend Club"]));
}

#[tokio::test]
async fn search_route_applies_explicit_limit() {
    let (service, _, index) = build_service();
    for i in 0..5 {
        index
            .add(&format!("Backend Crew {i}"))
            .expect("index accepts title");
    }
    let router = recruitment_router(service, 10);

    let response = router
        .oneshot(
            Request::builder()
                .uri("/api/v1/recruitments/search?prefix=Backend&limit=2")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    let body = json_body(response).await;
    assert_eq!(body["titles"].as_array().expect("titles").len(), 2);
}

#[tokio::test]
async fn delete_route_returns_no_content() {
    let router = build_router();

    let created = router
        .clone()
        .oneshot(post_json(
            "/api/v1/recruitments",
            &save_payload(77, "Backend Club", upcoming_deadline(48)),
        ))
        .await
        .expect("router dispatch");
    let id = json_body(created).await["id"].as_u64().expect("numeric id");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/recruitments/{id}"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({ "publisher_id": 77 })).expect("serialize payload"),
                ))
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let gone = router
        .oneshot(
            Request::builder()
                .uri(format!("/api/v1/recruitments/{id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
