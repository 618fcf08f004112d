// ABOUTME: Integration tests for the REST routers
// ABOUTME: Exercises CRUD, upload import/merge, and export over in-memory SQLite

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use leadhub_api::{create_files_router, create_leads_router};
use leadhub_leads::{DbState, LeadStorage};

async fn test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let db = DbState::new(pool);
    db.lead_storage.initialize().await.unwrap();

    Router::new()
        .nest("/api/leads", create_leads_router())
        .nest("/api/files", create_files_router())
        .with_state(db)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn multipart_upload(path: &str, filename: &str, content: &str) -> Request<Body> {
    let boundary = "test-boundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: text/csv\r\n\r\n{c}\r\n--{b}--\r\n",
        b = boundary,
        f = filename,
        c = content
    );

    Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn create_then_list_leads() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/leads")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-user-id", "user-42")
                .body(Body::from(
                    r#"{"name":"Jane Roe","email":"jane@roe.io","status":"Hot"}"#,
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["success"], true);
    assert_eq!(created["data"]["created_by"], "user-42");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/leads?page=1&limit=10")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let listed = body_json(response).await;
    assert_eq!(listed["data"]["pagination"]["total"], 1);
    assert_eq!(listed["data"]["leads"][0]["name"], "Jane Roe");
}

#[tokio::test]
async fn missing_lead_is_404() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/leads/no-such-id")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_rejects_empty_name() {
    let app = test_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/leads")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"name":"   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn import_endpoint_processes_a_csv_upload() {
    let app = test_app().await;

    let request = multipart_upload(
        "/api/files/import",
        "leads.csv",
        "Full Name,E-Mail\nJane,jane@x.com\n,nameless@x.com",
    );
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["new_leads"], 1);
    assert_eq!(body["data"]["errors"], 0);
}

#[tokio::test]
async fn merge_endpoint_reports_duplicates() {
    let app = test_app().await;

    let request = multipart_upload(
        "/api/files/import",
        "leads.csv",
        "Name,Email\nJohn Doe,john@techcorp.com",
    );
    app.clone().oneshot(request).await.unwrap();

    let request = multipart_upload(
        "/api/files/merge",
        "leads.csv",
        "Name,Email,Budget\nJohn Doe,john@techcorp.com,6000\nNew Person,new@p.com,",
    );
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["duplicates"], 1);
    assert_eq!(body["data"]["updated"], 1);
    assert_eq!(body["data"]["new_leads"], 1);
    assert_eq!(body["data"]["total_processed"], 2);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/files/duplicates")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"][0]["email"], "john@techcorp.com");
    assert_eq!(body["data"][0]["budget"], 6000.0);
}

#[tokio::test]
async fn empty_upload_is_a_400() {
    let app = test_app().await;

    let request = multipart_upload("/api/files/merge", "leads.csv", "Name,Email");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn export_returns_an_xlsx_attachment() {
    let app = test_app().await;

    let request = multipart_upload("/api/files/import", "leads.csv", "Name\nJane");
    app.clone().oneshot(request).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/files/export")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.contains("spreadsheetml"));

    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=leads_export_"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.starts_with(b"PK"));
}

#[tokio::test]
async fn stats_endpoint_counts_by_status() {
    let app = test_app().await;

    let request = multipart_upload(
        "/api/files/import",
        "leads.csv",
        "Name,Status\nA,Hot\nB,Hot\nC,Won",
    );
    app.clone().oneshot(request).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/leads/stats/dashboard")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["data"]["total"], 3);
    assert_eq!(body["data"]["hot"], 2);
    assert_eq!(body["data"]["won"], 1);
}
