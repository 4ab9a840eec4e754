#![cfg(feature = "web")]

mod common;

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use common::StubRenderer;
use csv_insight::app::{AppState, router};
use csv_insight::config::ServerConfig;
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "csv-insight-test-boundary";
const PEOPLE_CSV: &[u8] = b"id,name\n1,a\n2,b\n,c\n";

fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: text/csv\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post(uri: &str, field: &str, bytes: &[u8]) -> Response {
    let app = router(
        AppState::new(Arc::new(StubRenderer::default())),
        &ServerConfig::default(),
    );
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(field, "people.csv", bytes)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX).await.unwrap().to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn analyze_returns_insights() {
    let response = post("/api/analyze", "file", PEOPLE_CSV).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["filename"], "people.csv");
    assert_eq!(json["rows"], 3);
    assert_eq!(json["columns"], 2);
    assert_eq!(json["numeric_columns"][0], "id");
    assert_eq!(json["categorical_columns"][0], "name");
}

#[tokio::test]
async fn unreadable_upload_is_rejected_with_message() {
    let response = post("/api/analyze", "file", b"just one column\nno delimiters\n").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = body_json(response).await;
    assert_eq!(json["status"], "error");
    assert_eq!(
        json["message"],
        "Could not read the file. Please make sure it's a valid CSV or TSV file."
    );
}

#[tokio::test]
async fn upload_in_wrong_field_is_a_bad_request() {
    let response = post("/api/analyze", "attachment", PEOPLE_CSV).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn report_is_a_pdf_attachment() {
    let response = post("/api/report", "file", PEOPLE_CSV).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"csv_insight_report.pdf\""
    );
    assert!(body_bytes(response).await.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn summary_is_a_text_attachment() {
    let response = post("/api/summary", "file", PEOPLE_CSV).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"csv_insight_summary.txt\""
    );

    let text = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(text.starts_with("=== CSV Insight Summary ==="));
    assert!(text.contains("id: Mean = 1.50, Median = 1.50"));
}

#[tokio::test]
async fn chart_for_known_column_is_png() {
    let response = post("/api/chart?column=name", "file", PEOPLE_CSV).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert!(body_bytes(response).await.starts_with(b"\x89PNG"));
}

#[tokio::test]
async fn chart_for_unknown_column_is_not_found() {
    let response = post("/api/chart?column=missing", "file", PEOPLE_CSV).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    println!("✓ unknown chart column rejected");
}
