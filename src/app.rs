use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{DefaultBodyLimit, Multipart, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::limit::RequestBodyLimitLayer;
use uuid::Uuid;

use crate::config::ServerConfig;
use crate::error::InsightError;
use crate::graph::{ChartRenderer, PlottersRenderer, chart_png};
use crate::insights::Insights;
use crate::loader;
use crate::report::{REPORT_FILE_NAME, assemble_with};
use crate::summary::{SUMMARY_FILE_NAME, plain_text};
use crate::table::{RawUpload, Table};

/// Name of the multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "file";

/// Shared, read-only server state. Tables are never stored here.
pub struct AppState {
    renderer: Arc<dyn ChartRenderer + Send + Sync>,
}

impl AppState {
    pub fn new(renderer: Arc<dyn ChartRenderer + Send + Sync>) -> Self {
        Self { renderer }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(PlottersRenderer::default()))
    }
}

#[derive(Deserialize)]
struct ChartQuery {
    column: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    status: String,
    message: String,
}

/// Errors surfaced to the browser as JSON.
#[derive(Debug)]
pub enum ApiError {
    MissingUpload,
    BadUpload(String),
    Insight(InsightError),
    Internal(String),
}

impl From<InsightError> for ApiError {
    fn from(err: InsightError) -> Self {
        ApiError::Insight(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::MissingUpload => (
                StatusCode::BAD_REQUEST,
                format!("No file data received in field '{UPLOAD_FIELD}'"),
            ),
            ApiError::BadUpload(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Insight(err @ InsightError::UnreadableFormat) => {
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            ApiError::Insight(err @ InsightError::UnknownColumn(_)) => {
                (StatusCode::NOT_FOUND, err.to_string())
            }
            ApiError::Insight(err) => {
                error!("request failed: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            ApiError::Internal(msg) => {
                error!("request failed: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (
            status,
            Json(ErrorResponse {
                status: "error".to_string(),
                message,
            }),
        )
            .into_response()
    }
}

/// Build the router. Upload size is capped at `config.max_upload_bytes`.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/analyze", post(analyze))
        .route("/api/chart", post(chart))
        .route("/api/report", post(report))
        .route("/api/summary", post(summary))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(config.max_upload_bytes))
        .with_state(Arc::new(state))
}

pub async fn run(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::default(), &config);

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on http://{}", config.bind_address());
    axum::serve(listener, app).await?;

    Ok(())
}

async fn serve_index() -> Html<&'static str> {
    Html(include_str!("./static/index.html"))
}

async fn analyze(multipart: Multipart) -> Result<Json<Insights>, ApiError> {
    let upload = read_upload(multipart).await?;
    let insights = blocking(move || {
        let table = load_table(&upload)?;
        Ok(Insights::from_table(&table, &upload.name))
    })
    .await?;
    Ok(Json(insights))
}

async fn chart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChartQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    let renderer = Arc::clone(&state.renderer);
    let png = blocking(move || {
        let table = load_table(&upload)?;
        chart_png(renderer.as_ref(), &table, &query.column)
    })
    .await?;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}

async fn report(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    let renderer = Arc::clone(&state.renderer);
    let pdf = blocking(move || {
        let table = load_table(&upload)?;
        assemble_with(&table, &upload.name, renderer.as_ref())?.to_pdf()
    })
    .await?;

    Ok(attachment(pdf, "application/pdf", REPORT_FILE_NAME))
}

async fn summary(multipart: Multipart) -> Result<Response, ApiError> {
    let upload = read_upload(multipart).await?;
    let text = blocking(move || {
        let table = load_table(&upload)?;
        Ok(plain_text(&table, &upload.name))
    })
    .await?;

    Ok(attachment(
        text.into_bytes(),
        "text/plain; charset=utf-8",
        SUMMARY_FILE_NAME,
    ))
}

fn attachment(bytes: Vec<u8>, content_type: &str, file_name: &str) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{file_name}\""),
        )
        .body(Body::from(bytes))
        .unwrap_or_else(|e| ApiError::Internal(e.to_string()).into_response())
}

/// Pull the uploaded file out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<RawUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadUpload(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("upload.csv").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadUpload(e.to_string()))?;
        return Ok(RawUpload::new(name, bytes.to_vec()));
    }

    Err(ApiError::MissingUpload)
}

fn load_table(upload: &RawUpload) -> Result<Table, InsightError> {
    let request_id = Uuid::new_v4();
    info!(
        "[{request_id}] loading '{}' ({} bytes)",
        upload.name,
        upload.bytes.len()
    );
    loader::load(&upload.bytes).ok_or_else(|| {
        warn!("[{request_id}] rejected '{}': unreadable format", upload.name);
        InsightError::UnreadableFormat
    })
}

/// Run parsing and rendering off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, InsightError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(ApiError::from)
}
