use crate::config::ServerConfig;
use crate::data::{GenerateOutput, ResetTeacherRequest, TimetableRequest};
use crate::error::TimetableError;
use crate::replan::ReplanResult;
use crate::solver;
use crate::validation::{ValidationReport, validate_request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::Serialize;
use serde_json::json;

impl IntoResponse for TimetableError {
    fn into_response(self) -> Response {
        warn!("Rejected request: {self}");
        let body = match &self {
            TimetableError::InvalidInput(report) => json!({
                "error": "Invalid input data",
                "validation_errors": report.errors,
                "validation_warnings": report.warnings,
            }),
            other => json!({ "error": other.to_string() }),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
    message: &'static str,
    version: &'static str,
    supports: &'static str,
}

async fn generate_handler(
    Json(input): Json<TimetableRequest>,
) -> Result<Json<GenerateOutput>, TimetableError> {
    solver::generate(&input).map(Json)
}

async fn validate_handler(Json(input): Json<TimetableRequest>) -> Json<ValidationReport> {
    Json(validate_request(&input))
}

async fn reset_teacher_handler(
    Json(input): Json<ResetTeacherRequest>,
) -> Result<Json<ReplanResult>, TimetableError> {
    solver::reset_teacher(&input).map(Json)
}

async fn health_handler() -> Json<Health> {
    Json(Health {
        status: "healthy",
        message: "Timetable solver is running",
        version: env!("CARGO_PKG_VERSION"),
        supports: "classes-based input structure",
    })
}

pub fn router() -> Router {
    Router::new()
        .route("/v1/timetable/generate", post(generate_handler))
        .route("/v1/timetable/validate", post(validate_handler))
        .route("/v1/timetable/reset-teacher", post(reset_teacher_handler))
        .route("/health", get(health_handler))
}

pub async fn run_server(config: &ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Server running at http://{}", listener.local_addr()?);
    axum::serve(listener, router()).await
}
