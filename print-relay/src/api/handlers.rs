//! Route handlers

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::info;

use super::error::ApiError;
use super::state::{AppState, JobStatus};
use crate::command::CommandMap;
use crate::job::PrintJobRequest;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub default_printer_ip: String,
    pub default_printer_port: u16,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Printer override; missing, empty or zero values use the configured default
#[derive(Debug, Default, Deserialize)]
pub struct PrintQuery {
    pub printer_ip: Option<String>,
    pub printer_port: Option<u16>,
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

#[derive(Debug, Deserialize)]
pub struct PrintBody {
    pub commands: Vec<CommandMap>,
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrintResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub status: JobStatus,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn root(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Thermal Printer API is running",
        default_printer_ip: state.config.printer_ip.clone(),
        default_printer_port: state.config.printer_port,
    })
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "healthy" })
}

pub async fn print(
    State(state): State<AppState>,
    query: Result<Query<PrintQuery>, QueryRejection>,
    body: Result<Json<PrintBody>, JsonRejection>,
) -> Result<Json<PrintResponse>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let host = query
        .printer_ip
        .filter(|ip| !ip.trim().is_empty())
        .unwrap_or_else(|| state.config.printer_ip.clone());
    let port = query
        .printer_port
        .filter(|p| *p != 0)
        .unwrap_or(state.config.printer_port);

    let job_id = state.jobs.start();
    info!(job_id = %job_id, printer = %format!("{}:{}", host, port), "Print job received");

    let request = PrintJobRequest::new(host, port, body.commands).with_encoding(body.encoding);
    let mut runner = state.job_runner();

    match runner.execute_job(&request).await {
        Ok(_report) => {
            state.jobs.complete(&job_id);
            Ok(Json(PrintResponse {
                success: true,
                message: "Print completed".to_string(),
                job_id: Some(job_id),
            }))
        }
        Err(source) => {
            state.jobs.fail(&job_id, source.to_string());
            Err(ApiError::Job { job_id, source })
        }
    }
}

pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobStatusResponse>, ApiError> {
    let record = state
        .jobs
        .get(&job_id)
        .ok_or_else(|| ApiError::NotFound(format!("Job not found: {}", job_id)))?;

    Ok(Json(JobStatusResponse {
        job_id,
        status: record.status,
        created_at: record.created_at,
        updated_at: record.updated_at,
        error: record.error,
    }))
}

/// Sample command lists for client developers
pub async fn examples() -> Json<Value> {
    Json(json!({
        "simple_text": {
            "commands": [
                {"align": "center"},
                {"bold": true},
                {"text": "PRINT TEST\n"},
                {"cut": "PART"}
            ]
        },
        "complex_receipt": {
            "commands": [
                {"align": "center"},
                {"bold": true},
                {"text": "MY SHOP\n"},
                {"text": "================\n"},
                {"align": "left"},
                {"bold": false},
                {"text": "Item 1         10.00\n"},
                {"text": "Item 2         15.50\n"},
                {"text": "================\n"},
                {"align": "right"},
                {"bold": true},
                {"text": "TOTAL:     25.50\n"},
                {"qr": "https://example.com, size=4, ec=0"},
                {"cut": "PART"}
            ]
        },
        "qr_example": {
            "commands": [
                {"align": "center"},
                {"text": "SCAN THIS QR CODE\n"},
                {"qr": "https://example.com, size=3, ec=0, model=2"},
                {"cut": "FULL"}
            ]
        },
        "barcode_example": {
            "commands": [
                {"align": "center"},
                {"text": "BARCODE:\n"},
                {"barcode": "123456789012, bc=CODE128, height=64, width=3"},
                {"cut": "PART"}
            ]
        },
        "image_example": {
            "commands": [
                {"image": "https://example.com/logo.png"},
                {"image": "/srv/assets/logo.png, impl=graphics, center=true"},
                {"cut": "PART"}
            ]
        }
    }))
}
