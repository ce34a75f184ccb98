//! HTTP surface: check-in, check-out, liveness.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sitecheck_core::app::LifecycleController;
use sitecheck_core::domain::{JobId, JobStatus, QualityReport};

use crate::error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<LifecycleController>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/checkin/:job_id", post(check_in))
        .route("/checkout/:job_id", post(check_out))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CheckInQuery {
    /// The code scanned off the location-bound QR poster.
    hotel_qr: String,
}

#[derive(Debug, Serialize)]
struct CheckInResponse {
    message: &'static str,
    status: JobStatus,
    delay_minutes: f64,
    payout: f64,
}

#[derive(Debug, Deserialize)]
struct CheckOutBody {
    notes: String,
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Debug, Serialize)]
struct CheckOutResponse {
    status: &'static str,
    analysis: QualityReport,
    payout_verified: f64,
}

async fn liveness() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sitecheck",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[instrument(skip(state, query), fields(job_id = %job_id))]
async fn check_in(
    Path(job_id): Path<String>,
    Query(query): Query<CheckInQuery>,
    State(state): State<AppState>,
) -> Result<Json<CheckInResponse>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let outcome = state.controller.check_in(job_id, &query.hotel_qr).await?;

    Ok(Json(CheckInResponse {
        message: "Check-in successful",
        status: outcome.status,
        delay_minutes: outcome.delay_minutes,
        payout: outcome.payout,
    }))
}

#[instrument(skip(state, body), fields(job_id = %job_id))]
async fn check_out(
    Path(job_id): Path<String>,
    State(state): State<AppState>,
    Json(body): Json<CheckOutBody>,
) -> Result<Json<CheckOutResponse>, ApiError> {
    let job_id = parse_job_id(&job_id)?;
    let outcome = state
        .controller
        .check_out(job_id, &body.notes, body.photo_url)
        .await?;

    Ok(Json(CheckOutResponse {
        status: "success",
        analysis: outcome.report,
        payout_verified: outcome.payout,
    }))
}

fn parse_job_id(raw: &str) -> Result<JobId, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidId(raw.to_string()))
}
