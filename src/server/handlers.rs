//! HTTP request handlers

use std::collections::HashMap;
use std::sync::Arc;
use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::FormRejection,
        Multipart, State,
    },
    http::header,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use serde::Serialize;
use tracing::info;

use crate::inference::SinglePrediction;

use super::error::{Result, ServerError};
use super::page::render_index;
use super::state::AppState;

const UPLOAD_FIELD: &str = "file";
const DOWNLOAD_NAME: &str = "predictions.csv";

// ============================================================================
// UI Handler
// ============================================================================

pub async fn serve_index(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(render_index(state.engine.schema(), &state.metadata))
}

// ============================================================================
// Inference Handlers
// ============================================================================

#[derive(Serialize)]
pub struct PredictResponse {
    success: bool,
    #[serde(flatten)]
    result: SinglePrediction,
}

/// Predict a single record submitted as a URL-encoded form
pub async fn predict(
    State(state): State<Arc<AppState>>,
    form: std::result::Result<Form<HashMap<String, String>>, FormRejection>,
) -> Result<Json<PredictResponse>> {
    let Form(fields) = form.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let result = state.engine.predict_record(&fields)?;

    Ok(Json(PredictResponse {
        success: true,
        result,
    }))
}

/// Predict every row of an uploaded CSV and return the result as a download
pub async fn batch_predict(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Response> {
    let mut multipart = multipart.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // A part without a filename is a plain form value, not an upload
        let file_name = match field.file_name() {
            Some("") => return Err(ServerError::BadRequest("No file selected".to_string())),
            Some(name) => name.to_string(),
            None => continue,
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(e.body_text()))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) =
        upload.ok_or_else(|| ServerError::BadRequest("No file uploaded".to_string()))?;
    info!(file = %file_name, bytes = data.len(), "Received batch upload");

    let csv = state.engine.predict_csv(&data)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_NAME),
            ),
        ],
        csv,
    )
        .into_response())
}

// ============================================================================
// System Handlers
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    model_loaded: bool,
    preprocessor_loaded: bool,
    features_count: usize,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        model_loaded: state.engine.model_loaded(),
        preprocessor_loaded: state.engine.preprocessor_loaded(),
        features_count: state.engine.features_count(),
    })
}
