use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use petropolis_i18n_mt::{BulkError, Content, ContentRequest, translate_content};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, warn};

use crate::AppState;
use crate::auth::Capability;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated: Option<usize>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
            failed: None,
            updated: None,
        }),
    )
}

fn authorize(state: &AppState, headers: &HeaderMap, capability: Capability) -> Result<(), ApiError> {
    state.permissions.check(headers, capability).map_err(|e| {
        warn!(%capability, error = %e, "request rejected");
        api_error(e.status(), e.to_string())
    })
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Failed translations answer with a bare JSON string, which the page editor shows as is
pub async fn translate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<ContentRequest>, JsonRejection>,
) -> Result<Json<Content>, Response> {
    authorize(&state, &headers, Capability::EditHtml).map_err(IntoResponse::into_response)?;
    let Json(request) = body
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.body_text()).into_response())?;

    info!(
        target_language = %request.target_language,
        tag_handling = ?request.tag_handling,
        "translating content"
    );

    let translated = translate_content(state.translator.as_ref(), &request)
        .await
        .map_err(|e| {
            warn!(error = %e, "content translation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json("Couldn't translate")).into_response()
        })?;

    Ok(Json(translated))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerQuery {
    pub source_language: Option<String>,
}

/// Message returned to the client; details stay in the logs
fn bulk_error_message(error: &BulkError) -> &'static str {
    match error {
        BulkError::UnknownLayer(_) => "Unknown layer",
        BulkError::InvalidLanguage(_) => "Invalid source language",
        BulkError::Schema(_) | BulkError::Fetch(_) | BulkError::Extract(_) => {
            "Couldn't read layer"
        }
        BulkError::Provider { .. } | BulkError::Assembly(_) => "Couldn't translate layer",
    }
}

pub async fn translate_layer(
    State(state): State<AppState>,
    Path(layer): Path<String>,
    headers: HeaderMap,
    Query(query): Query<LayerQuery>,
) -> Result<Json<Value>, ApiError> {
    authorize(&state, &headers, Capability::EditLayers)?;

    let report = state
        .bulk
        .translate_layer(&layer, query.source_language.as_deref())
        .await
        .map_err(|e| {
            warn!(%layer, error = %e, "layer translation failed");
            api_error(StatusCode::BAD_REQUEST, bulk_error_message(&e))
        })?;

    if !report.is_complete() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Couldn't save translations".to_string(),
                failed: Some(report.failed.iter().map(|f| f.id.to_string()).collect()),
                updated: Some(report.updated),
            }),
        ));
    }

    info!(%layer, rows = report.rows, updated = report.updated, "layer translated");
    Ok(Json(json!({})))
}
