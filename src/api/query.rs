//! Query endpoint: runs the agent against a session's layers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use super::layers::session;
use super::routes::AppState;
use super::types::{api_error, ApiError, QueryRequest, QueryResponse};
use crate::layers::{LayerRegistry, LayerTable};
use crate::tools::{BUFFER_OUTPUT, INTERSECTION_OUTPUT};

/// Result layers always shown when present, in display order.
const FIXED_OUTPUTS: [&str; 2] = [INTERSECTION_OUTPUT, BUFFER_OUTPUT];

/// POST /api/sessions/:id/query - Answer a natural-language question.
pub async fn run_query(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = req.query.trim();
    if query.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "query is required"));
    }

    let session = session(&state, id).await?;
    let _running = session.run_lock.try_lock().map_err(|_| {
        api_error(
            StatusCode::CONFLICT,
            "A query is already running for this session",
        )
    })?;

    let model = req
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.agent.default_model().to_string());

    tracing::info!("Session {}: running query with {}: {}", session.id, model, query);

    let outcome = state
        .agent
        .run(query, &model, &session.layers)
        .await
        .map_err(|e| {
            tracing::error!("Session {}: query failed: {:#}", session.id, e);
            api_error(StatusCode::BAD_GATEWAY, format!("Error: {}", e))
        })?;

    let tables = result_tables(&session.layers, &outcome.layers_written).await;

    Ok(Json(QueryResponse {
        answer: outcome.answer,
        log: outcome.log,
        iterations: outcome.iterations,
        tables,
    }))
}

/// Tables for the layers a run wrote, followed by any fixed outputs not already listed.
async fn result_tables(layers: &LayerRegistry, written: &[String]) -> Vec<LayerTable> {
    let mut names: Vec<&str> = written.iter().map(String::as_str).collect();
    for fixed in FIXED_OUTPUTS {
        if !names.contains(&fixed) {
            names.push(fixed);
        }
    }

    let mut tables = Vec::new();
    for name in names {
        if let Ok(layer) = layers.resolve(name).await {
            tables.push(layer.table());
        }
    }
    tables
}
