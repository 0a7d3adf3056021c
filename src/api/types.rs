//! API request and response types.

use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentLogEntry;
use crate::layers::LayerTable;

/// Response after creating a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    /// Session identifier used in every other route
    pub id: Uuid,
}

/// Request to run a natural-language query.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// The user's question
    pub query: String,

    /// Optional model override (uses default if not specified)
    pub model: Option<String>,
}

/// Result of a query.
#[derive(Debug, Clone, Serialize)]
pub struct QueryResponse {
    /// Final answer from the agent
    pub answer: String,

    /// Tool-call trace
    pub log: Vec<AgentLogEntry>,

    /// Number of model calls made
    pub iterations: usize,

    /// Tables for result layers: everything written by this run, then the
    /// fixed output layers if present
    pub tables: Vec<LayerTable>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Error body returned by every route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
