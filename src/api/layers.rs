//! Layer upload and inspection endpoints.

use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use super::routes::AppState;
use super::sessions::Session;
use super::types::{api_error, ApiError};
use crate::gis::{self, DescribeTable};
use crate::layers::{Layer, LayerError, LayerInfo, LayerTable};

pub(super) async fn session(state: &AppState, id: Uuid) -> Result<Arc<Session>, ApiError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("Session {} not found", id)))
}

async fn layer(state: &AppState, id: Uuid, name: &str) -> Result<Arc<Layer>, ApiError> {
    let session = session(state, id).await?;
    session.layers.resolve(name).await.map_err(|e| match e {
        LayerError::NotFound { .. } => api_error(StatusCode::NOT_FOUND, e.to_string()),
        other => api_error(StatusCode::BAD_REQUEST, other.to_string()),
    })
}

/// POST /api/sessions/:id/layers - Upload GeoJSON files.
///
/// Each multipart field name is used as the layer name; empty fields are skipped.
/// Rejected with 409 while a query is running so a tool chain never sees a
/// layer change underneath it.
pub async fn upload_layers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Vec<LayerInfo>>, ApiError> {
    let session = session(&state, id).await?;
    let _running = session.run_lock.try_lock().map_err(|_| {
        api_error(
            StatusCode::CONFLICT,
            "A query is running for this session; upload again when it finishes",
        )
    })?;
    let mut uploaded = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid upload: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await.map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Failed to read upload '{}': {}", name, e),
            )
        })?;
        if bytes.is_empty() {
            continue;
        }

        let layer = Layer::from_geojson(&name, &bytes).map_err(|e| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Could not load layer '{}': {}", name, e),
            )
        })?;
        tracing::info!(
            "Session {}: loaded layer '{}' ({} features, {} bytes)",
            session.id,
            layer.name,
            layer.len(),
            bytes.len()
        );
        uploaded.push(session.layers.register(layer).await.info());
    }

    if uploaded.is_empty() {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "No GeoJSON files were uploaded",
        ));
    }

    Ok(Json(uploaded))
}

/// GET /api/sessions/:id/layers - List layers in the session.
pub async fn list_layers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<LayerInfo>>, ApiError> {
    let session = session(&state, id).await?;
    let infos = session
        .layers
        .layers()
        .await
        .iter()
        .map(|l| l.info())
        .collect();
    Ok(Json(infos))
}

/// GET /api/sessions/:id/layers/:name - Layer as a table.
pub async fn get_layer(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<LayerTable>, ApiError> {
    Ok(Json(layer(&state, id, &name).await?.table()))
}

/// GET /api/sessions/:id/layers/:name/geojson - Download a layer as GeoJSON.
pub async fn get_layer_geojson(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse, ApiError> {
    let layer = layer(&state, id, &name).await?;
    let body = serde_json::to_string(&layer.to_feature_collection()).map_err(|e| {
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode layer: {}", e),
        )
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/geo+json".to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&layer.name)),
        ],
        body,
    ))
}

/// GET /api/sessions/:id/layers/:name/summary - Descriptive statistics.
pub async fn get_layer_summary(
    State(state): State<Arc<AppState>>,
    Path((id, name)): Path<(Uuid, String)>,
) -> Result<Json<DescribeTable>, ApiError> {
    let layer = layer(&state, id, &name).await?;
    Ok(Json(gis::summarize(&layer)))
}

/// Attachment header for a layer download.
///
/// Layer names are user input, so the quoted `filename` gets an ASCII-only
/// fallback and the exact name travels percent-encoded in `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}.geojson\"; filename*=UTF-8''{}.geojson",
        fallback,
        urlencoding::encode(name)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(
            content_disposition("school_zones"),
            "attachment; filename=\"school_zones.geojson\"; filename*=UTF-8''school_zones.geojson"
        );
    }

    #[test]
    fn quotes_and_control_characters_stay_out_of_the_header() {
        let value = content_disposition("zones \"A\"\n\u{7f}é");
        assert!(value.starts_with("attachment; filename=\"zones__A____.geojson\";"));
        assert!(value.ends_with("filename*=UTF-8''zones%20%22A%22%0A%7F%C3%A9.geojson"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
