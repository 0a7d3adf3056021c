//! Router, shared state and server startup.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::Html,
    routing::{delete, get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::sessions::SessionStore;
use super::types::{api_error, ApiError, CreateSessionResponse, HealthResponse};
use super::{layers, query, ui};
use crate::agent::Agent;
use crate::config::Config;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub agent: Arc<Agent>,
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: Config, agent: Arc<Agent>) -> Self {
        Self {
            config,
            agent,
            sessions: SessionStore::new(),
        }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/api/health", get(health))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", delete(delete_session))
        .route(
            "/api/sessions/:id/layers",
            get(layers::list_layers).post(layers::upload_layers),
        )
        .route("/api/sessions/:id/layers/:name", get(layers::get_layer))
        .route(
            "/api/sessions/:id/layers/:name/geojson",
            get(layers::get_layer_geojson),
        )
        .route(
            "/api/sessions/:id/layers/:name/summary",
            get(layers::get_layer_summary),
        )
        .route("/api/sessions/:id/query", post(query::run_query))
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server and block until it exits.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let agent = Arc::new(Agent::new(config.clone())?);
    let state = Arc::new(AppState::new(config.clone(), agent));
    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Spatial agent UI available at http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// GET / - The browser UI.
async fn index() -> Html<&'static str> {
    Html(ui::INDEX_HTML)
}

/// GET /api/health - Liveness check.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /api/sessions - Start a new session with an empty layer registry.
async fn create_session(State(state): State<Arc<AppState>>) -> Json<CreateSessionResponse> {
    let session = state.sessions.create().await;
    Json(CreateSessionResponse { id: session.id })
}

/// DELETE /api/sessions/:id - Drop a session and its layers.
async fn delete_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(api_error(
            StatusCode::NOT_FOUND,
            format!("Session {} not found", id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ChatMessage, ChatResponse, LlmClient, LlmError, ToolCall, ToolSchema};
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use tower::ServiceExt;

    const BOUNDARY: &str = "spatial-agent-test-boundary";

    struct ScriptedClient(Mutex<VecDeque<ChatResponse>>);

    #[async_trait]
    impl LlmClient for ScriptedClient {
        async fn chat_completion(
            &self,
            _model: &str,
            _messages: &[ChatMessage],
            _tools: Option<&[ToolSchema]>,
        ) -> Result<ChatResponse, LlmError> {
            self.0
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| LlmError::Api {
                    status: 503,
                    body: "upstream unavailable".to_string(),
                })
        }
    }

    fn app(responses: Vec<ChatResponse>) -> Router {
        let config = Config::new("test-key".to_string(), "test-model".to_string());
        let client = Arc::new(ScriptedClient(Mutex::new(responses.into())));
        let agent = Arc::new(Agent::with_client(config.clone(), client));
        router(Arc::new(AppState::new(config, agent)))
    }

    fn square(x: f64, name: &str) -> String {
        json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": { "name": name },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[x, 0.0], [x + 10.0, 0.0], [x + 10.0, 10.0], [x, 10.0], [x, 0.0]]]
                }
            }]
        })
        .to_string()
    }

    fn multipart(files: &[(&str, &str)]) -> Body {
        let mut body = String::new();
        for (name, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{name}.geojson\"\r\nContent-Type: application/geo+json\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        Body::from(body)
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }

    async fn new_session(app: &Router) -> String {
        let (status, body) = send(
            app,
            Request::post("/api/sessions").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        body["id"].as_str().unwrap().to_string()
    }

    async fn upload(app: &Router, id: &str, files: &[(&str, &str)]) -> (StatusCode, Value) {
        send(
            app,
            Request::post(format!("/api/sessions/{id}/layers"))
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(multipart(files))
                .unwrap(),
        )
        .await
    }

    fn query(id: &str, text: &str) -> Request<Body> {
        Request::post(format!("/api/sessions/{id}/query"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "query": text }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_and_index() {
        let app = app(Vec::new());
        let (status, body) = send(&app, Request::get("/api/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");

        let (status, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.as_str().unwrap().contains("school_zones"));
    }

    #[tokio::test]
    async fn upload_then_query_returns_answer_and_tables() {
        let app = app(vec![
            ChatResponse {
                tool_calls: Some(vec![ToolCall::new(
                    "call_1",
                    "intersect_layers",
                    r#"{"first":"school_zones","second":"flood_zones"}"#,
                )]),
                ..Default::default()
            },
            ChatResponse {
                content: Some("Lincoln lies in Zone A.".to_string()),
                ..Default::default()
            },
        ]);
        let id = new_session(&app).await;
        let schools = square(0.0, "Lincoln");
        let floods = square(5.0, "Zone A");

        let (status, body) = upload(
            &app,
            &id,
            &[("school_zones", schools.as_str()), ("flood_zones", floods.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (status, body) = send(&app, query(&id, "Which schools are in flood zones?")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["answer"], "Lincoln lies in Zone A.");
        assert_eq!(body["iterations"], 2);
        assert_eq!(body["tables"][0]["name"], "school_zones_in_flood_zones");
        assert_eq!(body["tables"][0]["rows"].as_array().unwrap().len(), 1);
        assert_eq!(body["log"][0]["entry_type"], "tool_call");

        let (status, body) = send(
            &app,
            Request::get(format!("/api/sessions/{id}/layers/school_zones_in_flood_zones/summary"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["layer"], "school_zones_in_flood_zones");
    }

    #[tokio::test]
    async fn geojson_download_round_trips() {
        let app = app(Vec::new());
        let id = new_session(&app).await;
        let schools = square(0.0, "Lincoln");
        upload(&app, &id, &[("school_zones", schools.as_str())]).await;

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/sessions/{id}/layers/school_zones/geojson"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/geo+json"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["type"], "FeatureCollection");
        assert_eq!(body["features"][0]["properties"]["name"], "Lincoln");
    }

    #[tokio::test]
    async fn invalid_uploads_are_rejected() {
        let app = app(Vec::new());
        let id = new_session(&app).await;

        let (status, body) = upload(&app, &id, &[("school_zones", "not geojson")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("school_zones"));

        let (status, _) = upload(&app, &id, &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_session_and_layer_are_not_found() {
        let app = app(Vec::new());
        let missing = Uuid::new_v4();
        let (status, _) = send(&app, query(&missing.to_string(), "anything")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let id = new_session(&app).await;
        let (status, body) = send(
            &app,
            Request::get(format!("/api/sessions/{id}/layers/rivers"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("rivers"));
    }

    #[tokio::test]
    async fn blank_query_is_rejected() {
        let app = app(Vec::new());
        let id = new_session(&app).await;
        let (status, _) = send(&app, query(&id, "   ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn agent_failure_maps_to_bad_gateway() {
        let app = app(Vec::new());
        let id = new_session(&app).await;
        let (status, body) = send(&app, query(&id, "Which schools flood?")).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body["error"].as_str().unwrap().starts_with("Error:"));
    }

    #[tokio::test]
    async fn busy_session_rejects_queries_and_uploads() {
        let config = Config::new("test-key".to_string(), "test-model".to_string());
        let client = Arc::new(ScriptedClient(Mutex::new(VecDeque::new())));
        let agent = Arc::new(Agent::with_client(config.clone(), client));
        let state = Arc::new(AppState::new(config, agent));
        let app = router(Arc::clone(&state));

        let id = new_session(&app).await;
        let schools = square(0.0, "Lincoln");
        upload(&app, &id, &[("school_zones", schools.as_str())]).await;

        let session = state.sessions.get(id.parse().unwrap()).await.unwrap();
        let running = session.run_lock.lock().await;

        let (status, body) = send(&app, query(&id, "Which schools flood?")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("already running"));

        let replacement = square(50.0, "Lakeview");
        let (status, body) = upload(&app, &id, &[("school_zones", replacement.as_str())]).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
        let kept = session.layers.resolve("school_zones").await.unwrap();
        assert_eq!(kept.features[0].properties["name"], "Lincoln");

        drop(running);
        let (status, _) = upload(&app, &id, &[("school_zones", replacement.as_str())]).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn delete_session_removes_it() {
        let app = app(Vec::new());
        let id = new_session(&app).await;
        let delete = || Request::delete(format!("/api/sessions/{id}")).body(Body::empty()).unwrap();

        let (status, _) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, delete()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
