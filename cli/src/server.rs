use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span};

use gluco_core::agent::{AgentRequest, AgentResponse};
use gluco_core::models::{LogEntry, LogKind, UserProfile};
use gluco_core::service::AgentService;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MiB
const DEFAULT_LOG_LIMIT: i64 = 50;
const MAX_LOG_LIMIT: i64 = 500;

#[derive(Clone)]
struct AppState {
    service: Arc<AgentService>,
}

// --- Request / Response types ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
}

#[derive(Deserialize)]
struct LogsQuery {
    kind: Option<String>,
    limit: Option<i64>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(err) => {
                error!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err)
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- Handlers ---

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Personalized Healthcare Agent is running.",
    })
}

async fn run_agent(
    State(state): State<AppState>,
    Json(request): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, ApiError> {
    let response = state
        .service
        .handle(&request)
        .context("agent request failed")?;
    Ok(Json(response))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UserProfile>, ApiError> {
    let user = state
        .service
        .get_user(&user_id)
        .context("database error")?
        .ok_or_else(|| ApiError::NotFound(format!("User '{user_id}' not found")))?;
    Ok(Json(user))
}

async fn get_user_logs(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<LogsQuery>,
) -> Result<Json<Vec<LogEntry>>, ApiError> {
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<LogKind>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT);
    if !(1..=MAX_LOG_LIMIT).contains(&limit) {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_LOG_LIMIT}"
        )));
    }

    if state
        .service
        .get_user(&user_id)
        .context("database error")?
        .is_none()
    {
        return Err(ApiError::NotFound(format!("User '{user_id}' not found")));
    }

    let logs = state
        .service
        .get_logs(&user_id, kind, limit)
        .context("database error")?;
    Ok(Json(logs))
}

// --- Router builder ---

pub(crate) fn build_router(service: Arc<AgentService>) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            let uri = request.uri().to_string();
            info_span!("http_request", method = ?request.method(), uri)
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/run_agent", post(run_agent))
        .route("/api/users/{id}", get(get_user))
        .route("/api/users/{id}/logs", get(get_user_logs))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(cors)
        .layer(trace_layer)
        .layer(middleware::from_fn(security_headers))
        .with_state(AppState { service })
}

// --- Server startup ---

pub async fn start_server(service: AgentService, port: u16, bind: &str) -> anyhow::Result<()> {
    let users = service.count_users().unwrap_or(0);
    if users == 0 {
        eprintln!(
            "Warning: the agent database has no users. Run `gluco import users <file>` first."
        );
    }

    let app = build_router(Arc::new(service));

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}"))
        .await
        .with_context(|| format!("Failed to bind {bind}:{port}"))?;
    info!(users, "agent server ready");
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    const USERS: &str = "\
user_id,first_name,last_name,city,dietary_preference,medical_conditions,physical_limitations,latest_cgm,mood
1001,Tanya,Ramsey,East John,non-vegetarian,None,None,128,Happy
";

    fn test_app() -> Router {
        let service = AgentService::new_in_memory().unwrap();
        service.import_users_csv(USERS.as_bytes()).unwrap();
        build_router(Arc::new(service))
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_agent(body: &serde_json::Value) -> axum::http::Request<Body> {
        axum::http::Request::post("/api/run_agent")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let response = test_app()
            .oneshot(
                axum::http::Request::get("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn run_agent_validate() {
        let response = test_app()
            .oneshot(post_agent(&serde_json::json!({
                "user_id": "1001",
                "intent": "validate",
                "message": ""
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert!(
            json["agent_response"]
                .as_str()
                .unwrap()
                .starts_with("Hello, Tanya from East John!")
        );
        assert_eq!(json["user_data"]["user_id"], "1001");
    }

    #[tokio::test]
    async fn run_agent_unknown_intent_has_no_user_data() {
        let response = test_app()
            .oneshot(post_agent(&serde_json::json!({
                "user_id": "1001",
                "intent": "juggle",
                "message": "now"
            })))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(
            json["agent_response"],
            "Unknown intent. How can I assist you today?"
        );
        assert!(json.get("user_data").is_none());
    }

    #[tokio::test]
    async fn run_agent_rejects_malformed_json() {
        let response = test_app()
            .oneshot(post_agent(&serde_json::json!({ "user_id": "1001" })))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn log_cgm_then_read_history() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(post_agent(&serde_json::json!({
                "user_id": "1001",
                "intent": "log_cgm",
                "message": "glucose 185"
            })))
            .await
            .unwrap();
        let json = body_json(response).await;
        assert_eq!(json["user_data"]["latest_cgm"], "185");

        let response = app
            .oneshot(
                axum::http::Request::get("/api/users/1001/logs?kind=cgm&limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["kind"], "CGM");
        assert_eq!(json[0]["value_int"], 185);
    }

    #[tokio::test]
    async fn get_user_found_and_missing() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(
                axum::http::Request::get("/api/users/1001")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["first_name"], "Tanya");

        let response = app
            .oneshot(
                axum::http::Request::get("/api/users/2000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["error"], "User '2000' not found");
    }

    #[tokio::test]
    async fn logs_bad_kind_and_limit() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(
                axum::http::Request::get("/api/users/1001/logs?kind=sleep")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(
                axum::http::Request::get("/api/users/1001/logs?limit=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn security_headers_present() {
        let response = test_app()
            .oneshot(
                axum::http::Request::get("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get("x-content-type-options").unwrap(),
            "nosniff"
        );
        assert_eq!(response.headers().get("x-frame-options").unwrap(), "DENY");
        assert_eq!(
            response.headers().get("content-security-policy").unwrap(),
            "default-src 'none'"
        );
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let response = test_app()
            .oneshot(
                axum::http::Request::get("/health")
                    .header("origin", "http://localhost:5173")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response
                .headers()
                .get("access-control-allow-origin")
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn body_size_limit_rejects_oversized() {
        let big_body = vec![b' '; BODY_LIMIT + 1];
        let response = test_app()
            .oneshot(
                axum::http::Request::post("/api/run_agent")
                    .header("content-type", "application/json")
                    .body(Body::from(big_body))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn internal_error_does_not_leak_details() {
        let error = ApiError::Internal(anyhow::anyhow!("secret database path /home/user/gluco.db"));
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "Internal server error");
        assert!(!json["error"].as_str().unwrap().contains("secret"));
    }
}
