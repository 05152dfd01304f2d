//! HTTP server: router, state, and the prediction handler
//!
//! The error mapping is deliberate: every encoding failure is a client
//! error (400) carrying the encoder's own message, unknown neighborhoods
//! are not errors at all, and only genuine internal faults reach 500.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use ames_model::{Artifact, RecordEncoder};
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{Map, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Immutable per-process state, injected into the router.
///
/// The artifact is loaded once before the listener binds and never written
/// afterwards; tree traversal is read-only, so concurrent requests share it
/// without locking.
pub struct AppState {
    artifact: Artifact,
    start_time: Instant,
    req_count: AtomicUsize,
}

impl AppState {
    pub fn new(artifact: Artifact) -> Self {
        Self {
            artifact,
            start_time: Instant::now(),
            req_count: AtomicUsize::new(0),
        }
    }

    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    fn record_request(&self) -> u64 {
        self.req_count.fetch_add(1, Ordering::Relaxed) as u64 + 1
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type SharedState = Arc<AppState>;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn internal<S: Into<String>>(message: S) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

#[derive(Debug, Serialize)]
struct PredictResponse {
    #[serde(rename = "predictedPrice")]
    predicted_price: f64,
    #[serde(rename = "featureImportance")]
    feature_importance: BTreeMap<String, f64>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
    trees: usize,
    neighborhoods: usize,
    req_total: u64,
}

/// Serve the router on the given address until the process is stopped.
pub async fn start_server(state: AppState, addr: &str) -> Result<()> {
    let shared = Arc::new(state);
    let app = build_router(shared);
    let listener = bind_listener(addr).await?;
    axum::serve(listener, app)
        .await
        .context("prediction server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

/// Build the application router around injected state.
///
/// Cross-origin calls are unrestricted; the service is meant to sit behind
/// a browser frontend on another origin.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/predict", post(handle_predict))
        .route("/health", get(handle_health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn handle_predict(
    State(state): State<SharedState>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    state.record_request();

    let Json(record) = body.map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;

    let artifact = state.artifact();
    let encoder = RecordEncoder::new(&artifact.neighborhoods);

    // Every encoding failure is the client's: missing keys, bad quality
    // symbols, non-numeric values.
    let vector = encoder
        .build_vector(&record)
        .map_err(|err| ApiError::bad_request(err.to_string()))?;

    let prediction = artifact.model.predict(&vector);
    if !prediction.is_finite() {
        return Err(ApiError::internal(format!(
            "model produced a non-finite prediction: {prediction}"
        )));
    }

    let feature_importance: BTreeMap<String, f64> = artifact
        .feature_names
        .iter()
        .zip(artifact.model.feature_importances.iter())
        .map(|(name, &importance)| (name.clone(), round3(importance)))
        .collect();

    Ok(Json(PredictResponse {
        predicted_price: round2(prediction),
        feature_importance,
    }))
}

async fn handle_health(State(state): State<SharedState>) -> Json<HealthResponse> {
    let req_total = state.record_request();
    let artifact = state.artifact();

    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.uptime_seconds(),
        trees: artifact.model.num_trees(),
        neighborhoods: artifact.neighborhoods.len(),
        req_total,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
