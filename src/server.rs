use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::submission::{ApplicationPayload, SubmissionHandler};

pub const APPLICATION_PATH: &str = "/api/application";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Success,
    Error,
}

/// Body of every `/api/application` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub result: ResultKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse {
    pub fn success() -> Self {
        Self {
            result: ResultKind::Success,
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            result: ResultKind::Error,
            message: Some(message.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

pub fn router(handler: Arc<SubmissionHandler>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(APPLICATION_PATH, post(submit_application))
        .with_state(handler)
}

pub async fn serve(addr: SocketAddr, handler: Arc<SubmissionHandler>) -> anyhow::Result<()> {
    let store = handler.store_name().to_string();
    let app = router(handler);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    println!("Listening on http://{addr} (store: {store})");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not install Ctrl-C handler: {e}");
        std::future::pending::<()>().await;
    }
}

async fn healthz() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn submit_application(
    State(handler): State<Arc<SubmissionHandler>>,
    body: Result<Json<ApplicationPayload>, JsonRejection>,
) -> Result<Json<ApiResponse>, AppError> {
    let Json(payload) = body.map_err(|rejection| {
        let err = AppError::InvalidPayload(rejection.body_text());
        tracing::error!("Application request rejected: {err}");
        err
    })?;

    handler.submit(payload).await?;
    Ok(Json(ApiResponse::success()))
}
