use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::debug;

use crate::application::services::webhook_gateway::WebhookGateway;
use crate::domain::entities::account::AccountId;
use crate::domain::errors::{GatewayError, SessionError};

/// Acknowledgement returned once a batch has been processed
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub accounts: usize,
    pub cached_sessions: usize,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::InvalidAccount(_)
            | GatewayError::Session(SessionError::InvalidAccount(_)) => StatusCode::FORBIDDEN,
            GatewayError::MalformedRequest(_) | GatewayError::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Build the HTTP router around a gateway
pub fn router(gateway: Arc<WebhookGateway>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/:account_id", post(receive_alerts))
        .with_state(gateway)
        .layer(DefaultBodyLimit::disable())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
}

/// Accept an alert batch for one account
///
/// Answers 200 once every entry was handled, even when single intents failed.
pub async fn receive_alerts(
    State(gateway): State<Arc<WebhookGateway>>,
    Path(segment): Path<String>,
    body: Bytes,
) -> Response {
    let Some(account_id) = AccountId::from_path_segment(&segment) else {
        debug!("ignoring webhook for non-numeric account segment {:?}", segment);
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Not Found".to_string(),
            }),
        )
            .into_response();
    };

    match gateway.handle(&account_id, &body).await {
        Ok(_) => Json(StatusResponse {
            status: "orders processed".to_string(),
        })
        .into_response(),
        Err(e) => e.into_response(),
    }
}

/// Health check endpoint
pub async fn health_check(State(gateway): State<Arc<WebhookGateway>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "running".to_string(),
        accounts: gateway.registry().len(),
        cached_sessions: gateway.sessions().cached_sessions().await,
    })
}
