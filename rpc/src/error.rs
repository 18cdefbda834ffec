//! HTTP error responses.
//!
//! Every failure leaves the server in the same JSON envelope:
//! `{"error": {"kind": "...", "message": "..."}}`. The `kind` is a stable
//! machine-readable label, the message is for humans.

use agora_engine::EngineError;
use agora_store::StoreError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// An error ready to render as an HTTP response.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub kind: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            kind: "validation",
            message: message.into(),
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let (status, kind) = match &e {
            EngineError::Invalid(_) => (StatusCode::BAD_REQUEST, "validation"),
            EngineError::Unauthorized => (StatusCode::FORBIDDEN, "forbidden"),
            EngineError::ProposalNotFound(_) | EngineError::VoteNotFound(_) => {
                (StatusCode::NOT_FOUND, "not_found")
            }
            EngineError::DuplicateVote { .. } => (StatusCode::CONFLICT, "conflict"),
            EngineError::NotActive { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "invalid_state"),
            EngineError::Store(StoreError::Busy(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
            }
            EngineError::Store(store_err) => {
                // Storage internals stay out of the response body.
                error!(error = %store_err, "storage error while serving request");
                return Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    kind: "internal",
                    message: "internal storage error".to_string(),
                };
            }
        };
        Self {
            status,
            kind,
            message: e.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": { "kind": self.kind, "message": self.message }
        }));
        (self.status, body).into_response()
    }
}

/// `Json` extractor that reports malformed bodies in the standard envelope
/// instead of axum's plain-text rejection.
pub struct ApiJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}
