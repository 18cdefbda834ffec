//! HTTP API for the agora voting service.
//!
//! Endpoints:
//! - `GET /health` liveness probe
//! - `POST /proposals`, `GET /proposals`, `GET /proposals/:id`
//! - `PATCH /proposals/:id/close` (requires the `x-admin-token` header)
//! - `POST /proposals/:id/vote`, `GET /votes`, `DELETE /votes/:id`
//! - `GET /metrics` Prometheus exposition (when enabled)
//!
//! Handlers are generic over the storage backend so the whole surface can
//! be exercised against the in-memory store in tests.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;

pub use error::{ApiError, ApiJson};
pub use handlers::ADMIN_TOKEN_HEADER;
pub use metrics::ApiMetrics;
pub use server::{router, AppState, RpcServer, ServerError};
