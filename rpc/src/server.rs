//! Axum-based HTTP server.

use crate::handlers;
use crate::metrics::ApiMetrics;
use agora_engine::{ProposalLifecycle, TallyEngine, VoteLedger};
use agora_store::LedgerStore;
use agora_types::Clock;
use axum::http::Method;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Errors from the HTTP server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind listener: {0}")]
    Bind(std::io::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Shared state handed to every request handler.
pub struct AppState<S> {
    pub lifecycle: ProposalLifecycle<S>,
    pub ledger: VoteLedger<S>,
    pub tally: TallyEngine<S>,
    pub clock: Arc<dyn Clock>,
    pub metrics: Arc<ApiMetrics>,
}

impl<S: Clone> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            lifecycle: self.lifecycle.clone(),
            ledger: self.ledger.clone(),
            tally: self.tally.clone(),
            clock: Arc::clone(&self.clock),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

impl<S> AppState<S>
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    /// Wire the ledger and tally engines off one lifecycle handle.
    pub fn new(lifecycle: ProposalLifecycle<S>, clock: Arc<dyn Clock>) -> Self {
        let ledger = VoteLedger::new(lifecycle.clone());
        let tally = TallyEngine::new(lifecycle.clone());
        Self {
            lifecycle,
            ledger,
            tally,
            clock,
            metrics: Arc::new(ApiMetrics::new()),
        }
    }
}

/// Build the application router with every API route.
pub fn router<S>(state: AppState<S>, metrics_enabled: bool) -> Router
where
    S: LedgerStore + Clone + Send + Sync + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/proposals",
            post(handlers::create_proposal::<S>).get(handlers::list_proposals::<S>),
        )
        .route("/proposals/:id", get(handlers::get_proposal::<S>))
        .route("/proposals/:id/close", patch(handlers::close_proposal::<S>))
        .route("/proposals/:id/vote", post(handlers::cast_vote::<S>))
        .route("/votes", get(handlers::list_votes::<S>))
        .route("/votes/:id", delete(handlers::revoke_vote::<S>));
    if metrics_enabled {
        app = app.route("/metrics", get(handlers::metrics::<S>));
    }
    app.layer(cors).with_state(state)
}

/// HTTP server for the proposal API.
pub struct RpcServer {
    addr: SocketAddr,
    metrics_enabled: bool,
}

impl RpcServer {
    pub fn new(addr: SocketAddr, metrics_enabled: bool) -> Self {
        Self {
            addr,
            metrics_enabled,
        }
    }

    /// Bind and serve until `shutdown` resolves.
    pub async fn serve<S>(
        &self,
        state: AppState<S>,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError>
    where
        S: LedgerStore + Clone + Send + Sync + 'static,
    {
        let app = router(state, self.metrics_enabled);
        let listener = tokio::net::TcpListener::bind(self.addr)
            .await
            .map_err(ServerError::Bind)?;
        info!(addr = %self.addr, "HTTP API listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServerError::Serve)?;
        Ok(())
    }
}
