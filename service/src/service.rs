//! Service composition — storage, engines, and the HTTP server.

use crate::config::ServiceConfig;
use crate::error::ServiceError;
use crate::shutdown::ShutdownController;
use agora_engine::{ProposalLifecycle, StaticTokenGate, SECS_PER_DAY};
use agora_rpc::{AppState, RpcServer};
use agora_store::ProposalStore;
use agora_store_lmdb::LmdbStore;
use agora_types::SystemClock;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};

/// A running agora service: LMDB storage, the three engines, and the HTTP
/// API bound to one port.
pub struct AgoraService {
    config: ServiceConfig,
    state: AppState<LmdbStore>,
    shutdown: Arc<ShutdownController>,
}

impl AgoraService {
    /// Open storage at `config.data_dir` and wire the engines.
    pub fn open(config: ServiceConfig) -> Result<Self, ServiceError> {
        let store = LmdbStore::open(&config.data_dir)?;
        let proposals = store.proposal_count()?;
        info!(path = %config.data_dir.display(), proposals, "storage opened");

        if config.admin_token.is_none() {
            warn!("no admin token configured; proposals can only expire, not be closed");
        }
        let gate = Arc::new(StaticTokenGate::new(config.admin_token.clone()));
        let default_open_secs = u64::from(config.default_open_days) * SECS_PER_DAY;
        let lifecycle = ProposalLifecycle::new(store, gate, default_open_secs);
        let state = AppState::new(lifecycle, Arc::new(SystemClock));

        Ok(Self {
            config,
            state,
            shutdown: Arc::new(ShutdownController::new()),
        })
    }

    /// Shared handler state (engines + clock), cloneable per request.
    pub fn state(&self) -> AppState<LmdbStore> {
        self.state.clone()
    }

    /// Controller for stopping the service from outside [`run`].
    ///
    /// [`run`]: AgoraService::run
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.shutdown)
    }

    /// Serve the HTTP API until a shutdown signal arrives.
    pub async fn run(&self) -> Result<(), ServiceError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.rpc_port));
        let server = RpcServer::new(addr, self.config.enable_metrics);

        let signals = Arc::clone(&self.shutdown);
        tokio::spawn(async move { signals.wait_for_signal().await });

        server
            .serve(self.state.clone(), self.shutdown.signalled())
            .await?;
        info!("agora service stopped");
        Ok(())
    }
}
