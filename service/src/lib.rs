//! Agora service runtime — wires storage, engines, and the HTTP API into a
//! runnable unit.
//!
//! The service:
//! - Opens (or creates) the LMDB environment at the configured data dir
//! - Builds the lifecycle, ledger, and tally engines over it
//! - Serves the HTTP API until SIGINT/SIGTERM

pub mod config;
pub mod error;
pub mod logging;
pub mod service;
pub mod shutdown;

pub use config::ServiceConfig;
pub use error::ServiceError;
pub use logging::{init_logging, LogFormat};
pub use service::AgoraService;
pub use shutdown::ShutdownController;
