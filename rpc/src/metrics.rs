//! Prometheus metrics for the HTTP API.
//!
//! Counters covering proposal and vote activity.  The [`ApiMetrics`] struct
//! owns a dedicated [`Registry`] that the `/metrics` endpoint encodes into
//! the Prometheus text exposition format.

use prometheus::{register_int_counter_with_registry, IntCounter, Opts, Registry};

/// Central collection of all API-level Prometheus metrics.
pub struct ApiMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    /// Total number of proposals created.
    pub proposals_created: IntCounter,
    /// Total number of proposals closed early by an admin.
    pub proposals_closed: IntCounter,
    /// Total number of votes cast.
    pub votes_cast: IntCounter,
    /// Total number of votes revoked.
    pub votes_revoked: IntCounter,
}

impl ApiMetrics {
    /// Create a fresh set of metrics, all registered under a new
    /// [`Registry`].
    pub fn new() -> Self {
        let registry = Registry::new();

        let proposals_created = register_int_counter_with_registry!(
            Opts::new("agora_proposals_created_total", "Total proposals created"),
            registry
        )
        .expect("failed to register proposals_created counter");

        let proposals_closed = register_int_counter_with_registry!(
            Opts::new(
                "agora_proposals_closed_total",
                "Total proposals closed early by an admin"
            ),
            registry
        )
        .expect("failed to register proposals_closed counter");

        let votes_cast = register_int_counter_with_registry!(
            Opts::new("agora_votes_cast_total", "Total votes cast"),
            registry
        )
        .expect("failed to register votes_cast counter");

        let votes_revoked = register_int_counter_with_registry!(
            Opts::new("agora_votes_revoked_total", "Total votes revoked"),
            registry
        )
        .expect("failed to register votes_revoked counter");

        Self {
            registry,
            proposals_created,
            proposals_closed,
            votes_cast,
            votes_revoked,
        }
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}
