//! Proposal lifecycle engine — creation, lazy expiry, admin close.
//!
//! A proposal's stored status can lag reality: nothing runs in the
//! background when a deadline passes. Instead every access goes through
//! [`ProposalLifecycle::resolve`], which flushes an overdue `Active`
//! proposal to `Expired` before anyone acts on it. The flush is a
//! conditional store update, so two concurrent accessors cannot both
//! transition the same proposal.

use std::sync::Arc;

use agora_store::{NewProposal, Proposal, ProposalStore, StoreError};
use agora_types::{AdminGate, ProposalId, ProposalStatus, Timestamp};

use crate::error::EngineError;

/// Fallback voting window when a request does not name one: 2 days.
pub const DEFAULT_OPEN_SECS: u64 = 172_800;

/// Seconds per day, for turning a `days_open` request field into a window.
pub const SECS_PER_DAY: u64 = 86_400;

/// Drives proposals through `active -> closed | expired`.
#[derive(Clone)]
pub struct ProposalLifecycle<S> {
    store: S,
    gate: Arc<dyn AdminGate>,
    default_open_secs: u64,
}

impl<S: ProposalStore> ProposalLifecycle<S> {
    pub fn new(store: S, gate: Arc<dyn AdminGate>, default_open_secs: u64) -> Self {
        Self {
            store,
            gate,
            default_open_secs,
        }
    }

    /// Create a proposal open for `open_secs` (or the configured default).
    pub fn create(
        &self,
        title: &str,
        description: &str,
        open_secs: Option<u64>,
        now: Timestamp,
    ) -> Result<Proposal, EngineError> {
        if title.is_empty() {
            return Err(EngineError::Invalid("title must not be empty".to_string()));
        }
        if description.is_empty() {
            return Err(EngineError::Invalid(
                "description must not be empty".to_string(),
            ));
        }
        let open_secs = open_secs.unwrap_or(self.default_open_secs);
        let deadline = now
            .checked_add_secs(open_secs)
            .ok_or_else(|| EngineError::Invalid("deadline overflows the clock".to_string()))?;
        let proposal = self.store.create_proposal(&NewProposal {
            title: title.to_string(),
            description: description.to_string(),
            created_at: now,
            deadline,
            status: ProposalStatus::Active,
        })?;
        Ok(proposal)
    }

    /// Fetch a proposal with its status brought up to date.
    ///
    /// An `Active` proposal whose deadline lies strictly in the past is
    /// flushed to `Expired` first. If another writer transitions the
    /// proposal between our read and the flush, the stored outcome wins
    /// and is returned as-is.
    pub fn resolve(&self, id: ProposalId, now: Timestamp) -> Result<Proposal, EngineError> {
        let proposal = self
            .store
            .get_proposal(id)?
            .ok_or(EngineError::ProposalNotFound(id))?;
        if proposal.status.is_active() && proposal.deadline.is_past(now) {
            return match self.store.update_proposal_status(
                id,
                ProposalStatus::Active,
                ProposalStatus::Expired,
            ) {
                Ok(updated) => Ok(updated),
                Err(StoreError::StateMismatch { .. }) => self
                    .store
                    .get_proposal(id)?
                    .ok_or(EngineError::ProposalNotFound(id)),
                Err(e) => Err(e.into()),
            };
        }
        Ok(proposal)
    }

    /// Every proposal, statuses up to date, ascending id order.
    ///
    /// A proposal deleted while the listing runs is skipped rather than
    /// failing the whole call.
    pub fn list(&self, now: Timestamp) -> Result<Vec<Proposal>, EngineError> {
        let ids = self.store.list_proposal_ids()?;
        let mut proposals = Vec::with_capacity(ids.len());
        for id in ids {
            match self.resolve(id, now) {
                Ok(proposal) => proposals.push(proposal),
                Err(EngineError::ProposalNotFound(_)) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(proposals)
    }

    /// End voting early. Requires an admin credential and an `Active`
    /// proposal; a proposal already past its deadline expires instead.
    pub fn close(
        &self,
        id: ProposalId,
        credential: Option<&str>,
        now: Timestamp,
    ) -> Result<Proposal, EngineError> {
        // Authorization is checked before existence: an unauthorized caller
        // learns nothing about which proposal ids are taken.
        if !self.gate.is_authorized(credential) {
            return Err(EngineError::Unauthorized);
        }
        let proposal = self.resolve(id, now)?;
        if !proposal.status.is_active() {
            return Err(EngineError::NotActive {
                proposal: id,
                status: proposal.status,
            });
        }
        match self
            .store
            .update_proposal_status(id, ProposalStatus::Active, ProposalStatus::Closed)
        {
            Ok(updated) => Ok(updated),
            // Lost a race against expiry or another close.
            Err(StoreError::StateMismatch { actual, .. }) => Err(EngineError::NotActive {
                proposal: id,
                status: actual,
            }),
            Err(StoreError::NotFound(_)) => Err(EngineError::ProposalNotFound(id)),
            Err(e) => Err(e.into()),
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}
