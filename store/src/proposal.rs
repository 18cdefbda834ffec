//! Proposal storage trait.

use crate::StoreError;
use agora_types::{ProposalId, ProposalStatus, Timestamp};
use serde::{Deserialize, Serialize};

/// A stored proposal record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    /// Instant after which the proposal counts as expired (strictly past).
    pub deadline: Timestamp,
    pub status: ProposalStatus,
}

/// A proposal about to be created; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub created_at: Timestamp,
    pub deadline: Timestamp,
    pub status: ProposalStatus,
}

/// Trait for storing proposals.
///
/// Conditional operations (`update_proposal_status`) must be atomic with
/// respect to concurrent writers: the status check and the write happen
/// inside one storage transaction.
pub trait ProposalStore {
    /// Persist a new proposal, assigning the next id.
    fn create_proposal(&self, new: &NewProposal) -> Result<Proposal, StoreError>;

    /// Fetch a proposal by id. `Ok(None)` if it does not exist.
    fn get_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError>;

    /// Transition `id` from `from` to `to`, atomically.
    ///
    /// Fails with [`StoreError::StateMismatch`] if the stored status is not
    /// `from`, and with [`StoreError::NotFound`] if the proposal is missing.
    /// Returns the updated record.
    fn update_proposal_status(
        &self,
        id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
    ) -> Result<Proposal, StoreError>;

    /// All proposal ids in ascending id order.
    fn list_proposal_ids(&self) -> Result<Vec<ProposalId>, StoreError>;

    /// Delete a proposal and every vote cast on it, atomically.
    fn delete_proposal(&self, id: ProposalId) -> Result<(), StoreError>;

    /// Total number of stored proposals.
    fn proposal_count(&self) -> Result<u64, StoreError>;
}
