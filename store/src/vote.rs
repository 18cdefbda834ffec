//! Vote ledger storage trait.

use crate::StoreError;
use agora_types::{Choice, ProposalId, ProposalStatus, Tally, Timestamp, VoteId};
use serde::{Deserialize, Serialize};

/// A stored vote record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub id: VoteId,
    pub proposal: ProposalId,
    pub voter: String,
    pub choice: Choice,
    pub voted_at: Timestamp,
}

/// A vote about to be cast; the store assigns the id.
#[derive(Clone, Debug)]
pub struct NewVote {
    pub proposal: ProposalId,
    pub voter: String,
    pub choice: Choice,
    pub voted_at: Timestamp,
}

/// Trait for the vote ledger.
///
/// The store, not the caller, enforces the one-vote-per-voter rule and the
/// proposal-status precondition: `insert_vote` and `delete_vote` check the
/// proposal's stored status inside the same transaction that mutates the
/// ledger, so a concurrent close or expiry cannot slip between check and
/// write.
pub trait VoteStore {
    /// Append a vote, requiring the target proposal to currently be in
    /// `require_status`.
    ///
    /// Fails with [`StoreError::Duplicate`] if this voter already has a vote
    /// on the proposal, [`StoreError::StateMismatch`] if the proposal is in
    /// another status, and [`StoreError::NotFound`] if it does not exist.
    fn insert_vote(&self, new: &NewVote, require_status: ProposalStatus)
        -> Result<Vote, StoreError>;

    /// Fetch a vote by id. `Ok(None)` if it does not exist.
    fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError>;

    /// Remove a vote, requiring its proposal to currently be in
    /// `require_status`. Same failure modes as [`VoteStore::insert_vote`].
    fn delete_vote(&self, id: VoteId, require_status: ProposalStatus) -> Result<(), StoreError>;

    /// All votes on one proposal, in insertion order.
    fn list_votes(&self, proposal: ProposalId) -> Result<Vec<Vote>, StoreError>;

    /// Every vote in the ledger, in insertion order.
    fn list_all_votes(&self) -> Result<Vec<Vote>, StoreError>;

    /// Count votes on a proposal grouped by choice. Missing choices are zero.
    fn tally_votes(&self, proposal: ProposalId) -> Result<Tally, StoreError>;
}
