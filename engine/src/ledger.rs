//! Vote ledger engine — casting and revoking votes.
//!
//! The engine checks the proposal is votable before touching the ledger,
//! but the store re-checks the same precondition inside its own write
//! transaction. The engine-level check exists to hand back precise errors;
//! the store-level check is the one that holds under concurrency.

use agora_store::{LedgerStore, NewVote, StoreError, Vote};
use agora_types::{Choice, ProposalId, Timestamp, VoteId};

use crate::error::EngineError;
use crate::lifecycle::ProposalLifecycle;

/// Append-and-revoke vote ledger over a proposal lifecycle.
#[derive(Clone)]
pub struct VoteLedger<S> {
    lifecycle: ProposalLifecycle<S>,
}

impl<S: LedgerStore> VoteLedger<S> {
    pub fn new(lifecycle: ProposalLifecycle<S>) -> Self {
        Self { lifecycle }
    }

    /// Cast `voter`'s vote on a proposal. One vote per voter: a second
    /// cast fails until the first is revoked.
    pub fn cast(
        &self,
        proposal: ProposalId,
        voter: &str,
        choice: Choice,
        now: Timestamp,
    ) -> Result<Vote, EngineError> {
        if voter.is_empty() {
            return Err(EngineError::Invalid(
                "voter_name must not be empty".to_string(),
            ));
        }
        let resolved = self.lifecycle.resolve(proposal, now)?;
        if !resolved.status.is_active() {
            return Err(EngineError::NotActive {
                proposal,
                status: resolved.status,
            });
        }
        let new = NewVote {
            proposal,
            voter: voter.to_string(),
            choice,
            voted_at: now,
        };
        match self
            .lifecycle
            .store()
            .insert_vote(&new, agora_types::ProposalStatus::Active)
        {
            Ok(vote) => Ok(vote),
            Err(StoreError::Duplicate(_)) => Err(EngineError::DuplicateVote {
                proposal,
                voter: voter.to_string(),
            }),
            Err(StoreError::StateMismatch { actual, .. }) => Err(EngineError::NotActive {
                proposal,
                status: actual,
            }),
            Err(StoreError::NotFound(_)) => Err(EngineError::ProposalNotFound(proposal)),
            Err(e) => Err(e.into()),
        }
    }

    /// Remove a vote from the ledger, freeing the voter to vote again.
    /// Only allowed while the vote's proposal is still active.
    pub fn revoke(&self, id: VoteId, now: Timestamp) -> Result<(), EngineError> {
        let vote = self
            .lifecycle
            .store()
            .get_vote(id)?
            .ok_or(EngineError::VoteNotFound(id))?;
        let proposal = self.lifecycle.resolve(vote.proposal, now)?;
        if !proposal.status.is_active() {
            return Err(EngineError::NotActive {
                proposal: vote.proposal,
                status: proposal.status,
            });
        }
        match self
            .lifecycle
            .store()
            .delete_vote(id, agora_types::ProposalStatus::Active)
        {
            Ok(()) => Ok(()),
            // Vote or proposal vanished between the read and the delete.
            Err(StoreError::NotFound(_)) => Err(EngineError::VoteNotFound(id)),
            Err(StoreError::StateMismatch { actual, .. }) => Err(EngineError::NotActive {
                proposal: vote.proposal,
                status: actual,
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Every vote across all proposals, in insertion order.
    pub fn list_all(&self) -> Result<Vec<Vote>, EngineError> {
        Ok(self.lifecycle.store().list_all_votes()?)
    }
}
