//! Nullable store — thread-safe in-memory storage for testing.

use agora_store::{
    NewProposal, NewVote, Proposal, ProposalStore, StoreError, Vote, VoteStore,
};
use agora_types::{ProposalId, ProposalStatus, Tally, VoteId};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

/// An in-memory proposal + vote store for testing.
///
/// Enforces the same contract as the LMDB backend: id assignment from
/// monotone counters starting at 1, the unique `(proposal, voter)` index,
/// and status preconditions checked under the same lock that mutates the
/// tables. Cloning yields another handle to the same data.
#[derive(Clone)]
pub struct NullStore {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    proposals: BTreeMap<u64, Proposal>,
    votes: BTreeMap<u64, Vote>,
    /// `(proposal id, voter)` -> vote id. One vote per voter per proposal.
    voter_index: HashMap<(u64, String), u64>,
    next_proposal_id: u64,
    next_vote_id: u64,
}

impl NullStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                proposals: BTreeMap::new(),
                votes: BTreeMap::new(),
                voter_index: HashMap::new(),
                next_proposal_id: 1,
                next_vote_id: 1,
            })),
        }
    }
}

impl Default for NullStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProposalStore for NullStore {
    fn create_proposal(&self, new: &NewProposal) -> Result<Proposal, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_proposal_id;
        inner.next_proposal_id += 1;
        let proposal = Proposal {
            id: ProposalId::new(id),
            title: new.title.clone(),
            description: new.description.clone(),
            created_at: new.created_at,
            deadline: new.deadline,
            status: new.status,
        };
        inner.proposals.insert(id, proposal.clone());
        Ok(proposal)
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        Ok(self.inner.lock().unwrap().proposals.get(&id.as_u64()).cloned())
    }

    fn update_proposal_status(
        &self,
        id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
    ) -> Result<Proposal, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let proposal = inner
            .proposals
            .get_mut(&id.as_u64())
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
        if proposal.status != from {
            return Err(StoreError::StateMismatch {
                required: from,
                actual: proposal.status,
            });
        }
        proposal.status = to;
        Ok(proposal.clone())
    }

    fn list_proposal_ids(&self) -> Result<Vec<ProposalId>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .proposals
            .keys()
            .map(|&id| ProposalId::new(id))
            .collect())
    }

    fn delete_proposal(&self, id: ProposalId) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.proposals.remove(&id.as_u64()).is_none() {
            return Err(StoreError::NotFound(format!("proposal {id}")));
        }
        inner.votes.retain(|_, vote| vote.proposal != id);
        inner.voter_index.retain(|(pid, _), _| *pid != id.as_u64());
        Ok(())
    }

    fn proposal_count(&self) -> Result<u64, StoreError> {
        Ok(self.inner.lock().unwrap().proposals.len() as u64)
    }
}

impl VoteStore for NullStore {
    fn insert_vote(
        &self,
        new: &NewVote,
        require_status: ProposalStatus,
    ) -> Result<Vote, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let status = inner
            .proposals
            .get(&new.proposal.as_u64())
            .map(|p| p.status)
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", new.proposal)))?;
        if status != require_status {
            return Err(StoreError::StateMismatch {
                required: require_status,
                actual: status,
            });
        }
        let index_key = (new.proposal.as_u64(), new.voter.clone());
        if inner.voter_index.contains_key(&index_key) {
            return Err(StoreError::Duplicate(format!(
                "vote by '{}' on proposal {}",
                new.voter, new.proposal
            )));
        }
        let id = inner.next_vote_id;
        inner.next_vote_id += 1;
        let vote = Vote {
            id: VoteId::new(id),
            proposal: new.proposal,
            voter: new.voter.clone(),
            choice: new.choice,
            voted_at: new.voted_at,
        };
        inner.voter_index.insert(index_key, id);
        inner.votes.insert(id, vote.clone());
        Ok(vote)
    }

    fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError> {
        Ok(self.inner.lock().unwrap().votes.get(&id.as_u64()).cloned())
    }

    fn delete_vote(&self, id: VoteId, require_status: ProposalStatus) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let (proposal, voter) = match inner.votes.get(&id.as_u64()) {
            Some(vote) => (vote.proposal, vote.voter.clone()),
            None => return Err(StoreError::NotFound(format!("vote {id}"))),
        };
        let status = inner
            .proposals
            .get(&proposal.as_u64())
            .map(|p| p.status)
            .ok_or_else(|| StoreError::NotFound(format!("proposal {proposal}")))?;
        if status != require_status {
            return Err(StoreError::StateMismatch {
                required: require_status,
                actual: status,
            });
        }
        inner.votes.remove(&id.as_u64());
        inner.voter_index.remove(&(proposal.as_u64(), voter));
        Ok(())
    }

    fn list_votes(&self, proposal: ProposalId) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .votes
            .values()
            .filter(|vote| vote.proposal == proposal)
            .cloned()
            .collect())
    }

    fn list_all_votes(&self) -> Result<Vec<Vote>, StoreError> {
        Ok(self.inner.lock().unwrap().votes.values().cloned().collect())
    }

    fn tally_votes(&self, proposal: ProposalId) -> Result<Tally, StoreError> {
        let inner = self.inner.lock().unwrap();
        let mut tally = Tally::ZERO;
        for vote in inner.votes.values().filter(|vote| vote.proposal == proposal) {
            tally.record(vote.choice);
        }
        Ok(tally)
    }
}
