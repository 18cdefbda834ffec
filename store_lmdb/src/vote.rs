//! LMDB implementation of VoteStore.
//!
//! Every mutation re-reads the target proposal's status inside its own
//! write transaction. LMDB serializes writers, so the precondition cannot
//! go stale between the check and the commit.

use heed::PutFlags;

use agora_store::vote::{NewVote, Vote, VoteStore};
use agora_store::StoreError;
use agora_types::{ProposalId, ProposalStatus, Tally, VoteId};

use crate::environment::{vote_key, voter_index_key, LmdbStore, NEXT_VOTE_ID_KEY};
use crate::LmdbError;

impl VoteStore for LmdbStore {
    fn insert_vote(
        &self,
        new: &NewVote,
        require_status: ProposalStatus,
    ) -> Result<Vote, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let proposal = self
            .read_proposal(&wtxn, new.proposal)?
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", new.proposal)))?;
        if proposal.status != require_status {
            return Err(StoreError::StateMismatch {
                required: require_status,
                actual: proposal.status,
            });
        }

        let id = self.bump_counter(&mut wtxn, NEXT_VOTE_ID_KEY)?;
        let vote = Vote {
            id: VoteId::new(id),
            proposal: new.proposal,
            voter: new.voter.clone(),
            choice: new.choice,
            voted_at: new.voted_at,
        };

        // NO_OVERWRITE makes LMDB itself reject a second vote by the same
        // voter; the aborted transaction also rolls back the counter bump.
        let index_key = voter_index_key(new.proposal, &new.voter);
        match self.voter_index_db.put_with_flags(
            &mut wtxn,
            PutFlags::NO_OVERWRITE,
            &index_key,
            &vote_key(vote.id),
        ) {
            Ok(()) => {}
            Err(heed::Error::Mdb(heed::MdbError::KeyExist)) => {
                return Err(StoreError::Duplicate(format!(
                    "vote by '{}' on proposal {}",
                    new.voter, new.proposal
                )));
            }
            Err(e) => return Err(LmdbError::from(e).into()),
        }

        let bytes = bincode::serialize(&vote).map_err(LmdbError::from)?;
        self.votes_db
            .put(&mut wtxn, &vote_key(vote.id), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(vote)
    }

    fn get_vote(&self, id: VoteId) -> Result<Option<Vote>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        match self.votes_db.get(&rtxn, &vote_key(id)).map_err(LmdbError::from)? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes).map_err(LmdbError::from)?)),
            None => Ok(None),
        }
    }

    fn delete_vote(&self, id: VoteId, require_status: ProposalStatus) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let vote: Vote = match self
            .votes_db
            .get(&wtxn, &vote_key(id))
            .map_err(LmdbError::from)?
        {
            Some(bytes) => bincode::deserialize(bytes).map_err(LmdbError::from)?,
            None => return Err(StoreError::NotFound(format!("vote {id}"))),
        };
        let proposal = self
            .read_proposal(&wtxn, vote.proposal)?
            .ok_or_else(|| StoreError::NotFound(format!("proposal {}", vote.proposal)))?;
        if proposal.status != require_status {
            return Err(StoreError::StateMismatch {
                required: require_status,
                actual: proposal.status,
            });
        }
        self.votes_db
            .delete(&mut wtxn, &vote_key(id))
            .map_err(LmdbError::from)?;
        self.voter_index_db
            .delete(&mut wtxn, &voter_index_key(vote.proposal, &vote.voter))
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn list_votes(&self, proposal: ProposalId) -> Result<Vec<Vote>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut ids: Vec<u64> = self
            .vote_index_entries(&rtxn, proposal)?
            .into_iter()
            .map(|(_key, vote_id)| vote_id)
            .collect();
        // Index rows sort by voter name; callers get insertion order.
        ids.sort_unstable();
        let mut votes = Vec::with_capacity(ids.len());
        for vote_id in ids {
            let bytes = self
                .votes_db
                .get(&rtxn, &vote_key(VoteId::new(vote_id)))
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    StoreError::Corruption(format!("voter index points at missing vote {vote_id}"))
                })?;
            votes.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(votes)
    }

    fn list_all_votes(&self) -> Result<Vec<Vote>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut votes = Vec::new();
        let iter = self.votes_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (_key, bytes) = result.map_err(LmdbError::from)?;
            votes.push(bincode::deserialize(bytes).map_err(LmdbError::from)?);
        }
        Ok(votes)
    }

    fn tally_votes(&self, proposal: ProposalId) -> Result<Tally, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut tally = Tally::ZERO;
        for (_key, vote_id) in self.vote_index_entries(&rtxn, proposal)? {
            let bytes = self
                .votes_db
                .get(&rtxn, &vote_key(VoteId::new(vote_id)))
                .map_err(LmdbError::from)?
                .ok_or_else(|| {
                    StoreError::Corruption(format!("voter index points at missing vote {vote_id}"))
                })?;
            let vote: Vote = bincode::deserialize(bytes).map_err(LmdbError::from)?;
            tally.record(vote.choice);
        }
        Ok(tally)
    }
}
