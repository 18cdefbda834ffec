//! LMDB implementation of ProposalStore.

use agora_store::proposal::{NewProposal, Proposal, ProposalStore};
use agora_store::StoreError;
use agora_types::{ProposalId, ProposalStatus, VoteId};

use crate::environment::{proposal_key, vote_key, LmdbStore, NEXT_PROPOSAL_ID_KEY};
use crate::LmdbError;

impl ProposalStore for LmdbStore {
    fn create_proposal(&self, new: &NewProposal) -> Result<Proposal, StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let id = self.bump_counter(&mut wtxn, NEXT_PROPOSAL_ID_KEY)?;
        let proposal = Proposal {
            id: ProposalId::new(id),
            title: new.title.clone(),
            description: new.description.clone(),
            created_at: new.created_at,
            deadline: new.deadline,
            status: new.status,
        };
        let bytes = bincode::serialize(&proposal).map_err(LmdbError::from)?;
        self.proposals_db
            .put(&mut wtxn, &proposal_key(proposal.id), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(proposal)
    }

    fn get_proposal(&self, id: ProposalId) -> Result<Option<Proposal>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.read_proposal(&rtxn, id)?)
    }

    fn update_proposal_status(
        &self,
        id: ProposalId,
        from: ProposalStatus,
        to: ProposalStatus,
    ) -> Result<Proposal, StoreError> {
        // The status check and the rewrite share one write transaction, so
        // two racing transitions cannot both observe `from`.
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let mut proposal = self
            .read_proposal(&wtxn, id)?
            .ok_or_else(|| StoreError::NotFound(format!("proposal {id}")))?;
        if proposal.status != from {
            return Err(StoreError::StateMismatch {
                required: from,
                actual: proposal.status,
            });
        }
        proposal.status = to;
        let bytes = bincode::serialize(&proposal).map_err(LmdbError::from)?;
        self.proposals_db
            .put(&mut wtxn, &proposal_key(id), &bytes)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(proposal)
    }

    fn list_proposal_ids(&self) -> Result<Vec<ProposalId>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut ids = Vec::new();
        let iter = self.proposals_db.iter(&rtxn).map_err(LmdbError::from)?;
        for result in iter {
            let (key, _val) = result.map_err(LmdbError::from)?;
            let arr: [u8; 8] = key
                .try_into()
                .map_err(|_| LmdbError::Serialization("invalid proposal key length".to_string()))?;
            ids.push(ProposalId::new(u64::from_be_bytes(arr)));
        }
        Ok(ids)
    }

    fn delete_proposal(&self, id: ProposalId) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        let existed = self
            .proposals_db
            .delete(&mut wtxn, &proposal_key(id))
            .map_err(LmdbError::from)?;
        if !existed {
            return Err(StoreError::NotFound(format!("proposal {id}")));
        }
        // Cascade: drop every vote on this proposal and its index rows.
        let entries = self.vote_index_entries(&wtxn, id)?;
        for (index_key, vote_id) in entries {
            self.votes_db
                .delete(&mut wtxn, &vote_key(VoteId::new(vote_id)))
                .map_err(LmdbError::from)?;
            self.voter_index_db
                .delete(&mut wtxn, &index_key)
                .map_err(LmdbError::from)?;
        }
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn proposal_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let count = self.proposals_db.len(&rtxn).map_err(LmdbError::from)?;
        Ok(count)
    }
}
