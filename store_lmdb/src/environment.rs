//! LMDB environment setup and shared transaction helpers.
//!
//! One environment holds four databases:
//! - `proposals`: proposal id (u64 BE) -> bincode [`Proposal`]
//! - `votes`: vote id (u64 BE) -> bincode [`Vote`]
//! - `voter_index`: proposal id (u64 BE) ++ voter bytes -> vote id (u64 BE)
//! - `meta`: schema version and id counters
//!
//! The `voter_index` database is what enforces one vote per voter per
//! proposal: inserts go through `MDB_NOOVERWRITE`, so a duplicate key is
//! rejected by LMDB itself, inside the same write transaction that appends
//! the vote.

use std::ops::Bound;
use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions, RoTxn, RwTxn};
use tracing::debug;

use agora_store::Proposal;
use agora_types::{ProposalId, VoteId};

use crate::LmdbError;

/// Bump when the on-disk layout changes incompatibly.
const SCHEMA_VERSION: u32 = 1;
const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

pub(crate) const NEXT_PROPOSAL_ID_KEY: &[u8] = b"next_proposal_id";
pub(crate) const NEXT_VOTE_ID_KEY: &[u8] = b"next_vote_id";

/// 1 GiB of virtual address space; LMDB only commits what it uses.
const DEFAULT_MAP_SIZE: usize = 1024 * 1024 * 1024;
const MAX_DBS: u32 = 4;

/// LMDB-backed proposal and vote storage.
///
/// Cloning is cheap and yields another handle onto the same environment.
#[derive(Clone)]
pub struct LmdbStore {
    pub(crate) env: Arc<Env>,
    pub(crate) proposals_db: Database<Bytes, Bytes>,
    pub(crate) votes_db: Database<Bytes, Bytes>,
    pub(crate) voter_index_db: Database<Bytes, Bytes>,
    pub(crate) meta_db: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open or create the environment at `path` with the default map size.
    pub fn open(path: &Path) -> Result<Self, LmdbError> {
        Self::open_with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn open_with_map_size(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)?;
        // Safety: we never open the same path twice within one process.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)
        }
        .map_err(LmdbError::from)?;

        let mut wtxn = env.write_txn()?;
        let proposals_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("proposals"))?;
        let votes_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("votes"))?;
        let voter_index_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("voter_index"))?;
        let meta_db = env.create_database::<Bytes, Bytes>(&mut wtxn, Some("meta"))?;

        match meta_db.get(&wtxn, SCHEMA_VERSION_KEY)? {
            Some(bytes) if bytes.len() == 4 => {
                let arr: [u8; 4] = bytes.try_into().expect("checked length");
                let found = u32::from_le_bytes(arr);
                if found != SCHEMA_VERSION {
                    return Err(LmdbError::SchemaVersion {
                        found,
                        expected: SCHEMA_VERSION,
                    });
                }
            }
            Some(_) => {
                return Err(LmdbError::Serialization(
                    "schema_version has unexpected byte length".to_string(),
                ))
            }
            None => {
                meta_db.put(&mut wtxn, SCHEMA_VERSION_KEY, &SCHEMA_VERSION.to_le_bytes())?;
            }
        }
        wtxn.commit()?;

        debug!(path = %path.display(), map_size, "opened LMDB environment");
        Ok(Self {
            env: Arc::new(env),
            proposals_db,
            votes_db,
            voter_index_db,
            meta_db,
        })
    }

    /// Read and advance a meta counter. Counters start at 1.
    pub(crate) fn bump_counter(&self, wtxn: &mut RwTxn, key: &[u8]) -> Result<u64, LmdbError> {
        let current = match self.meta_db.get(wtxn, key)? {
            Some(bytes) if bytes.len() == 8 => {
                let arr: [u8; 8] = bytes.try_into().expect("checked length");
                u64::from_le_bytes(arr)
            }
            Some(_) => {
                return Err(LmdbError::Serialization(
                    "id counter has unexpected byte length".to_string(),
                ))
            }
            None => 1,
        };
        self.meta_db.put(wtxn, key, &(current + 1).to_le_bytes())?;
        Ok(current)
    }

    /// Decode the proposal record for `id`, if present.
    pub(crate) fn read_proposal(
        &self,
        rtxn: &RoTxn,
        id: ProposalId,
    ) -> Result<Option<Proposal>, LmdbError> {
        match self.proposals_db.get(rtxn, &proposal_key(id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(bytes)?)),
            None => Ok(None),
        }
    }

    /// All `voter_index` rows for one proposal: `(index key, vote id)`.
    pub(crate) fn vote_index_entries(
        &self,
        rtxn: &RoTxn,
        proposal: ProposalId,
    ) -> Result<Vec<(Vec<u8>, u64)>, LmdbError> {
        let prefix = proposal_key(proposal);
        let mut upper = prefix.to_vec();
        let bounds = if increment_prefix(&mut upper) {
            (Bound::Included(&prefix[..]), Bound::Excluded(&upper[..]))
        } else {
            (Bound::Included(&prefix[..]), Bound::Unbounded)
        };
        let mut entries = Vec::new();
        for result in self.voter_index_db.range(rtxn, &bounds)? {
            let (key, val) = result?;
            let arr: [u8; 8] = val.try_into().map_err(|_| {
                LmdbError::Serialization("invalid voter index value length".to_string())
            })?;
            entries.push((key.to_vec(), u64::from_be_bytes(arr)));
        }
        Ok(entries)
    }
}

/// Proposal ids are stored big-endian so iteration order is id order.
pub(crate) fn proposal_key(id: ProposalId) -> [u8; 8] {
    id.as_u64().to_be_bytes()
}

pub(crate) fn vote_key(id: VoteId) -> [u8; 8] {
    id.as_u64().to_be_bytes()
}

/// Build the binary composite key `proposal_id_be ++ voter_bytes`.
///
/// The fixed-width id prefix means prefix scans for a proposal never
/// collide with a neighbouring proposal's rows.
pub(crate) fn voter_index_key(proposal: ProposalId, voter: &str) -> Vec<u8> {
    let voter_bytes = voter.as_bytes();
    let mut key = Vec::with_capacity(8 + voter_bytes.len());
    key.extend_from_slice(&proposal_key(proposal));
    key.extend_from_slice(voter_bytes);
    key
}

/// Advance `prefix` to the smallest byte string greater than every key that
/// starts with it. Returns false when no upper bound exists (all 0xff).
pub(crate) fn increment_prefix(prefix: &mut Vec<u8>) -> bool {
    while let Some(last) = prefix.last_mut() {
        if *last == 0xff {
            prefix.pop();
        } else {
            *last += 1;
            return true;
        }
    }
    false
}
