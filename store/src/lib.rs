//! Abstract storage traits for the agora voting service.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the codebase depends only on the traits.

pub mod error;
pub mod proposal;
pub mod vote;

pub use error::StoreError;
pub use proposal::{NewProposal, Proposal, ProposalStore};
pub use vote::{NewVote, Vote, VoteStore};

/// The full persistence surface the engines require.
///
/// Blanket-implemented for anything that stores both proposals and votes.
pub trait LedgerStore: ProposalStore + VoteStore {}

impl<T: ProposalStore + VoteStore> LedgerStore for T {}
