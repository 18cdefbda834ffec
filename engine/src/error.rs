use agora_store::StoreError;
use agora_types::{ProposalId, ProposalStatus, VoteId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("vote {0} not found")]
    VoteNotFound(VoteId),

    #[error("'{voter}' has already voted on proposal {proposal}; revoke first to change the vote")]
    DuplicateVote { proposal: ProposalId, voter: String },

    /// The proposal exists but is no longer accepting ledger changes.
    #[error("proposal {proposal} is {status}, not active")]
    NotActive {
        proposal: ProposalId,
        status: ProposalStatus,
    },

    #[error("admin credential missing or not recognized")]
    Unauthorized,

    #[error("invalid request: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
