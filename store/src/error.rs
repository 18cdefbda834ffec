use agora_types::ProposalStatus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("key not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),

    /// A conditional mutation found the proposal in a different status
    /// than the caller required. Carries what the store actually saw.
    #[error("proposal status is {actual}, required {required}")]
    StateMismatch {
        required: ProposalStatus,
        actual: ProposalStatus,
    },

    /// Transient backend pressure (full map, too many readers). Retryable.
    #[error("storage busy: {0}")]
    Busy(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("database is corrupted: {0}")]
    Corruption(String),
}
