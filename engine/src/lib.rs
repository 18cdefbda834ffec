//! Core engines for the agora voting service.
//!
//! Three engines share one storage handle:
//! - [`ProposalLifecycle`] drives `active -> closed | expired`, expiring
//!   overdue proposals lazily on access.
//! - [`VoteLedger`] casts and revokes votes, one live vote per voter per
//!   proposal.
//! - [`TallyEngine`] recounts the ledger on every read.
//!
//! Engines validate and produce precise errors; the invariants themselves
//! (unique voter, status preconditions) are enforced by the store inside
//! its transactions, so they hold under concurrent access too.

pub mod error;
pub mod gate;
pub mod ledger;
pub mod lifecycle;
pub mod tally;

pub use error::EngineError;
pub use gate::StaticTokenGate;
pub use ledger::VoteLedger;
pub use lifecycle::{ProposalLifecycle, DEFAULT_OPEN_SECS, SECS_PER_DAY};
pub use tally::TallyEngine;
