//! Fundamental types for the agora voting service.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: identifiers, timestamps, vote choices, tallies, proposal
//! lifecycle states, and the clock and admin-authorization seams.

pub mod choice;
pub mod gate;
pub mod id;
pub mod state;
pub mod tally;
pub mod time;

pub use choice::{Choice, ParseChoiceError};
pub use gate::AdminGate;
pub use id::{ProposalId, VoteId};
pub use state::ProposalStatus;
pub use tally::Tally;
pub use time::{Clock, SystemClock, Timestamp};
