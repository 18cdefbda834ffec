//! Tally engine — always recounted from the ledger, never cached.

use agora_store::LedgerStore;
use agora_types::{ProposalId, Tally, Timestamp};

use crate::error::EngineError;
use crate::lifecycle::ProposalLifecycle;

#[derive(Clone)]
pub struct TallyEngine<S> {
    lifecycle: ProposalLifecycle<S>,
}

impl<S: LedgerStore> TallyEngine<S> {
    pub fn new(lifecycle: ProposalLifecycle<S>) -> Self {
        Self { lifecycle }
    }

    /// Count the proposal's votes by choice. Counts come straight from the
    /// stored ledger on every call; a revocation is reflected immediately.
    /// Resolving first flushes an overdue proposal to `expired` before its
    /// votes are counted. A proposal that does not exist has no votes, so
    /// it tallies zero rather than failing.
    pub fn tally(&self, proposal: ProposalId, now: Timestamp) -> Result<Tally, EngineError> {
        match self.lifecycle.resolve(proposal, now) {
            Ok(_) => {}
            Err(EngineError::ProposalNotFound(_)) => return Ok(Tally::ZERO),
            Err(e) => return Err(e),
        }
        Ok(self.lifecycle.store().tally_votes(proposal)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::StaticTokenGate;
    use crate::ledger::VoteLedger;
    use crate::lifecycle::DEFAULT_OPEN_SECS;
    use agora_nullables::{NullClock, NullStore};
    use agora_types::{Choice, Clock};
    use std::sync::Arc;

    const TOKEN: &str = "secret-admin-token";

    struct Fixture {
        lifecycle: ProposalLifecycle<NullStore>,
        ledger: VoteLedger<NullStore>,
        tally: TallyEngine<NullStore>,
        clock: NullClock,
    }

    fn fixture() -> Fixture {
        let store = NullStore::new();
        let gate = Arc::new(StaticTokenGate::new(Some(TOKEN.to_string())));
        let lifecycle = ProposalLifecycle::new(store, gate, DEFAULT_OPEN_SECS);
        Fixture {
            ledger: VoteLedger::new(lifecycle.clone()),
            tally: TallyEngine::new(lifecycle.clone()),
            lifecycle,
            clock: NullClock::new(1_000),
        }
    }

    #[test]
    fn test_fresh_proposal_tallies_zero() {
        let fx = fixture();
        let proposal = fx
            .lifecycle
            .create("t", "d", Some(100), fx.clock.now())
            .unwrap();
        assert_eq!(
            fx.tally.tally(proposal.id, fx.clock.now()).unwrap(),
            Tally::ZERO
        );
    }

    #[test]
    fn test_tally_tracks_casts_and_revocations() {
        let fx = fixture();
        let proposal = fx
            .lifecycle
            .create("t", "d", Some(100), fx.clock.now())
            .unwrap();
        fx.ledger
            .cast(proposal.id, "alice", Choice::Yes, fx.clock.now())
            .unwrap();
        let bob = fx
            .ledger
            .cast(proposal.id, "bob", Choice::No, fx.clock.now())
            .unwrap();
        fx.ledger
            .cast(proposal.id, "carol", Choice::Abstain, fx.clock.now())
            .unwrap();
        assert_eq!(
            fx.tally.tally(proposal.id, fx.clock.now()).unwrap(),
            Tally { yes: 1, no: 1, abstain: 1 }
        );

        // Revoking surfaces in the very next tally.
        fx.ledger.revoke(bob.id, fx.clock.now()).unwrap();
        assert_eq!(
            fx.tally.tally(proposal.id, fx.clock.now()).unwrap(),
            Tally { yes: 1, no: 0, abstain: 1 }
        );
    }

    #[test]
    fn test_tally_survives_expiry_unchanged() {
        let fx = fixture();
        let proposal = fx
            .lifecycle
            .create("t", "d", Some(100), fx.clock.now())
            .unwrap();
        fx.ledger
            .cast(proposal.id, "alice", Choice::Yes, fx.clock.now())
            .unwrap();
        fx.clock.advance(1_000);
        assert_eq!(
            fx.tally.tally(proposal.id, fx.clock.now()).unwrap(),
            Tally { yes: 1, no: 0, abstain: 0 }
        );
        // The access flushed the status.
        let resolved = fx.lifecycle.resolve(proposal.id, fx.clock.now()).unwrap();
        assert!(resolved.status.is_terminal());
    }

    #[test]
    fn test_tally_of_unknown_proposal_is_zero() {
        let fx = fixture();
        assert_eq!(
            fx.tally.tally(ProposalId::new(5), fx.clock.now()).unwrap(),
            Tally::ZERO
        );
    }
}
