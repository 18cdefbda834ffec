//! Nullable admin gate — fixed authorization verdict for testing.

use agora_types::AdminGate;

/// An admin gate that always returns the configured verdict,
/// ignoring the credential.
pub struct NullGate {
    verdict: bool,
}

impl NullGate {
    pub fn allow() -> Self {
        Self { verdict: true }
    }

    pub fn deny() -> Self {
        Self { verdict: false }
    }
}

impl AdminGate for NullGate {
    fn is_authorized(&self, _credential: Option<&str>) -> bool {
        self.verdict
    }
}
