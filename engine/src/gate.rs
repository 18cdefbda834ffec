//! Static-token admin gate.

use agora_types::AdminGate;

/// Compares the presented credential against one configured token.
///
/// With no token configured every admin request is denied; there is no
/// default credential.
pub struct StaticTokenGate {
    token: Option<String>,
}

impl StaticTokenGate {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }
}

impl AdminGate for StaticTokenGate {
    fn is_authorized(&self, credential: Option<&str>) -> bool {
        match (&self.token, credential) {
            (Some(expected), Some(given)) => expected == given,
            _ => false,
        }
    }
}
