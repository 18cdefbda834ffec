//! Authorization seam for administrative operations.

/// Decides whether a presented credential may perform admin actions
/// (currently just closing proposals early).
///
/// The service binds this to a static token check; tests inject a
/// fixed-verdict gate.
pub trait AdminGate: Send + Sync {
    /// `credential` is the raw header value, if the caller sent one.
    fn is_authorized(&self, credential: Option<&str>) -> bool;
}
