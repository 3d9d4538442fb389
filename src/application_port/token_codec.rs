use crate::domain_model::Claims;

/// Extracts claims from a bearer token.
///
/// Implementations must not verify signatures: authenticity is the
/// identity provider's and the transport's concern. Verification, if ever
/// wanted, belongs in a separate injected capability holding provider keys.
pub trait TokenCodec: Send + Sync {
    /// Malformed input yields `None`, never an error.
    fn decode(&self, token: &str) -> Option<Claims>;
}
