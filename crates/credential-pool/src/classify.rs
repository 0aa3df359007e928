//! Upstream failure classification
//!
//! Only an invalid key (401) or an exhausted quota (429) is worth switching keys
//! for. Every other non-success status is assumed to be unrelated to the key and
//! ends the call with the fallback result.

/// What a failed upstream response means for the key that was used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// The key was rejected or is out of quota; cool it down and try the next one.
    CredentialRejected,
    /// Switching keys will not help.
    Unrecoverable,
}

/// Classify a non-success HTTP status.
pub fn classify_status(status: u16) -> FailureClass {
    match status {
        401 | 429 => FailureClass::CredentialRejected,
        _ => FailureClass::Unrecoverable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_status_401_rotates() {
        assert_eq!(classify_status(401), FailureClass::CredentialRejected);
    }

    #[test]
    fn classify_status_429_rotates() {
        assert_eq!(classify_status(429), FailureClass::CredentialRejected);
    }

    #[test]
    fn classify_status_403_does_not_rotate() {
        assert_eq!(classify_status(403), FailureClass::Unrecoverable);
    }

    #[test]
    fn classify_status_5xx_does_not_rotate() {
        for status in [500, 502, 503, 504] {
            assert_eq!(
                classify_status(status),
                FailureClass::Unrecoverable,
                "status {status}"
            );
        }
    }

    #[test]
    fn classify_status_unknown_is_unrecoverable() {
        assert_eq!(classify_status(418), FailureClass::Unrecoverable);
    }
}
