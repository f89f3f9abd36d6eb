//! Anonymous session identifier.
//!
//! One random id per process lifetime, created lazily on the first
//! anonymous send and never persisted. A fresh visit always gets a fresh id.

use std::sync::OnceLock;

use charla_types::chat::SessionId;
use tracing::debug;
use uuid::Uuid;

/// Lazily-created, process-scoped anonymous conversation id.
#[derive(Default)]
pub struct AnonymousSession {
    id: OnceLock<SessionId>,
}

impl AnonymousSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// The session id, generating it on first call.
    ///
    /// Stable for the remainder of the process lifetime. UUID v7 carries 74
    /// random bits, comfortably past the collision bar.
    pub fn ensure_id(&self) -> SessionId {
        self.id
            .get_or_init(|| {
                let id = SessionId(Uuid::now_v7().to_string());
                debug!(session_id = %id, "Generated anonymous session id");
                id
            })
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_is_non_empty_and_stable() {
        let session = AnonymousSession::new();
        let first = session.ensure_id();
        assert!(!first.as_str().is_empty());
        assert_eq!(session.ensure_id(), first);
        assert_eq!(session.ensure_id(), first);
    }

    #[test]
    fn test_fresh_sessions_get_fresh_ids() {
        let a = AnonymousSession::new().ensure_id();
        let b = AnonymousSession::new().ensure_id();
        assert_ne!(a, b);
    }
}
