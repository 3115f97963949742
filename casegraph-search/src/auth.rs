//! Authorization collaborator and context capture
//!
//! The pipeline consumes two facts about the caller: whether the principal
//! is privileged and its user identifier. Both are captured into an
//! immutable [`AuthSnapshot`] before any work is spawned; workers receive
//! the snapshot as an explicit value, never through ambient task-local
//! state (request-scoped authorization is not inherited by spawned tasks).

use std::sync::Arc;

/// Boolean privilege check plus current-user accessor, consumed here,
/// never computed here
pub trait Authorizer: Send + Sync {
    /// Whether the current principal bypasses permission filtering
    fn is_privileged(&self) -> bool;

    /// Identifier of the current principal
    fn user_id(&self) -> &str;
}

/// Immutable capture of the authorization context
#[derive(Debug, Clone)]
pub struct AuthSnapshot {
    pub privileged: bool,
    pub user_id: Arc<str>,
}

impl AuthSnapshot {
    /// Capture the collaborator's answers at request start
    pub fn capture(auth: &dyn Authorizer) -> Self {
        Self {
            privileged: auth.is_privileged(),
            user_id: Arc::from(auth.user_id()),
        }
    }
}

/// Fixed-answer authorizer for embedding and tests
#[derive(Debug, Clone)]
pub struct StaticAuthorizer {
    user_id: String,
    privileged: bool,
}

impl StaticAuthorizer {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            privileged: false,
        }
    }

    pub fn privileged(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            privileged: true,
        }
    }
}

impl Authorizer for StaticAuthorizer {
    fn is_privileged(&self) -> bool {
        self.privileged
    }

    fn user_id(&self) -> &str {
        &self.user_id
    }
}
