use async_trait::async_trait;
use std::fmt;

use crate::auth::Session;

/// GuardDecision
///
/// Outcome of a guard check. Denial is not an error: it names where the
/// navigation continues instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    Redirect(String),
}

/// Guard
///
/// A predicate run before a protected subtree is activated. Guards run after
/// recognition and before any lazy module of the subtree is fetched.
#[async_trait]
pub trait Guard: Send + Sync + fmt::Debug {
    async fn can_activate(&self, session: &Session) -> GuardDecision;
}

/// SignedInGuard
///
/// Lets signed-in sessions through and sends everybody else to the sign-in flow.
#[derive(Debug, Clone)]
pub struct SignedInGuard {
    redirect_to: String,
}

impl SignedInGuard {
    pub fn new(redirect_to: impl Into<String>) -> Self {
        Self {
            redirect_to: redirect_to.into(),
        }
    }
}

impl Default for SignedInGuard {
    /// Redirects to the root path, where the sign-in module lives.
    fn default() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl Guard for SignedInGuard {
    async fn can_activate(&self, session: &Session) -> GuardDecision {
        if session.is_signed_in() {
            GuardDecision::Allow
        } else {
            tracing::debug!(redirect_to = %self.redirect_to, "anonymous session denied");
            GuardDecision::Redirect(self.redirect_to.clone())
        }
    }
}
