//! Credential authentication and session establishment.
//!
//! Credentials are compared as plaintext, exactly and case-sensitively.
//! There is no hashing, lockout, or rate limiting. A failed login is
//! `Ok(None)`, never an error.

use std::sync::Arc;

use copejem_core::audit::action_types;
use copejem_core::member::Member;
use copejem_core::session::{Session, SessionContext};
use copejem_events::{AuditEvent, EventBus};

use crate::error::StoreResult;
use crate::store::CredentialStore;

#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    events: Arc<EventBus>,
}

impl AuthService {
    pub fn new(credentials: Arc<dyn CredentialStore>, events: Arc<EventBus>) -> Self {
        Self {
            credentials,
            events,
        }
    }

    /// First member whose email or tax id equals `identifier` and whose
    /// stored secret equals `secret`.
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> StoreResult<Option<Member>> {
        self.credentials
            .find_by_credentials(identifier, secret)
            .await
    }

    /// Authenticate and, on success, start `session` for the member.
    ///
    /// Returns the new context, or `None` when the credentials do not match
    /// (the session is left as it was).
    pub async fn login(
        &self,
        session: &mut Session,
        identifier: &str,
        secret: &str,
    ) -> StoreResult<Option<SessionContext>> {
        let Some(member) = self.authenticate(identifier, secret).await? else {
            tracing::info!("Login rejected: no matching credentials");
            return Ok(None);
        };

        let context = SessionContext::for_member(&member);
        session.login(context.clone());
        tracing::info!(member_id = %member.id, is_admin = member.is_admin, "Member logged in");
        self.events.publish(
            AuditEvent::new(action_types::LOGIN)
                .with_source("Member", member.id)
                .with_actor(member.id),
        );
        Ok(Some(context))
    }

    pub fn logout(&self, session: &mut Session) {
        if let Some(context) = session.current() {
            tracing::info!(member_id = %context.user_id, "Member logged out");
            self.events
                .publish(AuditEvent::new(action_types::LOGOUT).with_actor(context.user_id));
        }
        session.logout();
    }
}
