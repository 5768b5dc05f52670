//! Session context and the self-or-admin authorization gate.
//!
//! A [`SessionContext`] is built from the authenticated member at login and
//! passed explicitly to every operation that needs an authorization
//! decision. [`Session`] is the marker the presentation layer keeps between
//! login and logout.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::member::{Member, MemberRole};
use crate::types::EntityId;

/// Copy of the authenticated member, without the credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub user_id: EntityId,
    pub name: String,
    pub email: String,
    pub role: MemberRole,
    pub is_admin: bool,
    #[serde(default)]
    pub company_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl SessionContext {
    pub fn for_member(member: &Member) -> Self {
        Self {
            user_id: member.id,
            name: member.name.clone(),
            email: member.email.clone(),
            role: member.role,
            is_admin: member.is_admin,
            company_name: member.company_name.clone(),
            avatar_url: member.avatar_url.clone(),
        }
    }

    /// The credential of `target` may be edited when the record is new,
    /// the actor is an admin, or the actor is editing themself.
    pub fn can_edit_credential(&self, target: Option<EntityId>) -> bool {
        match target {
            None => true,
            Some(id) => self.is_admin || self.user_id == id,
        }
    }

    /// Only admins may grant or revoke the admin flag.
    pub fn can_grant_admin(&self) -> bool {
        self.is_admin
    }

    pub fn ensure_can_edit_credential(&self, target: Option<EntityId>) -> Result<(), CoreError> {
        if self.can_edit_credential(target) {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Only an admin or the member themself may change this credential".into(),
            ))
        }
    }

    pub fn ensure_can_grant_admin(&self) -> Result<(), CoreError> {
        if self.can_grant_admin() {
            Ok(())
        } else {
            Err(CoreError::Forbidden(
                "Admin role required to change admin privileges".into(),
            ))
        }
    }
}

/// Which gated member fields a form may expose to the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPermissions {
    pub credential: bool,
    pub admin_flag: bool,
}

impl FieldPermissions {
    /// `target` is the id of the record being edited, `None` for a new one.
    pub fn for_target(actor: &SessionContext, target: Option<EntityId>) -> Self {
        Self {
            credential: actor.can_edit_credential(target),
            admin_flag: actor.can_grant_admin(),
        }
    }
}

/// Authenticated-flag plus the current user, held from login to logout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    authenticated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<SessionContext>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn login(&mut self, context: SessionContext) {
        self.authenticated = true;
        self.user = Some(context);
    }

    pub fn logout(&mut self) {
        self.authenticated = false;
        self.user = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.user.is_some()
    }

    pub fn current(&self) -> Option<&SessionContext> {
        self.user.as_ref().filter(|_| self.authenticated)
    }

    /// The current context, or `Forbidden` when nobody is logged in.
    pub fn require(&self) -> Result<&SessionContext, CoreError> {
        self.current()
            .ok_or_else(|| CoreError::Forbidden("Login required".into()))
    }
}
