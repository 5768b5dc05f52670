//! Member entity, DTOs, legacy upgrade, and seed data.
//!
//! Members carry a denormalized `company_name` copied from the linked
//! [`Company`](crate::company::Company). The copy is written by the member
//! service whenever `company_id` changes; nothing here resolves it.
//!
//! The `password` field is a plaintext secret compared verbatim at login.
//! It is never hashed.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::company::SEED_COMPANY_ID;
use crate::entity::{
    double_option, merge, not_blank, Deletable, Entity, EntityKind, RecordStamp,
};
use crate::text_enum::define_text_enum;
use crate::types::{EntityId, Timestamp};

define_text_enum! {
    /// Position a member holds in the association.
    MemberRole {
        Member = "Member",
        Counselor = "Counselor",
        President = "President",
        Director = "Director",
        Trainee = "Trainee",
    }
}

define_text_enum! {
    /// Whether the member is currently active.
    MemberStatus {
        Active = "active",
        Inactive = "inactive",
    }
}

/// A member of the association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: EntityId,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<EntityId>,
    /// Copy of the linked company's name; empty when unlinked.
    #[serde(default)]
    pub company_name: String,
    pub role: MemberRole,
    #[validate(email)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Brazilian personal tax id (CPF). Also accepted as a login identifier.
    #[serde(rename = "cpf", default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "not_blank"))]
    pub password: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    pub status: MemberStatus,
    pub admission_year: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

/// DTO for creating a new member.
///
/// `company_id` and `company_name` are overwritten by the member service
/// from the resolved company choice.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateMember {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub company_id: Option<EntityId>,
    #[serde(default)]
    pub company_name: String,
    pub role: MemberRole,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(rename = "cpf", default)]
    pub tax_id: Option<String>,
    /// Required on create.
    #[validate(custom(function = "not_blank"))]
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
    pub status: MemberStatus,
    pub admission_year: i32,
    #[serde(default)]
    pub exit_year: Option<i32>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// DTO for updating a member. Absent fields are left unchanged.
///
/// Omitting `password` keeps the stored credential.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub company_id: Option<Option<EntityId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<MemberRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone: Option<Option<String>>,
    #[serde(
        rename = "cpf",
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MemberStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admission_year: Option<i32>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub exit_year: Option<Option<i32>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<Option<String>>,
}

impl Member {
    /// Whether `identifier` names this member (email or tax id, exact match).
    pub fn answers_to(&self, identifier: &str) -> bool {
        self.email == identifier || self.tax_id.as_deref() == Some(identifier)
    }

    /// Exact, case-sensitive comparison against the stored plaintext secret.
    pub fn secret_matches(&self, secret: &str) -> bool {
        self.password.as_deref() == Some(secret)
    }
}

impl Entity for Member {
    const KIND: EntityKind = EntityKind::Member;

    type Create = CreateMember;
    type Patch = UpdateMember;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_create(input: CreateMember, stamp: RecordStamp) -> Self {
        Self {
            id: stamp.id,
            name: input.name,
            company_id: input.company_id,
            company_name: input.company_name,
            role: input.role,
            email: input.email,
            phone: input.phone,
            tax_id: input.tax_id,
            password: Some(input.password),
            is_admin: input.is_admin,
            status: input.status,
            admission_year: input.admission_year,
            exit_year: input.exit_year,
            avatar_url: input.avatar_url,
        }
    }

    fn apply_patch(&self, patch: &UpdateMember, _now: Timestamp) -> Self {
        Self {
            id: self.id,
            name: merge(&self.name, &patch.name),
            company_id: merge(&self.company_id, &patch.company_id),
            company_name: merge(&self.company_name, &patch.company_name),
            role: merge(&self.role, &patch.role),
            email: merge(&self.email, &patch.email),
            phone: merge(&self.phone, &patch.phone),
            tax_id: merge(&self.tax_id, &patch.tax_id),
            password: patch.password.clone().or_else(|| self.password.clone()),
            is_admin: merge(&self.is_admin, &patch.is_admin),
            status: merge(&self.status, &patch.status),
            admission_year: merge(&self.admission_year, &patch.admission_year),
            exit_year: merge(&self.exit_year, &patch.exit_year),
            avatar_url: merge(&self.avatar_url, &patch.avatar_url),
        }
    }

    fn seed(_now: Timestamp) -> Vec<Self> {
        vec![Member {
            id: SEED_MEMBER_ID,
            name: "Gabrielle Elias".to_string(),
            company_id: Some(SEED_COMPANY_ID),
            company_name: "MakeWork".to_string(),
            role: MemberRole::President,
            email: "email@makework.tech".to_string(),
            phone: None,
            tax_id: Some("000.000.000-00".to_string()),
            password: Some("Teste@123".to_string()),
            is_admin: true,
            status: MemberStatus::Active,
            admission_year: 2024,
            exit_year: None,
            avatar_url: Some(
                "https://ui-avatars.com/api/?name=Gabrielle+Elias&background=purple&color=fff"
                    .to_string(),
            ),
        }]
    }

    /// Older records carried a boolean `active` flag instead of `status`.
    fn upgrade_legacy(record: &mut serde_json::Value) {
        let Some(obj) = record.as_object_mut() else {
            return;
        };
        if obj.get("status").is_some_and(|s| !s.is_null()) {
            return;
        }
        let active = obj
            .get("active")
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(false);
        let status = if active {
            MemberStatus::Active
        } else {
            MemberStatus::Inactive
        };
        obj.insert("status".into(), status.as_str().into());
        obj.remove("active");
    }
}

impl Deletable for Member {}

/// Identifier of the seeded administrator.
pub const SEED_MEMBER_ID: EntityId = uuid::Uuid::from_u128(0xa0);

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn seed_member() -> Member {
        Member::seed(Utc::now()).remove(0)
    }

    #[test]
    fn omitted_password_keeps_stored_secret() {
        let before = seed_member();
        let patch = UpdateMember {
            phone: Some(Some("+55 44 9999-0000".into())),
            ..Default::default()
        };
        let after = before.apply_patch(&patch, Utc::now());
        assert_eq!(after.password, before.password);
        assert_eq!(after.phone.as_deref(), Some("+55 44 9999-0000"));
    }

    #[test]
    fn answers_to_email_or_tax_id() {
        let m = seed_member();
        assert!(m.answers_to("email@makework.tech"));
        assert!(m.answers_to("000.000.000-00"));
        assert!(!m.answers_to("EMAIL@makework.tech"));
        assert!(!m.answers_to(""));
    }

    #[test]
    fn secret_comparison_is_exact() {
        let m = seed_member();
        assert!(m.secret_matches("Teste@123"));
        assert!(!m.secret_matches("teste@123"));
        assert!(!m.secret_matches("Teste@123 "));
    }

    #[test]
    fn legacy_active_flag_becomes_status() {
        let mut active = json!({"name": "A", "active": true});
        Member::upgrade_legacy(&mut active);
        assert_eq!(active["status"], "active");
        assert!(active.get("active").is_none());

        let mut missing = json!({"name": "B"});
        Member::upgrade_legacy(&mut missing);
        assert_eq!(missing["status"], "inactive");
    }

    #[test]
    fn legacy_upgrade_keeps_existing_status() {
        let mut record = json!({"status": "inactive", "active": true});
        Member::upgrade_legacy(&mut record);
        assert_eq!(record["status"], "inactive");
    }

    #[test]
    fn wire_format_uses_cpf_and_camel_case() {
        let value = serde_json::to_value(seed_member()).unwrap();
        assert_eq!(value["cpf"], "000.000.000-00");
        assert_eq!(value["isAdmin"], true);
        assert_eq!(value["role"], "President");
        assert_eq!(value["companyName"], "MakeWork");
    }

    #[test]
    fn invalid_email_fails_validation() {
        let mut m = seed_member();
        m.email = "not-an-email".into();
        assert!(m.validate_record().is_err());
    }
}
