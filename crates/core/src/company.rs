//! Company entity, DTOs, and seed data.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entity::{double_option, merge, not_blank, Entity, EntityKind, RecordStamp};
use crate::types::{EntityId, Timestamp};

/// A company that members may be linked to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: EntityId,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    /// Brazilian company registry number (CNPJ).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for creating a new company.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompany {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub tax_id: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
}

impl CreateCompany {
    /// Shorthand for the inline form, which only asks for a name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// DTO for updating a company. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompany {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub tax_id: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub industry: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub website: Option<Option<String>>,
}

impl Entity for Company {
    const KIND: EntityKind = EntityKind::Company;

    type Create = CreateCompany;
    type Patch = UpdateCompany;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_create(input: CreateCompany, stamp: RecordStamp) -> Self {
        Self {
            id: stamp.id,
            name: input.name,
            tax_id: input.tax_id,
            industry: input.industry,
            website: input.website,
            created_at: stamp.at,
        }
    }

    fn apply_patch(&self, patch: &UpdateCompany, _now: Timestamp) -> Self {
        Self {
            id: self.id,
            name: merge(&self.name, &patch.name),
            tax_id: merge(&self.tax_id, &patch.tax_id),
            industry: merge(&self.industry, &patch.industry),
            website: merge(&self.website, &patch.website),
            created_at: self.created_at,
        }
    }

    fn seed(now: Timestamp) -> Vec<Self> {
        vec![Company {
            id: SEED_COMPANY_ID,
            name: "MakeWork".to_string(),
            tax_id: None,
            industry: Some("Tecnologia".to_string()),
            website: None,
            created_at: now,
        }]
    }
}

/// Identifier of the seeded "MakeWork" company.
pub const SEED_COMPANY_ID: EntityId = uuid::Uuid::from_u128(0xc0);

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn company() -> Company {
        Company::from_create(
            CreateCompany {
                name: "Acme".into(),
                tax_id: Some("12.345.678/0001-90".into()),
                industry: Some("Retail".into()),
                website: None,
            },
            RecordStamp {
                id: crate::types::new_id(),
                at: Utc::now(),
                by: None,
            },
        )
    }

    #[test]
    fn patch_replaces_only_given_fields() {
        let before = company();
        let patch = UpdateCompany {
            industry: Some(Some("Logistics".into())),
            ..Default::default()
        };
        let after = before.apply_patch(&patch, Utc::now());
        assert_eq!(after.industry.as_deref(), Some("Logistics"));
        assert_eq!(after.name, before.name);
        assert_eq!(after.tax_id, before.tax_id);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn explicit_null_clears_optional_field() {
        let before = company();
        let patch: UpdateCompany = serde_json::from_str(r#"{"taxId": null}"#).unwrap();
        assert_eq!(patch.tax_id, Some(None));
        let after = before.apply_patch(&patch, Utc::now());
        assert!(after.tax_id.is_none());
        assert_eq!(after.industry, before.industry);
    }

    #[test]
    fn blank_name_fails_validation() {
        let input = CreateCompany::named("  ");
        assert!(input.validate().is_err());
    }

    #[test]
    fn seed_contains_makework() {
        let seed = Company::seed(Utc::now());
        assert_eq!(seed.len(), 1);
        assert_eq!(seed[0].name, "MakeWork");
        assert_eq!(seed[0].id, SEED_COMPANY_ID);
    }
}
