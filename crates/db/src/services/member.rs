//! Member lifecycle: company denormalization, inline company creation, and
//! the credential/admin authorization gate.

use std::sync::Arc;

use chrono::Utc;
use copejem_core::audit::action_types;
use copejem_core::company::{Company, CreateCompany};
use copejem_core::entity::Entity;
use copejem_core::error::CoreError;
use copejem_core::member::{CreateMember, Member, UpdateMember};
use copejem_core::session::SessionContext;
use copejem_core::types::EntityId;
use copejem_events::{AuditEvent, EventBus};
use validator::Validate;

use crate::error::StoreResult;
use crate::repository::Repository;

/// How the member form picked the member's company.
#[derive(Debug, Clone, Default)]
pub enum CompanyChoice {
    /// No company.
    #[default]
    None,
    /// An existing company, by id.
    Existing(EntityId),
    /// Create this company first, then link to it.
    New(CreateCompany),
}

/// Resolved company link written onto the member.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CompanyLink {
    id: Option<EntityId>,
    name: String,
}

impl CompanyLink {
    fn none() -> Self {
        Self {
            id: None,
            name: String::new(),
        }
    }

    fn to(company: &Company) -> Self {
        Self {
            id: Some(company.id),
            name: company.name.clone(),
        }
    }
}

/// Business rules for members on top of the member and company repositories.
#[derive(Clone)]
pub struct MemberService {
    members: Repository<Member>,
    companies: Repository<Company>,
    events: Arc<EventBus>,
}

impl MemberService {
    pub fn new(
        members: Repository<Member>,
        companies: Repository<Company>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            members,
            companies,
            events,
        }
    }

    pub async fn get_all(&self) -> StoreResult<Vec<Member>> {
        self.members.get_all().await
    }

    pub async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<Member>> {
        self.members.get_by_id(id).await
    }

    /// Members linked to `company_id`, in collection order.
    pub async fn list_by_company(&self, company_id: EntityId) -> StoreResult<Vec<Member>> {
        Ok(self
            .members
            .get_all()
            .await?
            .into_iter()
            .filter(|m| m.company_id == Some(company_id))
            .collect())
    }

    /// Create a member, linking (or first creating) its company.
    ///
    /// With [`CompanyChoice::None`], a `company_id` already present on
    /// `input` is treated as [`CompanyChoice::Existing`].
    ///
    /// The company and member writes are independent: if the member write
    /// fails after a [`CompanyChoice::New`] company was created, that company
    /// stays behind without members.
    pub async fn create(
        &self,
        actor: &SessionContext,
        mut input: CreateMember,
        company: CompanyChoice,
    ) -> StoreResult<Member> {
        actor.ensure_can_edit_credential(None)?;
        if input.is_admin {
            actor.ensure_can_grant_admin()?;
        }
        input.validate().map_err(CoreError::from)?;

        let choice = match company {
            CompanyChoice::None => input
                .company_id
                .map_or(CompanyChoice::None, CompanyChoice::Existing),
            other => other,
        };
        let link = self.resolve_company(actor, choice).await?;
        input.company_id = link.id;
        input.company_name = link.name;

        let member = self.members.create(input, Some(actor.user_id)).await?;
        self.events.publish(
            AuditEvent::new(action_types::ENTITY_CREATE)
                .with_source(Member::KIND.label(), member.id)
                .with_actor(actor.user_id),
        );
        Ok(member)
    }

    /// Apply `patch` to a member.
    ///
    /// `company` overrides any `company_id` in the patch. Whenever the
    /// company link changes, `company_name` is rewritten from the company;
    /// a `company_name` sent on its own is ignored.
    pub async fn update(
        &self,
        actor: &SessionContext,
        id: EntityId,
        mut patch: UpdateMember,
        company: Option<CompanyChoice>,
    ) -> StoreResult<Member> {
        let current = self
            .members
            .get_by_id(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: Member::KIND.label(),
                id,
            })?;

        if patch.password.is_some() {
            actor.ensure_can_edit_credential(Some(id))?;
        }
        // Full-record forms resend the flag; only an actual change is gated.
        if patch.is_admin.is_some_and(|flag| flag != current.is_admin) {
            actor.ensure_can_grant_admin()?;
        }

        let choice = match (company, patch.company_id) {
            (Some(choice), _) => Some(choice),
            (None, Some(Some(company_id))) => Some(CompanyChoice::Existing(company_id)),
            (None, Some(None)) => Some(CompanyChoice::None),
            (None, None) => None,
        };

        // Check the merged record before an inline company is written, so a
        // rejected patch does not leave a new company behind.
        if let Some(CompanyChoice::New(_)) = &choice {
            current
                .apply_patch(&patch, Utc::now())
                .validate_record()?;
        }

        match choice {
            Some(choice) => {
                let link = self.resolve_company(actor, choice).await?;
                patch.company_id = Some(link.id);
                patch.company_name = Some(link.name);
            }
            None => patch.company_name = None,
        }

        let member = self.members.update(id, &patch).await?;
        self.events.publish(
            AuditEvent::new(action_types::ENTITY_UPDATE)
                .with_source(Member::KIND.label(), id)
                .with_actor(actor.user_id)
                .with_payload(serde_json::to_value(&patch)?),
        );
        Ok(member)
    }

    /// Members carry no historical protection and may be deleted at will.
    pub async fn delete(&self, actor: &SessionContext, id: EntityId) -> StoreResult<()> {
        self.members.delete(id).await?;
        self.events.publish(
            AuditEvent::new(action_types::ENTITY_DELETE)
                .with_source(Member::KIND.label(), id)
                .with_actor(actor.user_id),
        );
        Ok(())
    }

    async fn resolve_company(
        &self,
        actor: &SessionContext,
        choice: CompanyChoice,
    ) -> StoreResult<CompanyLink> {
        match choice {
            CompanyChoice::None => Ok(CompanyLink::none()),
            CompanyChoice::Existing(company_id) => {
                let company = self
                    .companies
                    .get_by_id(company_id)
                    .await?
                    .ok_or(CoreError::NotFound {
                        entity: Company::KIND.label(),
                        id: company_id,
                    })?;
                Ok(CompanyLink::to(&company))
            }
            CompanyChoice::New(input) => {
                let company = self.companies.create(input, Some(actor.user_id)).await?;
                tracing::info!(
                    company_id = %company.id,
                    name = %company.name,
                    "Company created inline from member form"
                );
                Ok(CompanyLink::to(&company))
            }
        }
    }
}
