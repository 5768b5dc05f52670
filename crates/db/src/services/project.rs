//! Project lifecycle: coordinator denormalization and the institutional
//! record rules.
//!
//! Deleting a past-year project is refused by the repository's deletion
//! guard. Updating one is allowed, but every such update is announced on
//! the event bus and logged as a warning for later review.

use std::sync::Arc;

use copejem_core::audit::action_types;
use copejem_core::entity::Entity;
use copejem_core::error::CoreError;
use copejem_core::history;
use copejem_core::member::Member;
use copejem_core::project::{CreateProject, Project, UpdateProject};
use copejem_core::session::SessionContext;
use copejem_core::types::EntityId;
use copejem_events::{AuditEvent, EventBus};

use crate::error::{StoreError, StoreResult};
use crate::repository::Repository;

#[derive(Clone)]
pub struct ProjectService {
    projects: Repository<Project>,
    members: Repository<Member>,
    events: Arc<EventBus>,
}

impl ProjectService {
    pub fn new(
        projects: Repository<Project>,
        members: Repository<Member>,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            projects,
            members,
            events,
        }
    }

    pub async fn get_all(&self) -> StoreResult<Vec<Project>> {
        self.projects.get_all().await
    }

    pub async fn get_by_id(&self, id: EntityId) -> StoreResult<Option<Project>> {
        self.projects.get_by_id(id).await
    }

    pub async fn list_by_year(&self, year: i32) -> StoreResult<Vec<Project>> {
        Ok(self
            .projects
            .get_all()
            .await?
            .into_iter()
            .filter(|p| p.year == year)
            .collect())
    }

    /// Whether `project` is protected from deletion right now.
    pub fn is_locked(project: &Project) -> bool {
        project.is_historical(history::current_year())
    }

    /// Create a project owned by `actor`, copying the coordinator's name.
    pub async fn create(
        &self,
        actor: &SessionContext,
        mut input: CreateProject,
    ) -> StoreResult<Project> {
        input.coordinator_name = self.coordinator_name(input.coordinator_id).await?;

        let project = self.projects.create(input, Some(actor.user_id)).await?;
        self.events.publish(
            AuditEvent::new(action_types::ENTITY_CREATE)
                .with_source(Project::KIND.label(), project.id)
                .with_actor(actor.user_id),
        );
        Ok(project)
    }

    /// Apply `patch`, re-syncing `coordinator_name` when the coordinator changes.
    ///
    /// Past-year projects are updated too; the change is audited, not blocked.
    pub async fn update(
        &self,
        actor: &SessionContext,
        id: EntityId,
        mut patch: UpdateProject,
    ) -> StoreResult<Project> {
        let current = self
            .projects
            .get_by_id(id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: Project::KIND.label(),
                id,
            })?;

        patch.coordinator_name = match patch.coordinator_id {
            Some(coordinator_id) => Some(self.coordinator_name(coordinator_id).await?),
            None => None,
        };

        let payload = serde_json::to_value(&patch)?;
        let historical = current.is_historical(history::current_year());
        if historical {
            tracing::warn!(
                project_id = %id,
                year = current.year,
                actor_id = %actor.user_id,
                patch = %payload,
                "Editing past year project, logging this action for audit"
            );
        }

        let project = self.projects.update(id, &patch).await?;

        let action = if historical {
            action_types::HISTORICAL_UPDATE
        } else {
            action_types::ENTITY_UPDATE
        };
        self.events.publish(
            AuditEvent::new(action)
                .with_source(Project::KIND.label(), id)
                .with_actor(actor.user_id)
                .with_payload(payload),
        );
        Ok(project)
    }

    /// Delete a project. Past-year projects fail with `ImmutableRecord` and
    /// the collection is left unchanged.
    pub async fn delete(&self, actor: &SessionContext, id: EntityId) -> StoreResult<()> {
        match self.projects.delete(id).await {
            Ok(()) => {
                self.events.publish(
                    AuditEvent::new(action_types::ENTITY_DELETE)
                        .with_source(Project::KIND.label(), id)
                        .with_actor(actor.user_id),
                );
                Ok(())
            }
            Err(StoreError::Core(CoreError::ImmutableRecord { entity, id, year })) => {
                tracing::warn!(
                    project_id = %id,
                    year,
                    actor_id = %actor.user_id,
                    "Refused to delete project from a previous year"
                );
                self.events.publish(
                    AuditEvent::new(action_types::HISTORICAL_DELETE_REJECTED)
                        .with_source(entity, id)
                        .with_actor(actor.user_id)
                        .with_payload(serde_json::json!({ "year": year })),
                );
                Err(CoreError::ImmutableRecord { entity, id, year }.into())
            }
            Err(other) => Err(other),
        }
    }

    async fn coordinator_name(&self, coordinator_id: EntityId) -> StoreResult<String> {
        let coordinator = self
            .members
            .get_by_id(coordinator_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: Member::KIND.label(),
                id: coordinator_id,
            })?;
        Ok(coordinator.name)
    }
}
