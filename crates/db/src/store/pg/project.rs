//! `projects` table. Nested structures are stored as `JSONB`.

use async_trait::async_trait;
use copejem_core::project::{
    Project, ProjectFile, ProjectPartner, ProjectResults, ProjectSponsor, ProjectTask,
    TargetAudience,
};
use copejem_core::types::{Date, EntityId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

use super::PgStore;
use crate::error::{StoreError, StoreResult};
use crate::store::EntityStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, year, name, coordinator_id, coordinator_name, event_date, \
                       planning_start_date, planning_end_date, team_members, description, \
                       target_audience, target_audience_other, status, type, partners, \
                       results, schedule, sponsors, budget_planned, budget_reached, images, \
                       files, institutional_observations, lessons_learned, created_by, \
                       created_at, updated_at";

#[derive(Debug, FromRow)]
struct ProjectRow {
    id: EntityId,
    year: i32,
    name: String,
    coordinator_id: EntityId,
    coordinator_name: String,
    event_date: Date,
    planning_start_date: Date,
    planning_end_date: Date,
    team_members: Json<Vec<String>>,
    description: String,
    target_audience: Json<Vec<TargetAudience>>,
    target_audience_other: Option<String>,
    status: String,
    #[sqlx(rename = "type")]
    project_type: String,
    partners: Json<Vec<ProjectPartner>>,
    results: Option<Json<ProjectResults>>,
    schedule: Option<Json<Vec<ProjectTask>>>,
    sponsors: Option<Json<Vec<ProjectSponsor>>>,
    budget_planned: Option<f64>,
    budget_reached: Option<f64>,
    images: Option<Json<Vec<String>>>,
    files: Option<Json<Vec<ProjectFile>>>,
    institutional_observations: Option<String>,
    lessons_learned: Option<String>,
    created_by: Option<EntityId>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TryFrom<ProjectRow> for Project {
    type Error = StoreError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            year: row.year,
            name: row.name,
            coordinator_id: row.coordinator_id,
            coordinator_name: row.coordinator_name,
            event_date: row.event_date,
            planning_start_date: row.planning_start_date,
            planning_end_date: row.planning_end_date,
            team_members: row.team_members.0,
            description: row.description,
            target_audience: row.target_audience.0,
            target_audience_other: row.target_audience_other,
            status: row.status.parse()?,
            project_type: row.project_type.parse()?,
            partners: row.partners.0,
            results: row.results.map(|j| j.0),
            schedule: row.schedule.map(|j| j.0),
            sponsors: row.sponsors.map(|j| j.0),
            budget_planned: row.budget_planned,
            budget_reached: row.budget_reached,
            images: row.images.map(|j| j.0),
            files: row.files.map(|j| j.0),
            institutional_observations: row.institutional_observations,
            lessons_learned: row.lessons_learned,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl EntityStore<Project> for PgStore {
    /// Most recently created first.
    async fn list(&self) -> StoreResult<Vec<Project>> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ProjectRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Project::try_from).collect()
    }

    async fn find_by_id(&self, id: EntityId) -> StoreResult<Option<Project>> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1");
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Project::try_from).transpose()
    }

    async fn insert(&self, record: Project) -> StoreResult<Project> {
        let query = format!(
            "INSERT INTO projects (id, year, name, coordinator_id, coordinator_name, event_date,
                                   planning_start_date, planning_end_date, team_members,
                                   description, target_audience, target_audience_other, status,
                                   type, partners, results, schedule, sponsors, budget_planned,
                                   budget_reached, images, files, institutional_observations,
                                   lessons_learned, created_by, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                     $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(record.id)
            .bind(record.year)
            .bind(&record.name)
            .bind(record.coordinator_id)
            .bind(&record.coordinator_name)
            .bind(record.event_date)
            .bind(record.planning_start_date)
            .bind(record.planning_end_date)
            .bind(Json(&record.team_members))
            .bind(&record.description)
            .bind(Json(&record.target_audience))
            .bind(&record.target_audience_other)
            .bind(record.status.as_str())
            .bind(record.project_type.as_str())
            .bind(Json(&record.partners))
            .bind(record.results.as_ref().map(Json))
            .bind(record.schedule.as_ref().map(Json))
            .bind(record.sponsors.as_ref().map(Json))
            .bind(record.budget_planned)
            .bind(record.budget_reached)
            .bind(record.images.as_ref().map(Json))
            .bind(record.files.as_ref().map(Json))
            .bind(&record.institutional_observations)
            .bind(&record.lessons_learned)
            .bind(record.created_by)
            .bind(record.created_at)
            .bind(record.updated_at)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    /// `created_by` and `created_at` are never rewritten.
    async fn replace(&self, record: Project) -> StoreResult<Option<Project>> {
        let query = format!(
            "UPDATE projects SET
                year = $2,
                name = $3,
                coordinator_id = $4,
                coordinator_name = $5,
                event_date = $6,
                planning_start_date = $7,
                planning_end_date = $8,
                team_members = $9,
                description = $10,
                target_audience = $11,
                target_audience_other = $12,
                status = $13,
                type = $14,
                partners = $15,
                results = $16,
                schedule = $17,
                sponsors = $18,
                budget_planned = $19,
                budget_reached = $20,
                images = $21,
                files = $22,
                institutional_observations = $23,
                lessons_learned = $24,
                updated_at = $25
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, ProjectRow>(&query)
            .bind(record.id)
            .bind(record.year)
            .bind(&record.name)
            .bind(record.coordinator_id)
            .bind(&record.coordinator_name)
            .bind(record.event_date)
            .bind(record.planning_start_date)
            .bind(record.planning_end_date)
            .bind(Json(&record.team_members))
            .bind(&record.description)
            .bind(Json(&record.target_audience))
            .bind(&record.target_audience_other)
            .bind(record.status.as_str())
            .bind(record.project_type.as_str())
            .bind(Json(&record.partners))
            .bind(record.results.as_ref().map(Json))
            .bind(record.schedule.as_ref().map(Json))
            .bind(record.sponsors.as_ref().map(Json))
            .bind(record.budget_planned)
            .bind(record.budget_reached)
            .bind(record.images.as_ref().map(Json))
            .bind(record.files.as_ref().map(Json))
            .bind(&record.institutional_observations)
            .bind(&record.lessons_learned)
            .bind(record.updated_at)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Project::try_from).transpose()
    }

    async fn delete(&self, id: EntityId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
