//! Project entity, nested value types, DTOs, and seed data.
//!
//! Projects are the association's institutional record. The deletion guard
//! on [`Project`] refuses to delete anything dated before the current
//! calendar year (see [`crate::history`]).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::entity::{
    double_option, merge, not_blank, Deletable, Entity, EntityKind, RecordStamp,
};
use crate::error::CoreError;
use crate::history;
use crate::member::SEED_MEMBER_ID;
use crate::text_enum::define_text_enum;
use crate::types::{Date, EntityId, Timestamp};

define_text_enum! {
    /// Project lifecycle status.
    ProjectStatus {
        Planned = "PLANNED",
        Executing = "EXECUTING",
        Completed = "COMPLETED",
        Cancelled = "CANCELLED",
    }
}

define_text_enum! {
    /// Kind of initiative.
    ProjectType {
        Event = "EVENT",
        Training = "TRAINING",
        InstitutionalAction = "INSTITUTIONAL_ACTION",
        SocialProject = "SOCIAL_PROJECT",
        ExternalPartnership = "EXTERNAL_PARTNERSHIP",
    }
}

define_text_enum! {
    /// Audience tag.
    TargetAudience {
        YoungEntrepreneurs = "YOUNG_ENTREPRENEURS",
        AcimMembers = "ACIM_MEMBERS",
        ExternalPublic = "EXTERNAL_PUBLIC",
        CopejemMembers = "COPEJEM_MEMBERS",
        Other = "OTHER",
    }
}

define_text_enum! {
    /// Relationship of a partner to the project.
    PartnerType {
        Acim = "ACIM",
        Sponsor = "SPONSOR",
        PartnerInstitution = "PARTNER_INSTITUTION",
        SupportingCompany = "SUPPORTING_COMPANY",
    }
}

define_text_enum! {
    /// Progress of a scheduled task.
    TaskStatus {
        Pending = "PENDING",
        InProgress = "IN_PROGRESS",
        Completed = "COMPLETED",
        Cancelled = "CANCELLED",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPartner {
    pub name: String,
    #[serde(rename = "type")]
    pub partner_type: PartnerType,
}

/// Outcome figures, filled in once a project has run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResults {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_reach: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact_reached: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub satisfaction_feedback: Option<String>,
}

/// One entry of the project schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTask {
    pub id: EntityId,
    pub title: String,
    /// Name of a team member, by value.
    pub responsible: String,
    pub start_date: Date,
    pub end_date: Date,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSponsor {
    pub id: EntityId,
    pub name: String,
    pub contact: String,
    /// Pledged amount.
    pub value: f64,
    pub observation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub name: String,
    pub url: String,
}

/// A project row in the institutional record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub year: i32,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub coordinator_id: EntityId,
    /// Copy of the coordinator's name, written when `coordinator_id` changes.
    pub coordinator_name: String,
    pub event_date: Date,
    pub planning_start_date: Date,
    pub planning_end_date: Date,
    /// Team member names, by value.
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_audience: Vec<TargetAudience>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience_other: Option<String>,
    pub status: ProjectStatus,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(default)]
    pub partners: Vec<ProjectPartner>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<ProjectResults>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Vec<ProjectTask>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sponsors: Option<Vec<ProjectSponsor>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_planned: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_reached: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<ProjectFile>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institutional_observations: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lessons_learned: Option<String>,
    /// Member who created the project; `None` for seeded records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<EntityId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
///
/// `coordinator_name` is overwritten by the project service from the
/// coordinator member.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub year: i32,
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    pub coordinator_id: EntityId,
    #[serde(default)]
    pub coordinator_name: String,
    pub event_date: Date,
    pub planning_start_date: Date,
    pub planning_end_date: Date,
    #[serde(default)]
    pub team_members: Vec<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_audience: Vec<TargetAudience>,
    #[serde(default)]
    pub target_audience_other: Option<String>,
    pub status: ProjectStatus,
    #[serde(rename = "type")]
    pub project_type: ProjectType,
    #[serde(default)]
    pub partners: Vec<ProjectPartner>,
    #[serde(default)]
    pub results: Option<ProjectResults>,
    #[serde(default)]
    pub schedule: Option<Vec<ProjectTask>>,
    #[serde(default)]
    pub sponsors: Option<Vec<ProjectSponsor>>,
    #[serde(default)]
    pub budget_planned: Option<f64>,
    #[serde(default)]
    pub budget_reached: Option<f64>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
    #[serde(default)]
    pub files: Option<Vec<ProjectFile>>,
    #[serde(default)]
    pub institutional_observations: Option<String>,
    #[serde(default)]
    pub lessons_learned: Option<String>,
}

/// DTO for updating a project. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinator_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_start_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning_end_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_members: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<Vec<TargetAudience>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_audience_other: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProjectStatus>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub project_type: Option<ProjectType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partners: Option<Vec<ProjectPartner>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub results: Option<Option<ProjectResults>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub schedule: Option<Option<Vec<ProjectTask>>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub sponsors: Option<Option<Vec<ProjectSponsor>>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget_planned: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub budget_reached: Option<Option<f64>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub images: Option<Option<Vec<String>>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub files: Option<Option<Vec<ProjectFile>>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub institutional_observations: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option::deserialize",
        skip_serializing_if = "Option::is_none"
    )]
    pub lessons_learned: Option<Option<String>>,
}

impl Project {
    /// Whether this project belongs to the protected institutional record.
    pub fn is_historical(&self, current_year: i32) -> bool {
        history::is_historical(self.year, current_year)
    }
}

impl Entity for Project {
    const KIND: EntityKind = EntityKind::Project;

    type Create = CreateProject;
    type Patch = UpdateProject;

    fn id(&self) -> EntityId {
        self.id
    }

    fn from_create(input: CreateProject, stamp: RecordStamp) -> Self {
        Self {
            id: stamp.id,
            year: input.year,
            name: input.name,
            coordinator_id: input.coordinator_id,
            coordinator_name: input.coordinator_name,
            event_date: input.event_date,
            planning_start_date: input.planning_start_date,
            planning_end_date: input.planning_end_date,
            team_members: input.team_members,
            description: input.description,
            target_audience: input.target_audience,
            target_audience_other: input.target_audience_other,
            status: input.status,
            project_type: input.project_type,
            partners: input.partners,
            results: input.results,
            schedule: input.schedule,
            sponsors: input.sponsors,
            budget_planned: input.budget_planned,
            budget_reached: input.budget_reached,
            images: input.images,
            files: input.files,
            institutional_observations: input.institutional_observations,
            lessons_learned: input.lessons_learned,
            created_by: stamp.by,
            created_at: stamp.at,
            updated_at: stamp.at,
        }
    }

    fn apply_patch(&self, patch: &UpdateProject, now: Timestamp) -> Self {
        Self {
            id: self.id,
            year: merge(&self.year, &patch.year),
            name: merge(&self.name, &patch.name),
            coordinator_id: merge(&self.coordinator_id, &patch.coordinator_id),
            coordinator_name: merge(&self.coordinator_name, &patch.coordinator_name),
            event_date: merge(&self.event_date, &patch.event_date),
            planning_start_date: merge(&self.planning_start_date, &patch.planning_start_date),
            planning_end_date: merge(&self.planning_end_date, &patch.planning_end_date),
            team_members: merge(&self.team_members, &patch.team_members),
            description: merge(&self.description, &patch.description),
            target_audience: merge(&self.target_audience, &patch.target_audience),
            target_audience_other: merge(
                &self.target_audience_other,
                &patch.target_audience_other,
            ),
            status: merge(&self.status, &patch.status),
            project_type: merge(&self.project_type, &patch.project_type),
            partners: merge(&self.partners, &patch.partners),
            results: merge(&self.results, &patch.results),
            schedule: merge(&self.schedule, &patch.schedule),
            sponsors: merge(&self.sponsors, &patch.sponsors),
            budget_planned: merge(&self.budget_planned, &patch.budget_planned),
            budget_reached: merge(&self.budget_reached, &patch.budget_reached),
            images: merge(&self.images, &patch.images),
            files: merge(&self.files, &patch.files),
            institutional_observations: merge(
                &self.institutional_observations,
                &patch.institutional_observations,
            ),
            lessons_learned: merge(&self.lessons_learned, &patch.lessons_learned),
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: now,
        }
    }

    fn seed(_now: Timestamp) -> Vec<Self> {
        vec![
            Project {
                id: uuid::Uuid::from_u128(0xb1),
                year: 2024,
                name: "Copejem Day".to_string(),
                coordinator_id: SEED_MEMBER_ID,
                coordinator_name: "Gabrielle Elias".to_string(),
                event_date: date(2024, 5, 15),
                planning_start_date: date(2024, 2, 1),
                planning_end_date: date(2024, 5, 1),
                team_members: vec!["Ana".into(), "Carlos".into(), "Beatriz".into()],
                description: "Um dia de imersão e networking para jovens empresários."
                    .to_string(),
                target_audience: vec![
                    TargetAudience::YoungEntrepreneurs,
                    TargetAudience::CopejemMembers,
                ],
                target_audience_other: None,
                status: ProjectStatus::Completed,
                project_type: ProjectType::Event,
                partners: vec![
                    ProjectPartner {
                        name: "ACIM".into(),
                        partner_type: PartnerType::Acim,
                    },
                    ProjectPartner {
                        name: "Sicredi".into(),
                        partner_type: PartnerType::Sponsor,
                    },
                ],
                results: Some(ProjectResults {
                    participants_count: Some(150),
                    estimated_reach: Some(500),
                    impact_reached: None,
                    satisfaction_score: Some(4.8),
                    satisfaction_feedback: Some(
                        "Excelente feedback sobre os palestrantes".to_string(),
                    ),
                }),
                schedule: None,
                sponsors: None,
                budget_planned: None,
                budget_reached: None,
                images: None,
                files: None,
                institutional_observations: None,
                lessons_learned: None,
                created_by: None,
                created_at: timestamp(2024, 1, 10, 9),
                updated_at: timestamp(2024, 5, 20, 10),
            },
            Project {
                id: uuid::Uuid::from_u128(0xb2),
                year: 2024,
                name: "Feirão do Imposto".to_string(),
                coordinator_id: SEED_MEMBER_ID,
                coordinator_name: "Gabrielle Elias".to_string(),
                event_date: date(2024, 9, 20),
                planning_start_date: date(2024, 6, 1),
                planning_end_date: date(2024, 9, 10),
                team_members: vec!["João".into(), "Pedro".into()],
                description: "Ação de conscientização tributária.".to_string(),
                target_audience: vec![TargetAudience::ExternalPublic],
                target_audience_other: None,
                status: ProjectStatus::Executing,
                project_type: ProjectType::InstitutionalAction,
                partners: Vec::new(),
                results: None,
                schedule: None,
                sponsors: None,
                budget_planned: None,
                budget_reached: None,
                images: None,
                files: None,
                institutional_observations: None,
                lessons_learned: None,
                created_by: None,
                created_at: timestamp(2024, 5, 1, 9),
                updated_at: timestamp(2024, 5, 1, 9),
            },
        ]
    }
}

impl Deletable for Project {
    fn deletion_guard(&self, current_year: i32) -> Result<(), CoreError> {
        history::ensure_deletable(Self::KIND, self.id, self.year, current_year)
    }
}

// Seed dates are fixed literals; the fallbacks are never reached.
fn date(year: i32, month: u32, day: u32) -> Date {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn timestamp(year: i32, month: u32, day: u32, hour: u32) -> Timestamp {
    date(year, month, day)
        .and_hms_opt(hour, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};

    use super::*;

    fn sample(year: i32) -> Project {
        let mut project = Project::seed(Utc::now()).remove(1);
        project.year = year;
        project
    }

    #[test]
    fn patch_restamps_updated_at_only() {
        let before = sample(2030);
        let later = before.updated_at + Duration::days(3);
        let patch = UpdateProject {
            status: Some(ProjectStatus::Completed),
            ..Default::default()
        };
        let after = before.apply_patch(&patch, later);
        assert_eq!(after.status, ProjectStatus::Completed);
        assert_eq!(after.updated_at, later);
        assert_eq!(after.created_at, before.created_at);
        assert_eq!(after.name, before.name);
        assert_eq!(after.team_members, before.team_members);
    }

    #[test]
    fn past_year_project_refuses_deletion() {
        let project = sample(2024);
        assert_matches!(
            project.deletion_guard(2025),
            Err(CoreError::ImmutableRecord { year: 2024, .. })
        );
    }

    #[test]
    fn current_and_future_projects_are_deletable() {
        assert!(sample(2025).deletion_guard(2025).is_ok());
        assert!(sample(2026).deletion_guard(2025).is_ok());
    }

    #[test]
    fn wire_format_matches_stored_layout() {
        let value = serde_json::to_value(sample(2024)).unwrap();
        assert_eq!(value["type"], "INSTITUTIONAL_ACTION");
        assert_eq!(value["status"], "EXECUTING");
        assert_eq!(value["eventDate"], "2024-09-20");
        assert_eq!(value["targetAudience"][0], "EXTERNAL_PUBLIC");
        assert!(value.get("results").is_none());
    }

    #[test]
    fn explicit_null_clears_results() {
        let before = Project::seed(Utc::now()).remove(0);
        assert!(before.results.is_some());
        let patch: UpdateProject = serde_json::from_str(r#"{"results": null}"#).unwrap();
        let after = before.apply_patch(&patch, Utc::now());
        assert!(after.results.is_none());
        assert_eq!(after.partners, before.partners);
    }
}
