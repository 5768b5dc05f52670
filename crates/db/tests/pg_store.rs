//! Integration tests for the PostgreSQL backend.
//!
//! These need a reachable `DATABASE_URL` and are ignored by default; run
//! with `--ignored` against a scratch database.

use assert_matches::assert_matches;
use chrono::{NaiveDate, Utc};
use copejem_core::company::{Company, CreateCompany, UpdateCompany};
use copejem_core::entity::{Entity, RecordStamp};
use copejem_core::error::CoreError;
use copejem_core::member::{Member, MemberRole, MemberStatus, UpdateMember};
use copejem_core::project::{Project, UpdateProject};
use copejem_core::session::SessionContext;
use copejem_db::store::{CredentialStore, EntityStore, PgStore};
use copejem_db::{CompanyChoice, Services, StoreError};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stamp() -> RecordStamp {
    RecordStamp {
        id: uuid::Uuid::new_v4(),
        at: Utc::now(),
        by: None,
    }
}

fn member(name: &str, email: &str, tax_id: &str, admin: bool) -> Member {
    Member {
        id: uuid::Uuid::new_v4(),
        name: name.to_string(),
        company_id: None,
        company_name: String::new(),
        role: MemberRole::President,
        email: email.to_string(),
        phone: None,
        tax_id: Some(tax_id.to_string()),
        password: Some("Teste@123".to_string()),
        is_admin: admin,
        status: MemberStatus::Active,
        admission_year: 2024,
        exit_year: None,
        avatar_url: None,
    }
}

// ---------------------------------------------------------------------------
// Migrations
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_migrations_create_tables(pool: PgPool) {
    let store = PgStore::new(pool);
    copejem_db::health_check(store.pool()).await.unwrap();

    for table in ["companies", "members", "projects"] {
        let count: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(store.pool())
            .await
            .unwrap_or_else(|e| panic!("{table} query failed: {e}"));
        assert_eq!(count.0, 0, "{table} should start empty");
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_company_insert_update_list(pool: PgPool) {
    let store = PgStore::new(pool);

    let first = Company::from_create(CreateCompany::named("Acme"), stamp());
    let first = EntityStore::<Company>::insert(&store, first).await.unwrap();
    let second = Company::from_create(CreateCompany::named("Borealis"), stamp());
    let second = EntityStore::<Company>::insert(&store, second).await.unwrap();

    let listed = EntityStore::<Company>::list(&store).await.unwrap();
    assert_eq!(listed.len(), 2);
    // Newest first.
    assert_eq!(listed[0].id, second.id);

    let patch = UpdateCompany {
        industry: Some(Some("Varejo".to_string())),
        ..Default::default()
    };
    let next = first.apply_patch(&patch, Utc::now());
    let replaced = EntityStore::<Company>::replace(&store, next)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(replaced.industry.as_deref(), Some("Varejo"));
    assert_eq!(replaced.name, "Acme");
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_replace_and_delete_missing_rows(pool: PgPool) {
    let store = PgStore::new(pool);
    let ghost = member("Ghost", "ghost@example.com", "111", false);

    let replaced = EntityStore::<Member>::replace(&store, ghost.clone())
        .await
        .unwrap();
    assert!(replaced.is_none());
    assert!(!EntityStore::<Member>::delete(&store, ghost.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_credentials_match_email_or_tax_id(pool: PgPool) {
    let store = PgStore::new(pool);
    let seeded = member("Gabrielle Elias", "email@makework.tech", "000.000.000-00", true);
    EntityStore::<Member>::insert(&store, seeded.clone())
        .await
        .unwrap();

    let by_email = store
        .find_by_credentials("email@makework.tech", "Teste@123")
        .await
        .unwrap();
    assert_eq!(by_email.map(|m| m.id), Some(seeded.id));

    let by_tax_id = store
        .find_by_credentials("000.000.000-00", "Teste@123")
        .await
        .unwrap();
    assert_eq!(by_tax_id.map(|m| m.id), Some(seeded.id));

    let wrong = store
        .find_by_credentials("email@makework.tech", "nope")
        .await
        .unwrap();
    assert!(wrong.is_none());
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_services_over_remote_backend(pool: PgPool) {
    let store = PgStore::new(pool.clone());
    let admin = member("Admin", "admin@example.com", "222", true);
    EntityStore::<Member>::insert(&store, admin.clone())
        .await
        .unwrap();
    let actor = SessionContext::for_member(&admin);
    let services = Services::remote(pool);

    let patch = UpdateMember {
        name: Some("Admin Renamed".to_string()),
        ..Default::default()
    };
    let inline = CompanyChoice::New(CreateCompany::named("Acme"));
    let updated = services
        .members
        .update(&actor, admin.id, patch, Some(inline))
        .await
        .unwrap();
    assert_eq!(updated.company_name, "Acme");
    assert_eq!(updated.name, "Admin Renamed");

    let mut past = Project::seed(Utc::now()).remove(0);
    past.id = uuid::Uuid::new_v4();
    past.coordinator_id = admin.id;
    past.year = 2020;
    past.event_date = NaiveDate::from_ymd_opt(2020, 5, 15).unwrap();
    let past = EntityStore::<Project>::insert(&store, past).await.unwrap();

    let result = services.projects.delete(&actor, past.id).await;
    assert_matches!(
        result,
        Err(StoreError::Core(CoreError::ImmutableRecord { year: 2020, .. }))
    );
    assert_eq!(services.projects.get_all().await.unwrap().len(), 1);

    let edited = services
        .projects
        .update(
            &actor,
            past.id,
            UpdateProject {
                lessons_learned: Some(Some("Registrar presença".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.coordinator_name, past.coordinator_name);
    assert_eq!(edited.lessons_learned.as_deref(), Some("Registrar presença"));
}
