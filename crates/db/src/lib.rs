//! Persistence and entity lifecycle services.
//!
//! The same [`Services`] bundle runs against either backend:
//!
//! - local: JSON slots in a directory ([`store::LocalStore`])
//! - remote: PostgreSQL ([`store::PgStore`])
//!
//! Callers use the repositories and services only; nothing above the store
//! layer knows which backend is active.

use std::path::PathBuf;
use std::sync::Arc;

use copejem_core::company::Company;
use copejem_core::member::Member;
use copejem_core::project::Project;
use copejem_events::EventBus;
use sqlx::postgres::PgPoolOptions;

pub mod config;
pub mod error;
pub mod repository;
pub mod services;
pub mod store;

pub use config::{BackendKind, ConfigError, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use repository::Repository;
pub use services::{AuthService, CompanyChoice, MemberService, ProjectService};

use store::{LocalStore, PgStore, SlotStore};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the backend is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply the embedded migrations in `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Repositories and services wired to one backend and one event bus.
#[derive(Clone)]
pub struct Services {
    pub companies: Repository<Company>,
    pub members: MemberService,
    pub projects: ProjectService,
    pub auth: AuthService,
    pub events: Arc<EventBus>,
}

impl Services {
    /// Wire everything over local JSON slots in `data_dir`.
    pub fn local(data_dir: impl Into<PathBuf>) -> Self {
        let slots = SlotStore::new(data_dir);
        let members = Arc::new(LocalStore::<Member>::new(slots.clone()));
        Self::assemble(
            Arc::new(LocalStore::<Company>::new(slots.clone())),
            members.clone(),
            members,
            Arc::new(LocalStore::<Project>::new(slots)),
        )
    }

    /// Wire everything over a PostgreSQL pool. Migrations are not run here.
    pub fn remote(pool: DbPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::assemble(store.clone(), store.clone(), store.clone(), store)
    }

    /// Build services for `config`, connecting and migrating when remote.
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        match config.backend {
            BackendKind::Local => {
                tracing::info!(data_dir = %config.data_dir.display(), "Using local slot storage");
                Ok(Self::local(&config.data_dir))
            }
            BackendKind::Remote => {
                let url = config.database_url.as_deref().ok_or_else(|| {
                    copejem_core::error::CoreError::Internal(
                        "DATABASE_URL missing for remote backend".into(),
                    )
                })?;
                let pool = create_pool(url, config.max_connections).await?;
                health_check(&pool).await?;
                run_migrations(&pool).await?;
                tracing::info!("Using remote PostgreSQL storage");
                Ok(Self::remote(pool))
            }
        }
    }

    /// Build services over arbitrary stores.
    pub fn assemble(
        companies: Arc<dyn store::EntityStore<Company>>,
        members: Arc<dyn store::EntityStore<Member>>,
        credentials: Arc<dyn store::CredentialStore>,
        projects: Arc<dyn store::EntityStore<Project>>,
    ) -> Self {
        let events = Arc::new(EventBus::default());
        let companies = Repository::new(companies);
        let members = Repository::new(members);
        let projects = Repository::new(projects);

        Self {
            members: MemberService::new(members.clone(), companies.clone(), Arc::clone(&events)),
            projects: ProjectService::new(projects, members, Arc::clone(&events)),
            auth: AuthService::new(credentials, Arc::clone(&events)),
            companies,
            events,
        }
    }
}
