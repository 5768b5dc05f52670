//! Remote backend over PostgreSQL.
//!
//! Each entity kind gets its own submodule with a `FromRow` row struct, a
//! shared column list, and the [`EntityStore`](super::EntityStore) impl.
//! Every write is a single statement scoped by `id`.

use sqlx::PgPool;

mod company;
mod member;
mod project;

/// [`EntityStore`](super::EntityStore) for all three kinds over one pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
