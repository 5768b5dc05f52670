//! `members` table.

use async_trait::async_trait;
use copejem_core::member::Member;
use copejem_core::types::EntityId;
use sqlx::FromRow;

use super::PgStore;
use crate::error::{StoreError, StoreResult};
use crate::store::{CredentialStore, EntityStore};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, company_id, company_name, role, email, phone, tax_id, \
                       password, is_admin, status, admission_year, exit_year, avatar_url";

#[derive(Debug, FromRow)]
struct MemberRow {
    id: EntityId,
    name: String,
    company_id: Option<EntityId>,
    company_name: String,
    role: String,
    email: String,
    phone: Option<String>,
    tax_id: Option<String>,
    password: Option<String>,
    is_admin: bool,
    status: String,
    admission_year: i32,
    exit_year: Option<i32>,
    avatar_url: Option<String>,
}

impl TryFrom<MemberRow> for Member {
    type Error = StoreError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            company_id: row.company_id,
            company_name: row.company_name,
            role: row.role.parse()?,
            email: row.email,
            phone: row.phone,
            tax_id: row.tax_id,
            password: row.password,
            is_admin: row.is_admin,
            status: row.status.parse()?,
            admission_year: row.admission_year,
            exit_year: row.exit_year,
            avatar_url: row.avatar_url,
        })
    }
}

fn into_members(rows: Vec<MemberRow>) -> StoreResult<Vec<Member>> {
    rows.into_iter().map(Member::try_from).collect()
}

#[async_trait]
impl EntityStore<Member> for PgStore {
    /// Ordered by name ascending.
    async fn list(&self) -> StoreResult<Vec<Member>> {
        let query = format!("SELECT {COLUMNS} FROM members ORDER BY name ASC");
        let rows = sqlx::query_as::<_, MemberRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        into_members(rows)
    }

    async fn find_by_id(&self, id: EntityId) -> StoreResult<Option<Member>> {
        let query = format!("SELECT {COLUMNS} FROM members WHERE id = $1");
        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Member::try_from).transpose()
    }

    async fn insert(&self, record: Member) -> StoreResult<Member> {
        let query = format!(
            "INSERT INTO members (id, name, company_id, company_name, role, email, phone,
                                  tax_id, password, is_admin, status, admission_year,
                                  exit_year, avatar_url)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(record.id)
            .bind(&record.name)
            .bind(record.company_id)
            .bind(&record.company_name)
            .bind(record.role.as_str())
            .bind(&record.email)
            .bind(&record.phone)
            .bind(&record.tax_id)
            .bind(&record.password)
            .bind(record.is_admin)
            .bind(record.status.as_str())
            .bind(record.admission_year)
            .bind(record.exit_year)
            .bind(&record.avatar_url)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn replace(&self, record: Member) -> StoreResult<Option<Member>> {
        let query = format!(
            "UPDATE members SET
                name = $2,
                company_id = $3,
                company_name = $4,
                role = $5,
                email = $6,
                phone = $7,
                tax_id = $8,
                password = $9,
                is_admin = $10,
                status = $11,
                admission_year = $12,
                exit_year = $13,
                avatar_url = $14
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(record.id)
            .bind(&record.name)
            .bind(record.company_id)
            .bind(&record.company_name)
            .bind(record.role.as_str())
            .bind(&record.email)
            .bind(&record.phone)
            .bind(&record.tax_id)
            .bind(&record.password)
            .bind(record.is_admin)
            .bind(record.status.as_str())
            .bind(record.admission_year)
            .bind(record.exit_year)
            .bind(&record.avatar_url)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Member::try_from).transpose()
    }

    async fn delete(&self, id: EntityId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    /// Plaintext equality on `password`; see the `members` migration.
    async fn find_by_credentials(
        &self,
        identifier: &str,
        secret: &str,
    ) -> StoreResult<Option<Member>> {
        let query = format!(
            "SELECT {COLUMNS} FROM members
             WHERE (email = $1 OR tax_id = $1) AND password = $2
             ORDER BY name ASC
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, MemberRow>(&query)
            .bind(identifier)
            .bind(secret)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Member::try_from).transpose()
    }
}
