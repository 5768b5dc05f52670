//! `companies` table.

use async_trait::async_trait;
use copejem_core::company::Company;
use copejem_core::types::{EntityId, Timestamp};
use sqlx::FromRow;

use super::PgStore;
use crate::error::StoreResult;
use crate::store::EntityStore;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, tax_id, industry, website, created_at";

#[derive(Debug, FromRow)]
struct CompanyRow {
    id: EntityId,
    name: String,
    tax_id: Option<String>,
    industry: Option<String>,
    website: Option<String>,
    created_at: Timestamp,
}

impl From<CompanyRow> for Company {
    fn from(row: CompanyRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            tax_id: row.tax_id,
            industry: row.industry,
            website: row.website,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl EntityStore<Company> for PgStore {
    /// Most recently created first.
    async fn list(&self) -> StoreResult<Vec<Company>> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, CompanyRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Company::from).collect())
    }

    async fn find_by_id(&self, id: EntityId) -> StoreResult<Option<Company>> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        let row = sqlx::query_as::<_, CompanyRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Company::from))
    }

    async fn insert(&self, record: Company) -> StoreResult<Company> {
        let query = format!(
            "INSERT INTO companies (id, name, tax_id, industry, website, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CompanyRow>(&query)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.tax_id)
            .bind(&record.industry)
            .bind(&record.website)
            .bind(record.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn replace(&self, record: Company) -> StoreResult<Option<Company>> {
        let query = format!(
            "UPDATE companies SET
                name = $2,
                tax_id = $3,
                industry = $4,
                website = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, CompanyRow>(&query)
            .bind(record.id)
            .bind(&record.name)
            .bind(&record.tax_id)
            .bind(&record.industry)
            .bind(&record.website)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Company::from))
    }

    async fn delete(&self, id: EntityId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM companies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
