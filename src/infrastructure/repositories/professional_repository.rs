//! Professional Repository Implementation
//!
//! PostgreSQL implementation of the ProfessionalRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Professional, ProfessionalRepository};
use crate::shared::error::AppError;

/// Database row representation matching the professionals table schema.
#[derive(Debug, sqlx::FromRow)]
struct ProfessionalRow {
    id: Uuid,
    name: String,
    specialty: Option<String>,
    commission_rate: Option<Decimal>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProfessionalRow {
    fn into_professional(self) -> Professional {
        Professional {
            id: self.id,
            name: self.name,
            specialty: self.specialty,
            commission_rate: self.commission_rate,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, specialty, commission_rate, created_at, updated_at
    FROM professionals
"#;

/// PostgreSQL professional repository implementation.
#[derive(Clone)]
pub struct PgProfessionalRepository {
    pool: PgPool,
}

impl PgProfessionalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfessionalRepository for PgProfessionalRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Professional>, AppError> {
        let row =
            sqlx::query_as::<_, ProfessionalRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(ProfessionalRow::into_professional))
    }

    async fn find_all(&self) -> Result<Vec<Professional>, AppError> {
        let rows =
            sqlx::query_as::<_, ProfessionalRow>(&format!("{} ORDER BY name", SELECT_COLUMNS))
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(ProfessionalRow::into_professional)
            .collect())
    }

    async fn create(&self, professional: &Professional) -> Result<Professional, AppError> {
        let row = sqlx::query_as::<_, ProfessionalRow>(
            r#"
            INSERT INTO professionals (id, name, specialty, commission_rate)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, specialty, commission_rate, created_at, updated_at
            "#,
        )
        .bind(professional.id)
        .bind(&professional.name)
        .bind(&professional.specialty)
        .bind(professional.commission_rate)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_professional())
    }

    async fn update(&self, professional: &Professional) -> Result<Professional, AppError> {
        let row = sqlx::query_as::<_, ProfessionalRow>(
            r#"
            UPDATE professionals
            SET name = $2, specialty = $3, commission_rate = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, specialty, commission_rate, created_at, updated_at
            "#,
        )
        .bind(professional.id)
        .bind(&professional.name)
        .bind(&professional.specialty)
        .bind(professional.commission_rate)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Professional not found".into()))?;

        Ok(row.into_professional())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM professionals WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Professional not found".into()));
        }
        Ok(())
    }
}
