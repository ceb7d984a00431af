//! Service Repository Implementation
//!
//! PostgreSQL implementation of the ServiceRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{SalonService, ServiceRepository};
use crate::domain::value_objects::Amount;
use crate::shared::error::AppError;

/// Database row representation matching the services table schema.
#[derive(Debug, sqlx::FromRow)]
struct ServiceRow {
    id: Uuid,
    name: String,
    price: Decimal,
    duration_minutes: i32,
    category: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ServiceRow {
    fn into_service(self) -> SalonService {
        SalonService {
            id: self.id,
            name: self.name,
            price: Amount::new(self.price),
            duration_minutes: self.duration_minutes,
            category: self.category,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, price, duration_minutes, category, created_at, updated_at
    FROM services
"#;

/// PostgreSQL service repository implementation.
#[derive(Clone)]
pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SalonService>, AppError> {
        let row = sqlx::query_as::<_, ServiceRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ServiceRow::into_service))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<SalonService>, AppError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!(
            "{} WHERE id = ANY($1) ORDER BY name",
            SELECT_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ServiceRow::into_service).collect())
    }

    async fn find_all(&self) -> Result<Vec<SalonService>, AppError> {
        let rows = sqlx::query_as::<_, ServiceRow>(&format!("{} ORDER BY name", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ServiceRow::into_service).collect())
    }

    async fn create(&self, service: &SalonService) -> Result<SalonService, AppError> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            INSERT INTO services (id, name, price, duration_minutes, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, price, duration_minutes, category, created_at, updated_at
            "#,
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(service.price.inner())
        .bind(service.duration_minutes)
        .bind(&service.category)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_service())
    }

    async fn update(&self, service: &SalonService) -> Result<SalonService, AppError> {
        let row = sqlx::query_as::<_, ServiceRow>(
            r#"
            UPDATE services
            SET name = $2, price = $3, duration_minutes = $4, category = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, price, duration_minutes, category, created_at, updated_at
            "#,
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(service.price.inner())
        .bind(service.duration_minutes)
        .bind(&service.category)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Service not found".into()))?;

        Ok(row.into_service())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service not found".into()));
        }
        Ok(())
    }
}
