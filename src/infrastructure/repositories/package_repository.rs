//! Package Repository Implementation
//!
//! PostgreSQL implementation of the PackageRepository trait. Package items
//! are stored in a child table and replaced wholesale on update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Package, PackageItem, PackageRepository, PackageStatus};
use crate::domain::value_objects::Amount;
use crate::shared::error::AppError;

/// Database row representation matching the packages table schema.
#[derive(Debug, sqlx::FromRow)]
struct PackageRow {
    id: Uuid,
    name: String,
    short_description: Option<String>,
    price: Decimal,
    original_price: Option<Decimal>,
    validity_days: i32,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PackageRow {
    fn into_package(self, items: Vec<PackageItem>) -> Package {
        Package {
            id: self.id,
            name: self.name,
            short_description: self.short_description,
            price: Amount::new(self.price),
            original_price: self.original_price.map(Amount::new),
            validity_days: self.validity_days,
            status: PackageStatus::from_str(&self.status),
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Database row for package_items.
#[derive(Debug, sqlx::FromRow)]
struct PackageItemRow {
    package_id: Uuid,
    service_id: Uuid,
    quantity: i32,
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, short_description, price, original_price, validity_days,
           status, created_at, updated_at
    FROM packages
"#;

/// PostgreSQL package repository implementation.
#[derive(Clone)]
pub struct PgPackageRepository {
    pool: PgPool,
}

impl PgPackageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn items_for(&self, package_id: Uuid) -> Result<Vec<PackageItem>, AppError> {
        let rows = sqlx::query_as::<_, PackageItemRow>(
            "SELECT package_id, service_id, quantity FROM package_items WHERE package_id = $1",
        )
        .bind(package_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| PackageItem {
                service_id: r.service_id,
                quantity: r.quantity,
            })
            .collect())
    }
}

#[async_trait]
impl PackageRepository for PgPackageRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>, AppError> {
        let row = sqlx::query_as::<_, PackageRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let items = self.items_for(row.id).await?;
                Ok(Some(row.into_package(items)))
            }
            None => Ok(None),
        }
    }

    async fn find_all(&self) -> Result<Vec<Package>, AppError> {
        let rows = sqlx::query_as::<_, PackageRow>(&format!("{} ORDER BY name", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        let item_rows = sqlx::query_as::<_, PackageItemRow>(
            "SELECT package_id, service_id, quantity FROM package_items",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = item_rows
                    .iter()
                    .filter(|i| i.package_id == row.id)
                    .map(|i| PackageItem {
                        service_id: i.service_id,
                        quantity: i.quantity,
                    })
                    .collect();
                row.into_package(items)
            })
            .collect())
    }

    async fn create(&self, package: &Package) -> Result<Package, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO packages
                (id, name, short_description, price, original_price, validity_days, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(package.id)
        .bind(&package.name)
        .bind(&package.short_description)
        .bind(package.price.inner())
        .bind(package.original_price.map(|p| p.inner()))
        .bind(package.validity_days)
        .bind(package.status.as_str())
        .execute(&mut *tx)
        .await?;

        for item in &package.items {
            sqlx::query(
                "INSERT INTO package_items (package_id, service_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(package.id)
            .bind(item.service_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(package.clone())
    }

    async fn update(&self, package: &Package) -> Result<Package, AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE packages
            SET name = $2, short_description = $3, price = $4, original_price = $5,
                validity_days = $6, status = $7, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(package.id)
        .bind(&package.name)
        .bind(&package.short_description)
        .bind(package.price.inner())
        .bind(package.original_price.map(|p| p.inner()))
        .bind(package.validity_days)
        .bind(package.status.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Package not found".into()));
        }

        sqlx::query("DELETE FROM package_items WHERE package_id = $1")
            .bind(package.id)
            .execute(&mut *tx)
            .await?;

        for item in &package.items {
            sqlx::query(
                "INSERT INTO package_items (package_id, service_id, quantity) VALUES ($1, $2, $3)",
            )
            .bind(package.id)
            .bind(item.service_id)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(package.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM packages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Package not found".into()));
        }
        Ok(())
    }
}
