//! Product Repository Implementation
//!
//! PostgreSQL implementation of the ProductRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Product, ProductRepository};
use crate::domain::value_objects::{Amount, CalendarDate};
use crate::shared::error::AppError;

/// Database row representation matching the products table schema.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    stock: i32,
    low_stock_threshold: i32,
    cost_price: Option<Decimal>,
    selling_price: Option<Decimal>,
    last_restock_date: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ProductRow {
    fn into_product(self) -> Product {
        Product {
            id: self.id,
            name: self.name,
            stock: self.stock,
            low_stock_threshold: self.low_stock_threshold,
            cost_price: self.cost_price.map(Amount::new),
            selling_price: self.selling_price.map(Amount::new),
            last_restock_date: self.last_restock_date.map(CalendarDate::new),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, name, stock, low_stock_threshold, cost_price, selling_price,
           last_restock_date, created_at, updated_at
    FROM products
"#;

const RETURNING_COLUMNS: &str = r#"
    RETURNING id, name, stock, low_stock_threshold, cost_price, selling_price,
              last_restock_date, created_at, updated_at
"#;

/// PostgreSQL product repository implementation.
#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ProductRow::into_product))
    }

    async fn find_all(&self) -> Result<Vec<Product>, AppError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!("{} ORDER BY name", SELECT_COLUMNS))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ProductRow::into_product).collect())
    }

    async fn create(&self, product: &Product) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            INSERT INTO products (id, name, stock, low_stock_threshold, cost_price,
                                  selling_price, last_restock_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            {}
            "#,
            RETURNING_COLUMNS
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.low_stock_threshold)
        .bind(product.cost_price.map(|p| p.inner()))
        .bind(product.selling_price.map(|p| p.inner()))
        .bind(product.last_restock_date.map(|d| d.inner()))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_product())
    }

    async fn update(&self, product: &Product) -> Result<Product, AppError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            r#"
            UPDATE products
            SET name = $2, stock = $3, low_stock_threshold = $4, cost_price = $5,
                selling_price = $6, last_restock_date = $7, updated_at = NOW()
            WHERE id = $1
            {}
            "#,
            RETURNING_COLUMNS
        ))
        .bind(product.id)
        .bind(&product.name)
        .bind(product.stock)
        .bind(product.low_stock_threshold)
        .bind(product.cost_price.map(|p| p.inner()))
        .bind(product.selling_price.map(|p| p.inner()))
        .bind(product.last_restock_date.map(|d| d.inner()))
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

        Ok(row.into_product())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Product not found".into()));
        }
        Ok(())
    }
}
