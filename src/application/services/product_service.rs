//! Product Service
//!
//! CRUD for the retail inventory.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::entities::{Product, ProductRepository};
use crate::domain::value_objects::{Amount, CalendarDate};

/// Product service trait.
#[async_trait]
pub trait ProductService: Send + Sync {
    async fn create(&self, request: UpsertProductDto) -> Result<Product, ProductError>;

    async fn list(&self) -> Result<Vec<Product>, ProductError>;

    async fn update(&self, id: Uuid, request: UpsertProductDto) -> Result<Product, ProductError>;

    async fn delete(&self, id: Uuid) -> Result<(), ProductError>;
}

/// Request DTO for creating or updating a product.
#[derive(Debug, Clone)]
pub struct UpsertProductDto {
    pub name: String,
    pub stock: i32,
    pub low_stock_threshold: i32,
    pub cost_price: Option<Amount>,
    pub selling_price: Option<Amount>,
    pub last_restock_date: Option<CalendarDate>,
}

/// Product service errors.
#[derive(Debug, thiserror::Error)]
pub enum ProductError {
    #[error("Product not found")]
    NotFound,

    #[error("Invalid product: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Product service implementation.
pub struct ProductServiceImpl<R>
where
    R: ProductRepository,
{
    product_repo: Arc<R>,
}

impl<R> ProductServiceImpl<R>
where
    R: ProductRepository,
{
    pub fn new(product_repo: Arc<R>) -> Self {
        Self { product_repo }
    }

    fn validate(request: &UpsertProductDto) -> Result<(), ProductError> {
        if request.name.trim().is_empty() {
            return Err(ProductError::Validation("Name must not be empty".into()));
        }
        if request.stock < 0 {
            return Err(ProductError::Validation(
                "Stock must not be negative".into(),
            ));
        }
        if request.low_stock_threshold < 0 {
            return Err(ProductError::Validation(
                "Low-stock threshold must not be negative".into(),
            ));
        }
        for (label, price) in [
            ("Cost price", request.cost_price),
            ("Selling price", request.selling_price),
        ] {
            if let Some(p) = price {
                if p < Amount::ZERO {
                    return Err(ProductError::Validation(format!(
                        "{} must not be negative",
                        label
                    )));
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<R> ProductService for ProductServiceImpl<R>
where
    R: ProductRepository + 'static,
{
    async fn create(&self, request: UpsertProductDto) -> Result<Product, ProductError> {
        Self::validate(&request)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            stock: request.stock,
            low_stock_threshold: request.low_stock_threshold,
            cost_price: request.cost_price,
            selling_price: request.selling_price,
            last_restock_date: request.last_restock_date,
            created_at: now,
            updated_at: now,
        };

        self.product_repo
            .create(&product)
            .await
            .map_err(|e| ProductError::Internal(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<Product>, ProductError> {
        self.product_repo
            .find_all()
            .await
            .map_err(|e| ProductError::Internal(e.to_string()))
    }

    async fn update(&self, id: Uuid, request: UpsertProductDto) -> Result<Product, ProductError> {
        Self::validate(&request)?;

        let mut product = self
            .product_repo
            .find_by_id(id)
            .await
            .map_err(|e| ProductError::Internal(e.to_string()))?
            .ok_or(ProductError::NotFound)?;

        product.name = request.name.trim().to_string();
        product.stock = request.stock;
        product.low_stock_threshold = request.low_stock_threshold;
        product.cost_price = request.cost_price;
        product.selling_price = request.selling_price;
        product.last_restock_date = request.last_restock_date;
        product.updated_at = Utc::now();

        self.product_repo
            .update(&product)
            .await
            .map_err(|e| ProductError::Internal(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), ProductError> {
        self.product_repo.delete(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => ProductError::NotFound,
            other => ProductError::Internal(other.to_string()),
        })
    }
}
