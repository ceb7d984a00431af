//! Product entity and repository trait.
//!
//! Maps to the `products` table. Retail stock sold over the counter,
//! tracked separately from the service catalog.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Amount, CalendarDate};
use crate::shared::error::AppError;

/// A retail product kept in stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,

    pub name: String,

    /// Units currently on the shelf
    pub stock: i32,

    /// At or below this level the product counts as running low
    pub low_stock_threshold: i32,

    pub cost_price: Option<Amount>,

    pub selling_price: Option<Amount>,

    pub last_restock_date: Option<CalendarDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_on_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// Repository trait for Product data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn find_all(&self) -> Result<Vec<Product>, AppError>;

    async fn create(&self, product: &Product) -> Result<Product, AppError>;

    async fn update(&self, product: &Product) -> Result<Product, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(stock: i32, threshold: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: "Shampoo 300ml".into(),
            stock,
            low_stock_threshold: threshold,
            cost_price: Some(Amount::new(dec!(18.00))),
            selling_price: Some(Amount::new(dec!(35.00))),
            last_restock_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_stock_at_threshold_counts_as_low() {
        assert!(product(3, 3).is_low_on_stock());
        assert!(product(0, 3).is_low_on_stock());
        assert!(!product(4, 3).is_low_on_stock());
    }
}
