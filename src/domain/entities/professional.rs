//! Professional entity and repository trait.
//!
//! Maps to the `professionals` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::AppError;

/// A staff member who delivers services.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Professional {
    pub id: Uuid,

    pub name: String,

    pub specialty: Option<String>,

    /// Commission as a percentage, e.g. 40.00
    pub commission_rate: Option<Decimal>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Professional data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfessionalRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Professional>, AppError>;

    async fn find_all(&self) -> Result<Vec<Professional>, AppError>;

    async fn create(&self, professional: &Professional) -> Result<Professional, AppError>;

    async fn update(&self, professional: &Professional) -> Result<Professional, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}
