//! Catalog service entity and repository trait.
//!
//! Maps to the `services` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Amount;
use crate::shared::error::AppError;

/// A service offered by the salon (cut, color, manicure, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalonService {
    pub id: Uuid,

    pub name: String,

    pub price: Amount,

    /// Expected duration, used when suggesting appointment end times
    pub duration_minutes: i32,

    pub category: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Repository trait for catalog service data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<SalonService>, AppError>;

    /// Resolve a set of ids in one query. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<SalonService>, AppError>;

    async fn find_all(&self) -> Result<Vec<SalonService>, AppError>;

    async fn create(&self, service: &SalonService) -> Result<SalonService, AppError>;

    async fn update(&self, service: &SalonService) -> Result<SalonService, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_serializes_amount_as_string() {
        let now = Utc::now();
        let service = SalonService {
            id: Uuid::new_v4(),
            name: "Corte Feminino".into(),
            price: "80,00".parse().unwrap(),
            duration_minutes: 60,
            category: Some("Cabelo".into()),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&service).unwrap();
        assert_eq!(json["price"], "80.00");
    }
}
