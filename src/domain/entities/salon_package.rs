//! Catalog package entity and repository trait.
//!
//! Maps to the `packages` and `package_items` tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::Amount;
use crate::shared::error::AppError;

/// Whether a package can currently be sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackageStatus {
    #[default]
    Active,
    Inactive,
}

impl PackageStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => Self::Active,
            "inactive" => Self::Inactive,
            _ => Self::Active,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for PackageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One service line inside a package definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageItem {
    pub service_id: Uuid,
    pub quantity: i32,
}

/// A sellable bundle of service sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: Uuid,

    pub name: String,

    pub short_description: Option<String>,

    pub price: Amount,

    /// Sum of the included services at list price, shown struck through
    pub original_price: Option<Amount>,

    /// Days until a sold instance expires, counted from purchase
    pub validity_days: i32,

    pub status: PackageStatus,

    pub items: Vec<PackageItem>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Package {
    pub fn is_sellable(&self) -> bool {
        self.status == PackageStatus::Active && !self.items.is_empty()
    }
}

/// Repository trait for catalog package data access.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PackageRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Package>, AppError>;

    async fn find_all(&self) -> Result<Vec<Package>, AppError>;

    async fn create(&self, package: &Package) -> Result<Package, AppError>;

    async fn update(&self, package: &Package) -> Result<Package, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(status: PackageStatus, items: Vec<PackageItem>) -> Package {
        let now = Utc::now();
        Package {
            id: Uuid::new_v4(),
            name: "Pacote Prata".into(),
            short_description: None,
            price: "300,00".parse().unwrap(),
            original_price: Some("360,00".parse().unwrap()),
            validity_days: 90,
            status,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [PackageStatus::Active, PackageStatus::Inactive] {
            assert_eq!(PackageStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn test_active_package_with_items_is_sellable() {
        let item = PackageItem {
            service_id: Uuid::new_v4(),
            quantity: 4,
        };
        assert!(package(PackageStatus::Active, vec![item]).is_sellable());
    }

    #[test]
    fn test_inactive_or_empty_package_is_not_sellable() {
        let item = PackageItem {
            service_id: Uuid::new_v4(),
            quantity: 4,
        };
        assert!(!package(PackageStatus::Inactive, vec![item]).is_sellable());
        assert!(!package(PackageStatus::Active, vec![]).is_sellable());
    }
}
