//! Client entity, purchased package instances and the loyalty card.
//!
//! Maps to the `clients`, `client_packages` and `client_package_items`
//! tables. Each purchased package is its own row with per-service
//! remaining counters, so a debit is a single keyed update.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::CalendarDate;
use crate::shared::error::AppError;

/// Stamps required to fill one heart on the loyalty card.
pub const STAMPS_PER_HEART: u32 = 3;

/// Hearts required to earn one mimo (reward).
pub const HEARTS_PER_MIMO: u32 = 1;

/// Total stamp slots on the card.
pub const CARD_CAPACITY: u32 = 12;

/// Lifecycle of a purchased package instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PackageInstanceStatus {
    /// Has remaining sessions and is not past its expiry date
    #[default]
    Active,
    /// Every service counter reached zero
    Used,
    /// Expiry date passed with sessions remaining
    Expired,
}

impl PackageInstanceStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "active" => Self::Active,
            "used" => Self::Used,
            "expired" => Self::Expired,
            _ => Self::Active,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Expired => "expired",
        }
    }
}

impl std::fmt::Display for PackageInstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Remaining sessions of one service inside a package instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceService {
    pub service_id: Uuid,
    pub remaining_quantity: i32,
}

/// A package purchased by a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageInstance {
    pub id: Uuid,

    pub client_id: Uuid,

    /// Package name captured at sale time; later catalog edits do not
    /// retroactively change sold instances
    pub package_name: String,

    pub status: PackageInstanceStatus,

    pub purchase_date: CalendarDate,

    /// `None` means the instance never expires
    pub expiry_date: Option<CalendarDate>,

    pub services: Vec<InstanceService>,
}

impl PackageInstance {
    /// Whether the instance can cover `service_id` on `today`.
    pub fn covers(&self, service_id: Uuid, today: CalendarDate) -> bool {
        self.status == PackageInstanceStatus::Active
            && !self.is_expired_at(today)
            && self
                .services
                .iter()
                .any(|s| s.service_id == service_id && s.remaining_quantity > 0)
    }

    /// Whether the expiry date, if any, has passed.
    pub fn is_expired_at(&self, today: CalendarDate) -> bool {
        self.expiry_date.is_some_and(|expiry| expiry < today)
    }

    /// Whether every service counter has reached zero.
    pub fn is_fully_used(&self) -> bool {
        self.services.iter().all(|s| s.remaining_quantity == 0)
    }
}

/// A salon client with a loyalty card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,

    pub name: String,

    pub email: Option<String>,

    pub phone: Option<String>,

    /// Stamps collected on the loyalty card
    pub stamps_earned: i32,

    /// Mimos the client has already redeemed
    pub mimos_redeemed: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Client {
    /// Name normalized for matching against booking names.
    pub fn normalized_name(&self) -> String {
        self.name.trim().to_lowercase()
    }

    /// Completed hearts on the card.
    pub fn hearts_earned(&self) -> u32 {
        (self.stamps_earned.max(0) as u32) / STAMPS_PER_HEART
    }

    /// Mimos earned over the client's lifetime.
    pub fn mimos_earned(&self) -> u32 {
        self.hearts_earned() / HEARTS_PER_MIMO
    }

    /// Mimos available to redeem right now.
    pub fn mimos_available(&self) -> u32 {
        self.mimos_earned()
            .saturating_sub(self.mimos_redeemed.max(0) as u32)
    }

    /// Whether the card still has room for another stamp.
    pub fn card_has_room(&self) -> bool {
        (self.stamps_earned.max(0) as u32) < CARD_CAPACITY
    }
}

/// Repository trait for Client data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Client>, AppError>;

    /// Find a client whose trimmed, lowercased name equals `normalized`.
    async fn find_by_normalized_name(&self, normalized: &str)
        -> Result<Option<Client>, AppError>;

    async fn find_all(&self) -> Result<Vec<Client>, AppError>;

    async fn create(&self, client: &Client) -> Result<Client, AppError>;

    async fn update(&self, client: &Client) -> Result<Client, AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Add one stamp to the loyalty card.
    async fn increment_stamps(&self, id: Uuid) -> Result<(), AppError>;

    /// Record one redeemed mimo.
    async fn increment_mimos_redeemed(&self, id: Uuid) -> Result<(), AppError>;

    /// Package instances owned by a client, newest purchase first.
    async fn find_package_instances(
        &self,
        client_id: Uuid,
    ) -> Result<Vec<PackageInstance>, AppError>;

    /// Insert a new package instance with its service counters.
    async fn create_package_instance(
        &self,
        instance: &PackageInstance,
    ) -> Result<PackageInstance, AppError>;

    /// Decrement one session of `service_id` on `instance_id`.
    ///
    /// Returns `true` when a counter above zero was decremented, `false`
    /// when nothing remained to debit.
    async fn debit_instance_service(
        &self,
        instance_id: Uuid,
        service_id: Uuid,
    ) -> Result<bool, AppError>;

    /// Update the stored status of a package instance.
    async fn update_instance_status(
        &self,
        instance_id: Uuid,
        status: PackageInstanceStatus,
    ) -> Result<(), AppError>;
}
