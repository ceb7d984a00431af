//! Request DTOs
//!
//! Data structures for API request bodies and query strings.

use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::domain::entities::{AppointmentStatus, PackageStatus, TransactionKind};
use crate::domain::value_objects::{Amount, CalendarDate, TimeOfDay};

/// Create or rewrite an appointment
#[derive(Debug, Deserialize, Validate)]
pub struct CreateAppointmentRequest {
    #[validate(length(min = 1, max = 120, message = "Client name must be 1-120 characters"))]
    pub client_name: String,

    pub service_ids: Vec<Uuid>,

    pub professional_id: Uuid,

    pub date: CalendarDate,

    pub start_time: TimeOfDay,

    pub end_time: TimeOfDay,

    pub total_amount: Amount,
}

/// Change an appointment's status
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

/// Agenda listing query
#[derive(Debug, Deserialize)]
pub struct AgendaQuery {
    pub date: Option<CalendarDate>,
    pub professional_id: Option<Uuid>,
}

/// Day grid query
#[derive(Debug, Deserialize)]
pub struct GridQuery {
    pub date: CalendarDate,
    pub professional_id: Uuid,
}

/// Package-coverage advisory query. `service_ids` is comma-separated.
#[derive(Debug, Deserialize, Validate)]
pub struct AdvisoryQuery {
    #[validate(length(min = 1, message = "Client name must not be empty"))]
    pub client_name: String,
    pub service_ids: String,
}

/// Create or update a client
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertClientRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,
}

/// Create or update a catalog service
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertServiceRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    pub price: Amount,

    #[validate(range(min = 1, max = 480, message = "Duration must be 1-480 minutes"))]
    pub duration_minutes: i32,

    #[validate(length(max = 60, message = "Category must be at most 60 characters"))]
    pub category: Option<String>,
}

/// One service line in a package payload
#[derive(Debug, Deserialize)]
pub struct PackageItemRequest {
    pub service_id: Uuid,
    pub quantity: i32,
}

/// Create or update a catalog package
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertPackageRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub short_description: Option<String>,

    pub price: Amount,

    pub original_price: Option<Amount>,

    #[validate(range(min = 1, max = 3650, message = "Validity must be 1-3650 days"))]
    pub validity_days: i32,

    #[serde(default)]
    pub status: PackageStatus,

    pub items: Vec<PackageItemRequest>,
}

/// Sell a package to a client
#[derive(Debug, Deserialize)]
pub struct SellPackageRequest {
    pub client_id: Uuid,
}

/// Create or update a retail product
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertProductRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[serde(default)]
    pub stock: i32,

    #[serde(default)]
    pub low_stock_threshold: i32,

    pub cost_price: Option<Amount>,

    pub selling_price: Option<Amount>,

    pub last_restock_date: Option<CalendarDate>,
}

/// Create or update a professional
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertProfessionalRequest {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(length(max = 120, message = "Specialty must be at most 120 characters"))]
    pub specialty: Option<String>,

    pub commission_rate: Option<Decimal>,
}

/// Append a ledger entry
#[derive(Debug, Deserialize, Validate)]
pub struct AppendTransactionRequest {
    #[validate(length(min = 1, max = 500, message = "Description must be 1-500 characters"))]
    pub description: String,

    pub amount: Amount,

    pub date: CalendarDate,

    #[validate(length(min = 1, max = 60, message = "Category must be 1-60 characters"))]
    pub category: String,

    pub kind: TransactionKind,
}

/// Ledger listing query
#[derive(Debug, Deserialize)]
pub struct LedgerQuery {
    pub from: Option<CalendarDate>,
    pub to: Option<CalendarDate>,
}
