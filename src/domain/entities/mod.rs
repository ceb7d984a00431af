//! Domain Entities
//!
//! Core business entities and their repository traits.

pub mod appointment;
pub mod client;
pub mod financial_transaction;
pub mod product;
pub mod professional;
pub mod salon_package;
pub mod salon_service;
pub mod salon_settings;

pub use appointment::{Appointment, AppointmentRepository, AppointmentStatus};
pub use client::{
    Client, ClientRepository, InstanceService, PackageInstance, PackageInstanceStatus,
    CARD_CAPACITY, HEARTS_PER_MIMO, STAMPS_PER_HEART,
};
pub use financial_transaction::{FinancialTransaction, TransactionKind, TransactionRepository};
pub use product::{Product, ProductRepository};
pub use professional::{Professional, ProfessionalRepository};
pub use salon_package::{Package, PackageItem, PackageRepository, PackageStatus};
pub use salon_service::{SalonService, ServiceRepository};
pub use salon_settings::{DayOpeningHours, SalonSettings, SettingsRepository};
