//! Repository Implementations
//!
//! PostgreSQL-backed implementations of the domain repository traits.

mod appointment_repository;
mod client_repository;
mod package_repository;
mod product_repository;
mod professional_repository;
mod service_repository;
mod settings_repository;
mod transaction_repository;

pub use appointment_repository::PgAppointmentRepository;
pub use client_repository::PgClientRepository;
pub use package_repository::PgPackageRepository;
pub use product_repository::PgProductRepository;
pub use professional_repository::PgProfessionalRepository;
pub use service_repository::PgServiceRepository;
pub use settings_repository::PgSettingsRepository;
pub use transaction_repository::PgTransactionRepository;
