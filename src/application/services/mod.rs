//! Application Services
//!
//! Use cases orchestrating repositories and domain services.

pub mod appointment_service;
pub mod catalog_service;
pub mod client_service;
pub mod completion;
pub mod finance_service;
pub mod product_service;
pub mod professional_service;
pub mod settings_service;

pub use appointment_service::{
    AppointmentError, AppointmentService, AppointmentServiceImpl, CoverageAdvisory,
    CreateAppointmentDto, StatusUpdateDto,
};
pub use catalog_service::{
    CatalogError, CatalogService, CatalogServiceImpl, UpsertPackageDto, UpsertServiceDto,
};
pub use client_service::{
    ClientError, ClientService, ClientServiceImpl, LoyaltySummaryDto, UpsertClientDto,
};
pub use completion::{
    ClientResolution, CompletionOutcome, CompletionService, CompletionServiceImpl, CompletionStep,
    PackageDebit, RevenueOutcome, StampOutcome, StepFailure,
};
pub use finance_service::{
    AppendTransactionDto, FinanceError, FinanceService, FinanceServiceImpl, FinanceSummaryDto,
};
pub use product_service::{ProductError, ProductService, ProductServiceImpl, UpsertProductDto};
pub use professional_service::{
    ProfessionalError, ProfessionalService, ProfessionalServiceImpl, UpsertProfessionalDto,
};
pub use settings_service::{SettingsError, SettingsService, SettingsServiceImpl};
