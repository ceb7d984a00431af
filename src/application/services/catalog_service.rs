//! Catalog Service
//!
//! CRUD for services and packages, and the sale that turns a catalog
//! package into a client-owned instance.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::{
    ClientRepository, InstanceService, Package, PackageInstance, PackageInstanceStatus,
    PackageItem, PackageRepository, PackageStatus, SalonService, ServiceRepository,
};
use crate::domain::value_objects::{Amount, CalendarDate};

/// Catalog service trait covering services, packages and sales.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_service(&self, request: UpsertServiceDto)
        -> Result<SalonService, CatalogError>;

    async fn list_services(&self) -> Result<Vec<SalonService>, CatalogError>;

    async fn update_service(
        &self,
        id: Uuid,
        request: UpsertServiceDto,
    ) -> Result<SalonService, CatalogError>;

    async fn delete_service(&self, id: Uuid) -> Result<(), CatalogError>;

    async fn create_package(&self, request: UpsertPackageDto) -> Result<Package, CatalogError>;

    async fn list_packages(&self) -> Result<Vec<Package>, CatalogError>;

    async fn update_package(
        &self,
        id: Uuid,
        request: UpsertPackageDto,
    ) -> Result<Package, CatalogError>;

    async fn delete_package(&self, id: Uuid) -> Result<(), CatalogError>;

    /// Sell a package to a client: a new Active instance with full
    /// per-service counters, expiring validity_days after purchase.
    async fn sell_package(
        &self,
        package_id: Uuid,
        client_id: Uuid,
    ) -> Result<PackageInstance, CatalogError>;
}

/// Request DTO for creating or updating a catalog service.
#[derive(Debug, Clone)]
pub struct UpsertServiceDto {
    pub name: String,
    pub price: Amount,
    pub duration_minutes: i32,
    pub category: Option<String>,
}

/// Request DTO for creating or updating a catalog package.
#[derive(Debug, Clone)]
pub struct UpsertPackageDto {
    pub name: String,
    pub short_description: Option<String>,
    pub price: Amount,
    pub original_price: Option<Amount>,
    pub validity_days: i32,
    pub status: PackageStatus,
    pub items: Vec<PackageItem>,
}

/// Catalog service errors.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Service not found")]
    ServiceNotFound,

    #[error("Package not found")]
    PackageNotFound,

    #[error("Client not found")]
    ClientNotFound,

    #[error("Package is not sellable")]
    NotSellable,

    #[error("Invalid catalog entry: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Catalog service implementation.
pub struct CatalogServiceImpl<S, K, C>
where
    S: ServiceRepository,
    K: PackageRepository,
    C: ClientRepository,
{
    service_repo: Arc<S>,
    package_repo: Arc<K>,
    client_repo: Arc<C>,
}

impl<S, K, C> CatalogServiceImpl<S, K, C>
where
    S: ServiceRepository,
    K: PackageRepository,
    C: ClientRepository,
{
    pub fn new(service_repo: Arc<S>, package_repo: Arc<K>, client_repo: Arc<C>) -> Self {
        Self {
            service_repo,
            package_repo,
            client_repo,
        }
    }

    fn validate_service(request: &UpsertServiceDto) -> Result<(), CatalogError> {
        if request.name.trim().is_empty() {
            return Err(CatalogError::Validation("Name must not be empty".into()));
        }
        if request.duration_minutes <= 0 {
            return Err(CatalogError::Validation(
                "Duration must be positive".into(),
            ));
        }
        Ok(())
    }

    async fn validate_package(&self, request: &UpsertPackageDto) -> Result<(), CatalogError> {
        if request.name.trim().is_empty() {
            return Err(CatalogError::Validation("Name must not be empty".into()));
        }
        if request.validity_days <= 0 {
            return Err(CatalogError::Validation(
                "Validity must be positive".into(),
            ));
        }
        if request.items.iter().any(|i| i.quantity <= 0) {
            return Err(CatalogError::Validation(
                "Item quantities must be positive".into(),
            ));
        }

        // every referenced service must exist
        let ids: Vec<Uuid> = request.items.iter().map(|i| i.service_id).collect();
        if !ids.is_empty() {
            let found = self
                .service_repo
                .find_by_ids(&ids)
                .await
                .map_err(|e| CatalogError::Internal(e.to_string()))?;
            if found.len() != ids.len() {
                return Err(CatalogError::Validation(
                    "Package references an unknown service".into(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<S, K, C> CatalogService for CatalogServiceImpl<S, K, C>
where
    S: ServiceRepository + 'static,
    K: PackageRepository + 'static,
    C: ClientRepository + 'static,
{
    async fn create_service(
        &self,
        request: UpsertServiceDto,
    ) -> Result<SalonService, CatalogError> {
        Self::validate_service(&request)?;

        let now = Utc::now();
        let service = SalonService {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            price: request.price,
            duration_minutes: request.duration_minutes,
            category: request.category,
            created_at: now,
            updated_at: now,
        };

        self.service_repo
            .create(&service)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))
    }

    async fn list_services(&self) -> Result<Vec<SalonService>, CatalogError> {
        self.service_repo
            .find_all()
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))
    }

    async fn update_service(
        &self,
        id: Uuid,
        request: UpsertServiceDto,
    ) -> Result<SalonService, CatalogError> {
        Self::validate_service(&request)?;

        let mut service = self
            .service_repo
            .find_by_id(id)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))?
            .ok_or(CatalogError::ServiceNotFound)?;

        service.name = request.name.trim().to_string();
        service.price = request.price;
        service.duration_minutes = request.duration_minutes;
        service.category = request.category;
        service.updated_at = Utc::now();

        self.service_repo
            .update(&service)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))
    }

    async fn delete_service(&self, id: Uuid) -> Result<(), CatalogError> {
        self.service_repo.delete(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => CatalogError::ServiceNotFound,
            other => CatalogError::Internal(other.to_string()),
        })
    }

    async fn create_package(&self, request: UpsertPackageDto) -> Result<Package, CatalogError> {
        self.validate_package(&request).await?;

        let now = Utc::now();
        let package = Package {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            short_description: request.short_description,
            price: request.price,
            original_price: request.original_price,
            validity_days: request.validity_days,
            status: request.status,
            items: request.items,
            created_at: now,
            updated_at: now,
        };

        self.package_repo
            .create(&package)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))
    }

    async fn list_packages(&self) -> Result<Vec<Package>, CatalogError> {
        self.package_repo
            .find_all()
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))
    }

    async fn update_package(
        &self,
        id: Uuid,
        request: UpsertPackageDto,
    ) -> Result<Package, CatalogError> {
        self.validate_package(&request).await?;

        let mut package = self
            .package_repo
            .find_by_id(id)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))?
            .ok_or(CatalogError::PackageNotFound)?;

        package.name = request.name.trim().to_string();
        package.short_description = request.short_description;
        package.price = request.price;
        package.original_price = request.original_price;
        package.validity_days = request.validity_days;
        package.status = request.status;
        package.items = request.items;
        package.updated_at = Utc::now();

        self.package_repo
            .update(&package)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))
    }

    async fn delete_package(&self, id: Uuid) -> Result<(), CatalogError> {
        self.package_repo.delete(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => CatalogError::PackageNotFound,
            other => CatalogError::Internal(other.to_string()),
        })
    }

    async fn sell_package(
        &self,
        package_id: Uuid,
        client_id: Uuid,
    ) -> Result<PackageInstance, CatalogError> {
        let package = self
            .package_repo
            .find_by_id(package_id)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))?
            .ok_or(CatalogError::PackageNotFound)?;

        if !package.is_sellable() {
            return Err(CatalogError::NotSellable);
        }

        self.client_repo
            .find_by_id(client_id)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))?
            .ok_or(CatalogError::ClientNotFound)?;

        let purchase_date = CalendarDate::today();
        let expiry_date = CalendarDate::new(
            purchase_date.inner() + Duration::days(i64::from(package.validity_days)),
        );

        let instance = PackageInstance {
            id: Uuid::new_v4(),
            client_id,
            package_name: package.name.clone(),
            status: PackageInstanceStatus::Active,
            purchase_date,
            expiry_date: Some(expiry_date),
            services: package
                .items
                .iter()
                .map(|item| InstanceService {
                    service_id: item.service_id,
                    remaining_quantity: item.quantity,
                })
                .collect(),
        };

        tracing::info!(
            client_id = %client_id,
            package_id = %package_id,
            "Selling package instance"
        );

        self.client_repo
            .create_package_instance(&instance)
            .await
            .map_err(|e| CatalogError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::client::MockClientRepository;
    use crate::domain::entities::salon_package::MockPackageRepository;
    use crate::domain::entities::salon_service::MockServiceRepository;
    use crate::domain::entities::Client;
    use pretty_assertions::assert_eq;

    fn package(status: PackageStatus, items: Vec<PackageItem>, validity_days: i32) -> Package {
        let now = Utc::now();
        Package {
            id: Uuid::new_v4(),
            name: "Pacote Bronze".into(),
            short_description: None,
            price: "250,00".parse().unwrap(),
            original_price: None,
            validity_days,
            status,
            items,
            created_at: now,
            updated_at: now,
        }
    }

    fn client() -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            name: "Maria".into(),
            email: None,
            phone: None,
            stamps_earned: 0,
            mimos_redeemed: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn build(
        services: MockServiceRepository,
        packages: MockPackageRepository,
        clients: MockClientRepository,
    ) -> CatalogServiceImpl<MockServiceRepository, MockPackageRepository, MockClientRepository>
    {
        CatalogServiceImpl::new(Arc::new(services), Arc::new(packages), Arc::new(clients))
    }

    #[tokio::test]
    async fn test_sell_package_builds_full_counters_and_expiry() {
        let service_id = Uuid::new_v4();
        let sold = package(
            PackageStatus::Active,
            vec![PackageItem {
                service_id,
                quantity: 4,
            }],
            90,
        );
        let buyer = client();
        let buyer_id = buyer.id;

        let mut packages = MockPackageRepository::new();
        let found = sold.clone();
        packages
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut clients = MockClientRepository::new();
        clients
            .expect_find_by_id()
            .returning(move |_| Ok(Some(buyer.clone())));
        clients
            .expect_create_package_instance()
            .withf(move |i| {
                i.client_id == buyer_id
                    && i.status == PackageInstanceStatus::Active
                    && i.services.len() == 1
                    && i.services[0].remaining_quantity == 4
                    && i.expiry_date
                        == Some(CalendarDate::new(
                            CalendarDate::today().inner() + Duration::days(90),
                        ))
            })
            .times(1)
            .returning(|i| Ok(i.clone()));

        let instance = build(MockServiceRepository::new(), packages, clients)
            .sell_package(sold.id, buyer_id)
            .await
            .unwrap();
        assert_eq!(instance.package_name, "Pacote Bronze");
    }

    #[tokio::test]
    async fn test_selling_inactive_package_fails() {
        let sold = package(
            PackageStatus::Inactive,
            vec![PackageItem {
                service_id: Uuid::new_v4(),
                quantity: 2,
            }],
            30,
        );

        let mut packages = MockPackageRepository::new();
        let found = sold.clone();
        packages
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut clients = MockClientRepository::new();
        clients.expect_create_package_instance().times(0);

        let result = build(MockServiceRepository::new(), packages, clients)
            .sell_package(sold.id, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(CatalogError::NotSellable)));
    }

    #[tokio::test]
    async fn test_selling_to_unknown_client_fails() {
        let sold = package(
            PackageStatus::Active,
            vec![PackageItem {
                service_id: Uuid::new_v4(),
                quantity: 2,
            }],
            30,
        );

        let mut packages = MockPackageRepository::new();
        let found = sold.clone();
        packages
            .expect_find_by_id()
            .returning(move |_| Ok(Some(found.clone())));

        let mut clients = MockClientRepository::new();
        clients.expect_find_by_id().returning(|_| Ok(None));
        clients.expect_create_package_instance().times(0);

        let result = build(MockServiceRepository::new(), packages, clients)
            .sell_package(sold.id, Uuid::new_v4())
            .await;
        assert!(matches!(result, Err(CatalogError::ClientNotFound)));
    }

    #[tokio::test]
    async fn test_package_referencing_unknown_service_is_rejected() {
        let mut services = MockServiceRepository::new();
        services.expect_find_by_ids().returning(|_| Ok(vec![]));

        let mut packages = MockPackageRepository::new();
        packages.expect_create().times(0);

        let result = build(services, packages, MockClientRepository::new())
            .create_package(UpsertPackageDto {
                name: "Pacote".into(),
                short_description: None,
                price: "100,00".parse().unwrap(),
                original_price: None,
                validity_days: 30,
                status: PackageStatus::Active,
                items: vec![PackageItem {
                    service_id: Uuid::new_v4(),
                    quantity: 1,
                }],
            })
            .await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }

    #[tokio::test]
    async fn test_service_with_nonpositive_duration_is_rejected() {
        let result = build(
            MockServiceRepository::new(),
            MockPackageRepository::new(),
            MockClientRepository::new(),
        )
        .create_service(UpsertServiceDto {
            name: "Corte".into(),
            price: "50,00".parse().unwrap(),
            duration_minutes: 0,
            category: None,
        })
        .await;
        assert!(matches!(result, Err(CatalogError::Validation(_))));
    }
}
