//! Client Service
//!
//! Client CRUD, the loyalty card summary and mimo redemption.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::entities::{
    Client, ClientRepository, PackageInstance, CARD_CAPACITY, STAMPS_PER_HEART,
};

/// Client service trait defining client operations.
#[async_trait]
pub trait ClientService: Send + Sync {
    async fn create(&self, request: UpsertClientDto) -> Result<Client, ClientError>;

    async fn get(&self, id: Uuid) -> Result<Client, ClientError>;

    async fn list(&self) -> Result<Vec<Client>, ClientError>;

    async fn update(&self, id: Uuid, request: UpsertClientDto) -> Result<Client, ClientError>;

    async fn delete(&self, id: Uuid) -> Result<(), ClientError>;

    /// Loyalty card state plus the client's package instances.
    async fn loyalty_summary(&self, id: Uuid) -> Result<LoyaltySummaryDto, ClientError>;

    /// Spend one available mimo.
    async fn redeem_mimo(&self, id: Uuid) -> Result<LoyaltySummaryDto, ClientError>;
}

/// Request DTO for creating or updating a client.
#[derive(Debug, Clone)]
pub struct UpsertClientDto {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Loyalty card summary.
#[derive(Debug, Clone, Serialize)]
pub struct LoyaltySummaryDto {
    pub client_id: Uuid,
    pub stamps_earned: i32,
    pub card_capacity: u32,
    pub hearts_earned: u32,
    pub mimos_earned: u32,
    pub mimos_redeemed: i32,
    pub mimos_available: u32,
    /// Stamps toward the next heart
    pub stamps_toward_next_heart: u32,
    pub packages: Vec<PackageInstance>,
}

impl LoyaltySummaryDto {
    fn from_client(client: &Client, packages: Vec<PackageInstance>) -> Self {
        let stamps = client.stamps_earned.max(0) as u32;
        Self {
            client_id: client.id,
            stamps_earned: client.stamps_earned,
            card_capacity: CARD_CAPACITY,
            hearts_earned: client.hearts_earned(),
            mimos_earned: client.mimos_earned(),
            mimos_redeemed: client.mimos_redeemed,
            mimos_available: client.mimos_available(),
            stamps_toward_next_heart: stamps % STAMPS_PER_HEART,
            packages,
        }
    }
}

/// Client service errors.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Client not found")]
    NotFound,

    #[error("Client name already in use")]
    DuplicateName,

    #[error("No mimo available to redeem")]
    NoMimoAvailable,

    #[error("Invalid client: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Client service implementation.
pub struct ClientServiceImpl<C>
where
    C: ClientRepository,
{
    client_repo: Arc<C>,
}

impl<C> ClientServiceImpl<C>
where
    C: ClientRepository,
{
    pub fn new(client_repo: Arc<C>) -> Self {
        Self { client_repo }
    }

    /// Completion matches bookings to clients by normalized name, so two
    /// records with the same normalized name would be ambiguous.
    async fn ensure_name_free(
        &self,
        name: &str,
        exclude: Option<Uuid>,
    ) -> Result<(), ClientError> {
        let normalized = name.trim().to_lowercase();
        let existing = self
            .client_repo
            .find_by_normalized_name(&normalized)
            .await
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        match existing {
            Some(client) if Some(client.id) != exclude => Err(ClientError::DuplicateName),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<C> ClientService for ClientServiceImpl<C>
where
    C: ClientRepository + 'static,
{
    async fn create(&self, request: UpsertClientDto) -> Result<Client, ClientError> {
        if request.name.trim().is_empty() {
            return Err(ClientError::Validation("Name must not be empty".into()));
        }
        self.ensure_name_free(&request.name, None).await?;

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: request.email,
            phone: request.phone,
            stamps_earned: 0,
            mimos_redeemed: 0,
            created_at: now,
            updated_at: now,
        };

        self.client_repo
            .create(&client)
            .await
            .map_err(|e| ClientError::Internal(e.to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Client, ClientError> {
        self.client_repo
            .find_by_id(id)
            .await
            .map_err(|e| ClientError::Internal(e.to_string()))?
            .ok_or(ClientError::NotFound)
    }

    async fn list(&self) -> Result<Vec<Client>, ClientError> {
        self.client_repo
            .find_all()
            .await
            .map_err(|e| ClientError::Internal(e.to_string()))
    }

    async fn update(&self, id: Uuid, request: UpsertClientDto) -> Result<Client, ClientError> {
        if request.name.trim().is_empty() {
            return Err(ClientError::Validation("Name must not be empty".into()));
        }
        let mut client = self.get(id).await?;
        self.ensure_name_free(&request.name, Some(id)).await?;

        client.name = request.name.trim().to_string();
        client.email = request.email;
        client.phone = request.phone;
        client.updated_at = Utc::now();

        self.client_repo
            .update(&client)
            .await
            .map_err(|e| ClientError::Internal(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.client_repo.delete(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => ClientError::NotFound,
            other => ClientError::Internal(other.to_string()),
        })
    }

    async fn loyalty_summary(&self, id: Uuid) -> Result<LoyaltySummaryDto, ClientError> {
        let client = self.get(id).await?;
        let packages = self
            .client_repo
            .find_package_instances(id)
            .await
            .map_err(|e| ClientError::Internal(e.to_string()))?;

        Ok(LoyaltySummaryDto::from_client(&client, packages))
    }

    async fn redeem_mimo(&self, id: Uuid) -> Result<LoyaltySummaryDto, ClientError> {
        let client = self.get(id).await?;
        if client.mimos_available() == 0 {
            return Err(ClientError::NoMimoAvailable);
        }

        self.client_repo
            .increment_mimos_redeemed(id)
            .await
            .map_err(|e| ClientError::Internal(e.to_string()))?;
        tracing::info!(client_id = %id, "Mimo redeemed");

        self.loyalty_summary(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::client::MockClientRepository;
    use pretty_assertions::assert_eq;

    fn client(stamps: i32, redeemed: i32) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            name: "Maria".into(),
            email: None,
            phone: None,
            stamps_earned: stamps,
            mimos_redeemed: redeemed,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_trims_name_and_rejects_duplicates() {
        let mut repo = MockClientRepository::new();
        repo.expect_find_by_normalized_name()
            .withf(|name| name == "maria")
            .returning(|_| Ok(None));
        repo.expect_create()
            .withf(|c| c.name == "Maria")
            .returning(|c| Ok(c.clone()));

        let service = ClientServiceImpl::new(Arc::new(repo));
        let created = service
            .create(UpsertClientDto {
                name: "  Maria ".into(),
                email: None,
                phone: None,
            })
            .await
            .unwrap();
        assert_eq!(created.name, "Maria");
        assert_eq!(created.stamps_earned, 0);
    }

    #[tokio::test]
    async fn test_create_duplicate_name_conflicts() {
        let existing = client(0, 0);
        let mut repo = MockClientRepository::new();
        repo.expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create().times(0);

        let service = ClientServiceImpl::new(Arc::new(repo));
        let result = service
            .create(UpsertClientDto {
                name: "maria".into(),
                email: None,
                phone: None,
            })
            .await;
        assert!(matches!(result, Err(ClientError::DuplicateName)));
    }

    #[tokio::test]
    async fn test_update_allows_own_name() {
        let existing = client(3, 0);
        let id = existing.id;
        let mut repo = MockClientRepository::new();
        let by_id = existing.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(by_id.clone())));
        let by_name = existing.clone();
        repo.expect_find_by_normalized_name()
            .returning(move |_| Ok(Some(by_name.clone())));
        repo.expect_update().returning(|c| Ok(c.clone()));

        let service = ClientServiceImpl::new(Arc::new(repo));
        let result = service
            .update(
                id,
                UpsertClientDto {
                    name: "Maria".into(),
                    email: Some("maria@example.com".into()),
                    phone: None,
                },
            )
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_loyalty_summary_numbers() {
        let existing = client(7, 1);
        let mut repo = MockClientRepository::new();
        let by_id = existing.clone();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(by_id.clone())));
        repo.expect_find_package_instances().returning(|_| Ok(vec![]));

        let service = ClientServiceImpl::new(Arc::new(repo));
        let summary = service.loyalty_summary(existing.id).await.unwrap();

        assert_eq!(summary.hearts_earned, 2);
        assert_eq!(summary.mimos_earned, 2);
        assert_eq!(summary.mimos_available, 1);
        assert_eq!(summary.stamps_toward_next_heart, 1);
        assert_eq!(summary.card_capacity, 12);
    }

    #[tokio::test]
    async fn test_redeem_mimo_decrements_availability() {
        let existing = client(6, 0);
        let id = existing.id;
        let mut repo = MockClientRepository::new();
        let before = existing.clone();
        let mut after = existing.clone();
        after.mimos_redeemed = 1;
        let mut calls = 0;
        repo.expect_find_by_id().returning(move |_| {
            calls += 1;
            if calls == 1 {
                Ok(Some(before.clone()))
            } else {
                Ok(Some(after.clone()))
            }
        });
        repo.expect_increment_mimos_redeemed()
            .times(1)
            .returning(|_| Ok(()));
        repo.expect_find_package_instances().returning(|_| Ok(vec![]));

        let service = ClientServiceImpl::new(Arc::new(repo));
        let summary = service.redeem_mimo(id).await.unwrap();
        assert_eq!(summary.mimos_available, 1);
    }

    #[tokio::test]
    async fn test_redeem_without_available_mimo_fails() {
        let existing = client(2, 0);
        let id = existing.id;
        let mut repo = MockClientRepository::new();
        repo.expect_find_by_id()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_increment_mimos_redeemed().times(0);

        let service = ClientServiceImpl::new(Arc::new(repo));
        let result = service.redeem_mimo(id).await;
        assert!(matches!(result, Err(ClientError::NoMimoAvailable)));
    }
}
