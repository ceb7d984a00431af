//! Professional Service
//!
//! CRUD for the salon's staff roster.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::entities::{Professional, ProfessionalRepository};

/// Professional service trait.
#[async_trait]
pub trait ProfessionalService: Send + Sync {
    async fn create(
        &self,
        request: UpsertProfessionalDto,
    ) -> Result<Professional, ProfessionalError>;

    async fn list(&self) -> Result<Vec<Professional>, ProfessionalError>;

    async fn update(
        &self,
        id: Uuid,
        request: UpsertProfessionalDto,
    ) -> Result<Professional, ProfessionalError>;

    async fn delete(&self, id: Uuid) -> Result<(), ProfessionalError>;
}

/// Request DTO for creating or updating a professional.
#[derive(Debug, Clone)]
pub struct UpsertProfessionalDto {
    pub name: String,
    pub specialty: Option<String>,
    pub commission_rate: Option<Decimal>,
}

/// Professional service errors.
#[derive(Debug, thiserror::Error)]
pub enum ProfessionalError {
    #[error("Professional not found")]
    NotFound,

    #[error("Invalid professional: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Professional service implementation.
pub struct ProfessionalServiceImpl<P>
where
    P: ProfessionalRepository,
{
    professional_repo: Arc<P>,
}

impl<P> ProfessionalServiceImpl<P>
where
    P: ProfessionalRepository,
{
    pub fn new(professional_repo: Arc<P>) -> Self {
        Self { professional_repo }
    }

    fn validate(request: &UpsertProfessionalDto) -> Result<(), ProfessionalError> {
        if request.name.trim().is_empty() {
            return Err(ProfessionalError::Validation(
                "Name must not be empty".into(),
            ));
        }
        if let Some(rate) = request.commission_rate {
            if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
                return Err(ProfessionalError::Validation(
                    "Commission rate must be between 0 and 100".into(),
                ));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<P> ProfessionalService for ProfessionalServiceImpl<P>
where
    P: ProfessionalRepository + 'static,
{
    async fn create(
        &self,
        request: UpsertProfessionalDto,
    ) -> Result<Professional, ProfessionalError> {
        Self::validate(&request)?;

        let now = Utc::now();
        let professional = Professional {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            specialty: request.specialty,
            commission_rate: request.commission_rate,
            created_at: now,
            updated_at: now,
        };

        self.professional_repo
            .create(&professional)
            .await
            .map_err(|e| ProfessionalError::Internal(e.to_string()))
    }

    async fn list(&self) -> Result<Vec<Professional>, ProfessionalError> {
        self.professional_repo
            .find_all()
            .await
            .map_err(|e| ProfessionalError::Internal(e.to_string()))
    }

    async fn update(
        &self,
        id: Uuid,
        request: UpsertProfessionalDto,
    ) -> Result<Professional, ProfessionalError> {
        Self::validate(&request)?;

        let mut professional = self
            .professional_repo
            .find_by_id(id)
            .await
            .map_err(|e| ProfessionalError::Internal(e.to_string()))?
            .ok_or(ProfessionalError::NotFound)?;

        professional.name = request.name.trim().to_string();
        professional.specialty = request.specialty;
        professional.commission_rate = request.commission_rate;
        professional.updated_at = Utc::now();

        self.professional_repo
            .update(&professional)
            .await
            .map_err(|e| ProfessionalError::Internal(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), ProfessionalError> {
        self.professional_repo
            .delete(id)
            .await
            .map_err(|e| match e {
                crate::shared::error::AppError::NotFound(_) => ProfessionalError::NotFound,
                other => ProfessionalError::Internal(other.to_string()),
            })
    }
}
