//! Appointment Service
//!
//! Booking CRUD, the day grid, package-coverage advisories and the
//! status transition that triggers the completion workflow.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::completion::{CompletionOutcome, CompletionService};
use crate::domain::entities::{
    Appointment, AppointmentRepository, AppointmentStatus, ClientRepository, PackageRepository,
    ProfessionalRepository, SalonSettings,
};
use crate::domain::services::{GridSlot, SlotGrid};
use crate::domain::value_objects::{Amount, CalendarDate, TimeOfDay};

/// Appointment service trait defining booking operations.
#[async_trait]
pub trait AppointmentService: Send + Sync {
    /// Book a new appointment on an open slot.
    async fn create(
        &self,
        request: CreateAppointmentDto,
        settings: &SalonSettings,
    ) -> Result<Appointment, AppointmentError>;

    async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError>;

    /// List appointments, optionally narrowed to a date and professional.
    async fn list(
        &self,
        date: Option<CalendarDate>,
        professional_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppointmentError>;

    /// Rewrite an appointment's booking fields.
    async fn update(
        &self,
        id: Uuid,
        request: CreateAppointmentDto,
        settings: &SalonSettings,
    ) -> Result<Appointment, AppointmentError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppointmentError>;

    /// Change the status. Transitioning into Completed runs the
    /// completion workflow and returns its outcome.
    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<StatusUpdateDto, AppointmentError>;

    /// Classified 30-minute grid for one professional's day.
    async fn day_grid(
        &self,
        date: CalendarDate,
        professional_id: Uuid,
        settings: &SalonSettings,
    ) -> Result<Vec<GridSlot>, AppointmentError>;

    /// Full-price warnings for services not covered by the named
    /// client's packages. Unknown client means no advisories.
    async fn coverage_advisories(
        &self,
        client_name: &str,
        service_ids: &[Uuid],
    ) -> Result<Vec<CoverageAdvisory>, AppointmentError>;
}

/// Request DTO for creating or rewriting an appointment.
#[derive(Debug, Clone)]
pub struct CreateAppointmentDto {
    pub client_name: String,
    pub service_ids: Vec<Uuid>,
    pub professional_id: Uuid,
    pub date: CalendarDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub total_amount: Amount,
}

/// Result of a status change.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateDto {
    pub appointment: Appointment,
    /// Present only when the change ran the completion workflow
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionOutcome>,
}

/// One full-price warning for a service without package coverage.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CoverageAdvisory {
    pub service_id: Uuid,
    /// Name of a catalog package that sells this service
    pub offered_in_package: String,
}

/// Appointment service errors.
#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Professional not found")]
    ProfessionalNotFound,

    #[error("Requested time is not available: {0}")]
    SlotUnavailable(String),

    #[error("Invalid booking: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Appointment service implementation.
pub struct AppointmentServiceImpl<A, P, C, K, W>
where
    A: AppointmentRepository,
    P: ProfessionalRepository,
    C: ClientRepository,
    K: PackageRepository,
    W: CompletionService,
{
    appointment_repo: Arc<A>,
    professional_repo: Arc<P>,
    client_repo: Arc<C>,
    package_repo: Arc<K>,
    completion: Arc<W>,
}

impl<A, P, C, K, W> AppointmentServiceImpl<A, P, C, K, W>
where
    A: AppointmentRepository,
    P: ProfessionalRepository,
    C: ClientRepository,
    K: PackageRepository,
    W: CompletionService,
{
    pub fn new(
        appointment_repo: Arc<A>,
        professional_repo: Arc<P>,
        client_repo: Arc<C>,
        package_repo: Arc<K>,
        completion: Arc<W>,
    ) -> Self {
        Self {
            appointment_repo,
            professional_repo,
            client_repo,
            package_repo,
            completion,
        }
    }

    fn validate_booking(request: &CreateAppointmentDto) -> Result<(), AppointmentError> {
        if request.client_name.trim().is_empty() {
            return Err(AppointmentError::Validation(
                "Client name must not be empty".into(),
            ));
        }
        if request.end_time <= request.start_time {
            return Err(AppointmentError::Validation(
                "End time must be after start time".into(),
            ));
        }
        Ok(())
    }

    /// Check that every slot in the requested span is open, ignoring
    /// `exclude` (the appointment being rewritten).
    async fn ensure_span_open(
        &self,
        request: &CreateAppointmentDto,
        settings: &SalonSettings,
        exclude: Option<Uuid>,
    ) -> Result<(), AppointmentError> {
        let existing: Vec<Appointment> = self
            .appointment_repo
            .find_by_date_and_professional(request.date, request.professional_id)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?
            .into_iter()
            .filter(|a| Some(a.id) != exclude)
            .collect();

        let grid = SlotGrid::from_settings(settings);
        let slots = grid.classify_day(settings, request.date, &existing, Utc::now());

        let Some(start_index) = grid.index_of(request.start_time) else {
            return Err(AppointmentError::SlotUnavailable(
                "Start time is outside the scheduling grid".into(),
            ));
        };

        // the span must end on the grid too, otherwise a booking running
        // past closing would have no slots left to be validated against
        let past_grid_end = grid
            .end_minutes()
            .map_or(true, |end| request.end_time.minutes_from_midnight() > end);
        if past_grid_end {
            return Err(AppointmentError::SlotUnavailable(
                "End time is outside the scheduling grid".into(),
            ));
        }

        for (index, slot) in slots.iter().enumerate().skip(start_index) {
            if slot.start >= request.end_time {
                break;
            }
            if index >= start_index && !slot.status.is_bookable() {
                return Err(AppointmentError::SlotUnavailable(format!(
                    "Slot {} is {:?}",
                    slot.start, slot.status
                )));
            }
        }
        Ok(())
    }

    async fn ensure_professional(&self, id: Uuid) -> Result<(), AppointmentError> {
        self.professional_repo
            .find_by_id(id)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?
            .ok_or(AppointmentError::ProfessionalNotFound)?;
        Ok(())
    }
}

#[async_trait]
impl<A, P, C, K, W> AppointmentService for AppointmentServiceImpl<A, P, C, K, W>
where
    A: AppointmentRepository + 'static,
    P: ProfessionalRepository + 'static,
    C: ClientRepository + 'static,
    K: PackageRepository + 'static,
    W: CompletionService + 'static,
{
    async fn create(
        &self,
        request: CreateAppointmentDto,
        settings: &SalonSettings,
    ) -> Result<Appointment, AppointmentError> {
        Self::validate_booking(&request)?;
        self.ensure_professional(request.professional_id).await?;
        self.ensure_span_open(&request, settings, None).await?;

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_name: request.client_name,
            service_ids: request.service_ids,
            professional_id: request.professional_id,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: AppointmentStatus::Scheduled,
            total_amount: request.total_amount,
            created_at: now,
            updated_at: now,
        };

        self.appointment_repo
            .create(&appointment)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))
    }

    async fn get(&self, id: Uuid) -> Result<Appointment, AppointmentError> {
        self.appointment_repo
            .find_by_id(id)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?
            .ok_or(AppointmentError::NotFound)
    }

    async fn list(
        &self,
        date: Option<CalendarDate>,
        professional_id: Option<Uuid>,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let result = match (date, professional_id) {
            (Some(date), Some(professional_id)) => {
                self.appointment_repo
                    .find_by_date_and_professional(date, professional_id)
                    .await
            }
            (Some(date), None) => self.appointment_repo.find_by_date(date).await,
            (None, _) => self.appointment_repo.find_all().await.map(|appointments| {
                match professional_id {
                    Some(id) => appointments
                        .into_iter()
                        .filter(|a| a.professional_id == id)
                        .collect(),
                    None => appointments,
                }
            }),
        };
        result.map_err(|e| AppointmentError::Internal(e.to_string()))
    }

    async fn update(
        &self,
        id: Uuid,
        request: CreateAppointmentDto,
        settings: &SalonSettings,
    ) -> Result<Appointment, AppointmentError> {
        Self::validate_booking(&request)?;
        let current = self.get(id).await?;
        self.ensure_professional(request.professional_id).await?;
        self.ensure_span_open(&request, settings, Some(id)).await?;

        let appointment = Appointment {
            id,
            client_name: request.client_name,
            service_ids: request.service_ids,
            professional_id: request.professional_id,
            date: request.date,
            start_time: request.start_time,
            end_time: request.end_time,
            status: current.status,
            total_amount: request.total_amount,
            created_at: current.created_at,
            updated_at: Utc::now(),
        };

        self.appointment_repo
            .update(&appointment)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppointmentError> {
        self.appointment_repo.delete(id).await.map_err(|e| match e {
            crate::shared::error::AppError::NotFound(_) => AppointmentError::NotFound,
            other => AppointmentError::Internal(other.to_string()),
        })
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> Result<StatusUpdateDto, AppointmentError> {
        let mut appointment = self.get(id).await?;
        let was_completed = appointment.status == AppointmentStatus::Completed;

        self.appointment_repo
            .update_status(id, status)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?;
        appointment.status = status;

        // completing an already-completed appointment must not debit twice
        let completion = if status == AppointmentStatus::Completed && !was_completed {
            tracing::info!(appointment_id = %id, "Running completion workflow");
            Some(self.completion.complete(&appointment).await)
        } else {
            None
        };

        Ok(StatusUpdateDto {
            appointment,
            completion,
        })
    }

    async fn day_grid(
        &self,
        date: CalendarDate,
        professional_id: Uuid,
        settings: &SalonSettings,
    ) -> Result<Vec<GridSlot>, AppointmentError> {
        self.ensure_professional(professional_id).await?;

        let appointments = self
            .appointment_repo
            .find_by_date_and_professional(date, professional_id)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?;

        let grid = SlotGrid::from_settings(settings);
        Ok(grid.classify_day(settings, date, &appointments, Utc::now()))
    }

    async fn coverage_advisories(
        &self,
        client_name: &str,
        service_ids: &[Uuid],
    ) -> Result<Vec<CoverageAdvisory>, AppointmentError> {
        let normalized = client_name.trim().to_lowercase();
        let Some(client) = self
            .client_repo
            .find_by_normalized_name(&normalized)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?
        else {
            return Ok(Vec::new());
        };

        let packages = self
            .package_repo
            .find_all()
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?;
        let instances = self
            .client_repo
            .find_package_instances(client.id)
            .await
            .map_err(|e| AppointmentError::Internal(e.to_string()))?;

        let today = CalendarDate::today();
        let mut advisories = Vec::new();

        for &service_id in service_ids {
            let offered_in = packages
                .iter()
                .filter(|p| p.is_sellable())
                .find(|p| p.items.iter().any(|i| i.service_id == service_id));
            let Some(package) = offered_in else {
                continue;
            };

            let covered = instances.iter().any(|i| i.covers(service_id, today));
            if !covered {
                advisories.push(CoverageAdvisory {
                    service_id,
                    offered_in_package: package.name.clone(),
                });
            }
        }

        Ok(advisories)
    }
}
