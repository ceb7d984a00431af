//! Appointment Handlers
//!
//! HTTP handlers for the agenda: booking CRUD, the day grid, coverage
//! advisories and status changes.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::application::dto::request::{
    AdvisoryQuery, AgendaQuery, CreateAppointmentRequest, GridQuery, UpdateStatusRequest,
};
use crate::application::dto::response::{
    AdvisoryResponse, AppointmentResponse, DayGridResponse, StatusUpdateResponse,
};
use crate::application::services::{
    AppointmentError, AppointmentService, AppointmentServiceImpl, CompletionServiceImpl,
    CreateAppointmentDto,
};
use crate::domain::entities::SalonSettings;
use crate::infrastructure::repositories::{
    PgAppointmentRepository, PgClientRepository, PgPackageRepository, PgProfessionalRepository,
    PgServiceRepository, PgSettingsRepository, PgTransactionRepository,
};
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

type PgAppointmentService = AppointmentServiceImpl<
    PgAppointmentRepository,
    PgProfessionalRepository,
    PgClientRepository,
    PgPackageRepository,
    CompletionServiceImpl<PgClientRepository, PgServiceRepository, PgTransactionRepository>,
>;

/// Helper to convert AppointmentError to AppError
fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".into()),
        AppointmentError::ProfessionalNotFound => {
            AppError::NotFound("Professional not found".into())
        }
        AppointmentError::SlotUnavailable(msg) => AppError::Conflict(msg),
        AppointmentError::Validation(msg) => AppError::BadRequest(msg),
        AppointmentError::Internal(msg) => AppError::Internal(msg),
    }
}

fn build_service(state: &AppState) -> PgAppointmentService {
    let client_repo = Arc::new(PgClientRepository::new(state.db.clone()));
    let completion = Arc::new(CompletionServiceImpl::new(
        client_repo.clone(),
        Arc::new(PgServiceRepository::new(state.db.clone())),
        Arc::new(PgTransactionRepository::new(state.db.clone())),
    ));

    AppointmentServiceImpl::new(
        Arc::new(PgAppointmentRepository::new(state.db.clone())),
        Arc::new(PgProfessionalRepository::new(state.db.clone())),
        client_repo,
        Arc::new(PgPackageRepository::new(state.db.clone())),
        completion,
    )
}

async fn load_settings(state: &AppState) -> Result<SalonSettings, AppError> {
    let repo = PgSettingsRepository::new(state.db.clone());
    state.settings_cache.get_or_seed(&repo).await
}

fn to_dto(body: CreateAppointmentRequest) -> CreateAppointmentDto {
    CreateAppointmentDto {
        client_name: body.client_name,
        service_ids: body.service_ids,
        professional_id: body.professional_id,
        date: body.date,
        start_time: body.start_time,
        end_time: body.end_time,
        total_amount: body.total_amount,
    }
}

/// Book an appointment
///
/// POST /api/v1/appointments
pub async fn create_appointment(
    State(state): State<AppState>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let settings = load_settings(&state).await?;
    let appointment = build_service(&state)
        .create(to_dto(body), &settings)
        .await
        .map_err(map_appointment_error)?;

    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// List appointments, optionally filtered by date and professional
///
/// GET /api/v1/appointments?date=YYYY-MM-DD&professional_id=...
pub async fn list_appointments(
    State(state): State<AppState>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    let appointments = build_service(&state)
        .list(query.date, query.professional_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(appointments.into_iter().map(Into::into).collect()))
}

/// Get a single appointment
///
/// GET /api/v1/appointments/{appointment_id}
pub async fn get_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<AppointmentResponse>, AppError> {
    let appointment = build_service(&state)
        .get(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(appointment.into()))
}

/// Rewrite an appointment's booking fields
///
/// PUT /api/v1/appointments/{appointment_id}
pub async fn update_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Json(body): Json<CreateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let settings = load_settings(&state).await?;
    let appointment = build_service(&state)
        .update(appointment_id, to_dto(body), &settings)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(appointment.into()))
}

/// Delete an appointment
///
/// DELETE /api/v1/appointments/{appointment_id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    build_service(&state)
        .delete(appointment_id)
        .await
        .map_err(map_appointment_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Change an appointment's status
///
/// PATCH /api/v1/appointments/{appointment_id}/status
///
/// Transitioning into `completed` runs the completion workflow; its
/// outcome is attached to the response.
pub async fn update_appointment_status(
    State(state): State<AppState>,
    Path(appointment_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<StatusUpdateResponse>, AppError> {
    let result = build_service(&state)
        .update_status(appointment_id, body.status)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(result.into()))
}

/// Classified day grid for one professional
///
/// GET /api/v1/appointments/day-grid?date=YYYY-MM-DD&professional_id=...
pub async fn day_grid(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<DayGridResponse>, AppError> {
    let settings = load_settings(&state).await?;
    let slots = build_service(&state)
        .day_grid(query.date, query.professional_id, &settings)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(DayGridResponse::new(
        query.date,
        query.professional_id,
        slots,
    )))
}

/// Package-coverage advisories for an appointment being composed
///
/// GET /api/v1/appointments/advisories?client_name=...&service_ids=a,b,c
pub async fn coverage_advisories(
    State(state): State<AppState>,
    Query(query): Query<AdvisoryQuery>,
) -> Result<Json<AdvisoryResponse>, AppError> {
    query.validate().map_err(validation_error)?;

    let service_ids = query
        .service_ids
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse::<Uuid>()
                .map_err(|_| AppError::BadRequest(format!("Invalid service ID: {}", s.trim())))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let advisories = build_service(&state)
        .coverage_advisories(&query.client_name, &service_ids)
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(AdvisoryResponse { advisories }))
}
