//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;
use uuid::Uuid;

use crate::application::services::{CompletionOutcome, CoverageAdvisory, StatusUpdateDto};
use crate::domain::entities::{Appointment, FinancialTransaction};
use crate::domain::services::GridSlot;
use crate::domain::value_objects::CalendarDate;

/// Appointment response
#[derive(Debug, Serialize)]
pub struct AppointmentResponse {
    pub id: Uuid,
    pub client_name: String,
    pub service_ids: Vec<Uuid>,
    pub professional_id: Uuid,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub status: String,
    pub total_amount: String,
    pub created_at: String,
}

impl From<Appointment> for AppointmentResponse {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            client_name: appointment.client_name,
            service_ids: appointment.service_ids,
            professional_id: appointment.professional_id,
            date: appointment.date.to_string(),
            start_time: appointment.start_time.to_string(),
            end_time: appointment.end_time.to_string(),
            status: appointment.status.as_str().to_string(),
            total_amount: appointment.total_amount.to_string(),
            created_at: appointment.created_at.to_rfc3339(),
        }
    }
}

/// Status change response, carrying the completion outcome when one ran
#[derive(Debug, Serialize)]
pub struct StatusUpdateResponse {
    pub appointment: AppointmentResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionOutcome>,
}

impl From<StatusUpdateDto> for StatusUpdateResponse {
    fn from(dto: StatusUpdateDto) -> Self {
        Self {
            appointment: dto.appointment.into(),
            completion: dto.completion,
        }
    }
}

/// One professional's classified day grid
#[derive(Debug, Serialize)]
pub struct DayGridResponse {
    pub date: String,
    pub professional_id: Uuid,
    pub slots: Vec<GridSlot>,
}

impl DayGridResponse {
    pub fn new(date: CalendarDate, professional_id: Uuid, slots: Vec<GridSlot>) -> Self {
        Self {
            date: date.to_string(),
            professional_id,
            slots,
        }
    }
}

/// Package-coverage advisories for an appointment being composed
#[derive(Debug, Serialize)]
pub struct AdvisoryResponse {
    pub advisories: Vec<CoverageAdvisory>,
}

/// Ledger entry response
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub description: String,
    pub amount: String,
    pub date: String,
    pub category: String,
    pub kind: String,
    pub created_at: String,
}

impl From<FinancialTransaction> for TransactionResponse {
    fn from(transaction: FinancialTransaction) -> Self {
        Self {
            id: transaction.id,
            description: transaction.description,
            amount: transaction.amount.to_string(),
            date: transaction.date.to_string(),
            category: transaction.category,
            kind: transaction.kind.as_str().to_string(),
            created_at: transaction.created_at.to_rfc3339(),
        }
    }
}

/// Result of an administrative clear-all
#[derive(Debug, Serialize)]
pub struct DeletedCountResponse {
    pub success: bool,
    pub deleted_count: u64,
}

impl DeletedCountResponse {
    pub fn new(deleted_count: u64) -> Self {
        Self {
            success: true,
            deleted_count,
        }
    }
}
