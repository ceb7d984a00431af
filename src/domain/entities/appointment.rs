//! Appointment entity and repository trait.
//!
//! Maps to the `appointments` table in the database schema.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Amount, CalendarDate, TimeOfDay};
use crate::shared::error::AppError;

/// Appointment lifecycle states stored as `appointments.status`.
///
/// `Completed` is the terminal state that triggers the completion
/// workflow (package debits, loyalty stamp, revenue posting).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked but not yet confirmed by the client
    #[default]
    Scheduled,
    /// Confirmed by the client
    Confirmed,
    /// Service delivered; side effects have been applied
    Completed,
    /// Cancelled before delivery
    Cancelled,
}

impl AppointmentStatus {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "scheduled" => Self::Scheduled,
            "confirmed" => Self::Confirmed,
            "completed" => Self::Completed,
            "cancelled" => Self::Cancelled,
            _ => Self::Scheduled,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether the appointment still occupies its slot on the grid.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A booked appointment.
///
/// The client is referenced by display name rather than by ID: walk-ins
/// may not have a client record yet, and the completion workflow resolves
/// the record by normalized name at completion time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,

    /// Client display name as entered at booking time
    pub client_name: String,

    /// Services booked for this appointment
    pub service_ids: Vec<Uuid>,

    /// Professional assigned to deliver the services
    pub professional_id: Uuid,

    pub date: CalendarDate,

    pub start_time: TimeOfDay,

    pub end_time: TimeOfDay,

    pub status: AppointmentStatus,

    /// Total charged for the appointment
    pub total_amount: Amount,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Appointment {
    /// Whether the appointment is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            AppointmentStatus::Completed | AppointmentStatus::Cancelled
        )
    }

    /// Client name normalized for record matching: trimmed and lowercased.
    pub fn normalized_client_name(&self) -> String {
        self.client_name.trim().to_lowercase()
    }
}

/// Repository trait for Appointment data access operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError>;

    /// Every appointment, ordered by date and start time.
    async fn find_all(&self) -> Result<Vec<Appointment>, AppError>;

    /// All appointments on a given date, ordered by start time.
    async fn find_by_date(&self, date: CalendarDate) -> Result<Vec<Appointment>, AppError>;

    /// Appointments for one professional on a given date.
    async fn find_by_date_and_professional(
        &self,
        date: CalendarDate,
        professional_id: Uuid,
    ) -> Result<Vec<Appointment>, AppError>;

    async fn create(&self, appointment: &Appointment) -> Result<Appointment, AppError>;

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppError>;

    /// Update only the status column.
    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<(), AppError>;

    async fn delete(&self, id: Uuid) -> Result<(), AppError>;

    /// Delete every appointment. Returns the number of rows removed.
    async fn delete_all(&self) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Appointment {
        let now = Utc::now();
        Appointment {
            id: Uuid::new_v4(),
            client_name: "  Maria Silva ".into(),
            service_ids: vec![Uuid::new_v4()],
            professional_id: Uuid::new_v4(),
            date: "2026-04-10".parse().unwrap(),
            start_time: "10:00".parse().unwrap(),
            end_time: "11:00".parse().unwrap(),
            status: AppointmentStatus::Scheduled,
            total_amount: "150,00".parse().unwrap(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_status_round_trips_through_strings() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed,
            AppointmentStatus::Completed,
            AppointmentStatus::Cancelled,
        ] {
            assert_eq!(AppointmentStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn test_status_from_str_unknown_defaults_to_scheduled() {
        assert_eq!(
            AppointmentStatus::from_str("no-show"),
            AppointmentStatus::Scheduled
        );
    }

    #[test]
    fn test_cancelled_does_not_occupy_slot() {
        assert!(!AppointmentStatus::Cancelled.occupies_slot());
        assert!(AppointmentStatus::Scheduled.occupies_slot());
        assert!(AppointmentStatus::Completed.occupies_slot());
    }

    #[test]
    fn test_terminal_states() {
        let mut appointment = sample();
        assert!(!appointment.is_terminal());
        appointment.status = AppointmentStatus::Completed;
        assert!(appointment.is_terminal());
        appointment.status = AppointmentStatus::Cancelled;
        assert!(appointment.is_terminal());
    }

    #[test]
    fn test_normalized_client_name_trims_and_lowercases() {
        let appointment = sample();
        assert_eq!(appointment.normalized_client_name(), "maria silva");
    }
}
