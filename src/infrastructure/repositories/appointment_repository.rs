//! Appointment Repository Implementation
//!
//! PostgreSQL implementation of the AppointmentRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{Appointment, AppointmentRepository, AppointmentStatus};
use crate::domain::value_objects::{Amount, CalendarDate, TimeOfDay};
use crate::shared::error::AppError;

/// Database row representation matching the appointments table schema.
#[derive(Debug, sqlx::FromRow)]
struct AppointmentRow {
    id: Uuid,
    client_name: String,
    service_ids: Vec<Uuid>,
    professional_id: Uuid,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    status: String,
    total_amount: Decimal,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl AppointmentRow {
    /// Convert database row to domain Appointment entity.
    fn into_appointment(self) -> Appointment {
        Appointment {
            id: self.id,
            client_name: self.client_name,
            service_ids: self.service_ids,
            professional_id: self.professional_id,
            date: CalendarDate::new(self.date),
            start_time: TimeOfDay::new(self.start_time),
            end_time: TimeOfDay::new(self.end_time),
            status: AppointmentStatus::from_str(&self.status),
            total_amount: Amount::new(self.total_amount),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, client_name, service_ids, professional_id, date,
           start_time, end_time, status, total_amount, created_at, updated_at
    FROM appointments
"#;

/// PostgreSQL appointment repository implementation.
#[derive(Clone)]
pub struct PgAppointmentRepository {
    pool: PgPool,
}

impl PgAppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PgAppointmentRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Appointment>, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!("{} WHERE id = $1", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(AppointmentRow::into_appointment))
    }

    async fn find_all(&self) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "{} ORDER BY date, start_time",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(AppointmentRow::into_appointment)
            .collect())
    }

    async fn find_by_date(&self, date: CalendarDate) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "{} WHERE date = $1 ORDER BY start_time",
            SELECT_COLUMNS
        ))
        .bind(date.inner())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(AppointmentRow::into_appointment)
            .collect())
    }

    async fn find_by_date_and_professional(
        &self,
        date: CalendarDate,
        professional_id: Uuid,
    ) -> Result<Vec<Appointment>, AppError> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "{} WHERE date = $1 AND professional_id = $2 ORDER BY start_time",
            SELECT_COLUMNS
        ))
        .bind(date.inner())
        .bind(professional_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(AppointmentRow::into_appointment)
            .collect())
    }

    async fn create(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            INSERT INTO appointments
                (id, client_name, service_ids, professional_id, date,
                 start_time, end_time, status, total_amount)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id, client_name, service_ids, professional_id, date,
                      start_time, end_time, status, total_amount, created_at, updated_at
            "#,
        )
        .bind(appointment.id)
        .bind(&appointment.client_name)
        .bind(&appointment.service_ids)
        .bind(appointment.professional_id)
        .bind(appointment.date.inner())
        .bind(appointment.start_time.inner())
        .bind(appointment.end_time.inner())
        .bind(appointment.status.as_str())
        .bind(appointment.total_amount.inner())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_appointment())
    }

    async fn update(&self, appointment: &Appointment) -> Result<Appointment, AppError> {
        let row = sqlx::query_as::<_, AppointmentRow>(
            r#"
            UPDATE appointments
            SET client_name = $2, service_ids = $3, professional_id = $4,
                date = $5, start_time = $6, end_time = $7, status = $8,
                total_amount = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING id, client_name, service_ids, professional_id, date,
                      start_time, end_time, status, total_amount, created_at, updated_at
            "#,
        )
        .bind(appointment.id)
        .bind(&appointment.client_name)
        .bind(&appointment.service_ids)
        .bind(appointment.professional_id)
        .bind(appointment.date.inner())
        .bind(appointment.start_time.inner())
        .bind(appointment.end_time.inner())
        .bind(appointment.status.as_str())
        .bind(appointment.total_amount.inner())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Appointment not found".into()))?;

        Ok(row.into_appointment())
    }

    async fn update_status(&self, id: Uuid, status: AppointmentStatus) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE appointments SET status = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Appointment not found".into()));
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Appointment not found".into()));
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM appointments")
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
