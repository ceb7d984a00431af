//! Settings Repository Implementation
//!
//! PostgreSQL implementation of the SettingsRepository trait. The table
//! holds a single row; opening hours are stored as JSONB.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::entities::{DayOpeningHours, SalonSettings, SettingsRepository};
use crate::shared::error::AppError;

/// Database row representation matching the salon_settings table.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    opening_hours: serde_json::Value,
    operator_name: String,
    salon_name: String,
    salon_tagline: String,
    salon_logo_url: String,
    salon_address: String,
    salon_phone: String,
    whatsapp_scheduling_message: String,
    client_portal_title: String,
    client_portal_description: String,
}

impl SettingsRow {
    fn into_settings(self) -> Result<SalonSettings, AppError> {
        let opening_hours: std::collections::BTreeMap<String, DayOpeningHours> =
            serde_json::from_value(self.opening_hours)
                .map_err(|e| AppError::Internal(format!("Malformed opening hours: {}", e)))?;

        Ok(SalonSettings {
            opening_hours,
            operator_name: self.operator_name,
            salon_name: self.salon_name,
            salon_tagline: self.salon_tagline,
            salon_logo_url: self.salon_logo_url,
            salon_address: self.salon_address,
            salon_phone: self.salon_phone,
            whatsapp_scheduling_message: self.whatsapp_scheduling_message,
            client_portal_title: self.client_portal_title,
            client_portal_description: self.client_portal_description,
        })
    }
}

/// PostgreSQL settings repository implementation.
#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get(&self) -> Result<Option<SalonSettings>, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT opening_hours, operator_name, salon_name, salon_tagline,
                   salon_logo_url, salon_address, salon_phone,
                   whatsapp_scheduling_message, client_portal_title,
                   client_portal_description
            FROM salon_settings
            WHERE id = TRUE
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(SettingsRow::into_settings).transpose()
    }

    async fn upsert(&self, settings: &SalonSettings) -> Result<SalonSettings, AppError> {
        let opening_hours = serde_json::to_value(&settings.opening_hours)
            .map_err(|e| AppError::Internal(format!("Failed to encode opening hours: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO salon_settings
                (id, opening_hours, operator_name, salon_name, salon_tagline,
                 salon_logo_url, salon_address, salon_phone,
                 whatsapp_scheduling_message, client_portal_title,
                 client_portal_description)
            VALUES (TRUE, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                opening_hours = EXCLUDED.opening_hours,
                operator_name = EXCLUDED.operator_name,
                salon_name = EXCLUDED.salon_name,
                salon_tagline = EXCLUDED.salon_tagline,
                salon_logo_url = EXCLUDED.salon_logo_url,
                salon_address = EXCLUDED.salon_address,
                salon_phone = EXCLUDED.salon_phone,
                whatsapp_scheduling_message = EXCLUDED.whatsapp_scheduling_message,
                client_portal_title = EXCLUDED.client_portal_title,
                client_portal_description = EXCLUDED.client_portal_description,
                updated_at = NOW()
            "#,
        )
        .bind(opening_hours)
        .bind(&settings.operator_name)
        .bind(&settings.salon_name)
        .bind(&settings.salon_tagline)
        .bind(&settings.salon_logo_url)
        .bind(&settings.salon_address)
        .bind(&settings.salon_phone)
        .bind(&settings.whatsapp_scheduling_message)
        .bind(&settings.client_portal_title)
        .bind(&settings.client_portal_description)
        .execute(&self.pool)
        .await?;

        Ok(settings.clone())
    }
}
