//! Salon configuration singleton and repository trait.
//!
//! Maps to the single-row `salon_settings` table. Opening hours drive the
//! scheduling grid; the remaining fields feed the client portal and
//! WhatsApp booking links.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::TimeOfDay;
use crate::shared::error::AppError;

/// Opening hours for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayOpeningHours {
    pub open: bool,

    /// First bookable time, e.g. "09:00"
    pub start: TimeOfDay,

    /// Closing time; the last slot starts 30 minutes before it
    pub end: TimeOfDay,
}

impl DayOpeningHours {
    fn at_hours(open: bool, start_hour: u32, end_hour: u32) -> Self {
        let fallback = TimeOfDay::new(chrono::NaiveTime::MIN);
        Self {
            open,
            start: TimeOfDay::from_hm(start_hour, 0).unwrap_or(fallback),
            end: TimeOfDay::from_hm(end_hour, 0).unwrap_or(fallback),
        }
    }
}

/// Salon-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalonSettings {
    /// Keyed by lowercase English day name ("monday" .. "sunday")
    pub opening_hours: BTreeMap<String, DayOpeningHours>,

    pub operator_name: String,

    pub salon_name: String,

    pub salon_tagline: String,

    pub salon_logo_url: String,

    pub salon_address: String,

    pub salon_phone: String,

    pub whatsapp_scheduling_message: String,

    pub client_portal_title: String,

    pub client_portal_description: String,
}

impl SalonSettings {
    /// Hours for one weekday, if configured.
    pub fn hours_for(&self, day_key: &str) -> Option<&DayOpeningHours> {
        self.opening_hours.get(day_key)
    }
}

impl Default for SalonSettings {
    fn default() -> Self {
        let mut opening_hours = BTreeMap::new();
        for day in ["monday", "tuesday", "wednesday", "thursday"] {
            opening_hours.insert(day.to_string(), DayOpeningHours::at_hours(true, 9, 18));
        }
        opening_hours.insert("friday".to_string(), DayOpeningHours::at_hours(true, 9, 20));
        opening_hours.insert(
            "saturday".to_string(),
            DayOpeningHours::at_hours(true, 8, 17),
        );
        opening_hours.insert("sunday".to_string(), DayOpeningHours::at_hours(false, 9, 18));

        Self {
            opening_hours,
            operator_name: "Equipe".into(),
            salon_name: "Espaço Beleza".into(),
            salon_tagline: "Realçando sua beleza natural".into(),
            salon_logo_url: String::new(),
            salon_address: String::new(),
            salon_phone: String::new(),
            whatsapp_scheduling_message: "Olá! Gostaria de agendar um horário.".into(),
            client_portal_title: "Portal do Cliente".into(),
            client_portal_description: "Acompanhe seus pacotes e fidelidade.".into(),
        }
    }
}

/// Repository trait for the settings singleton.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Load the singleton row, if it has been seeded.
    async fn get(&self) -> Result<Option<SalonSettings>, AppError>;

    /// Insert or replace the singleton row.
    async fn upsert(&self, settings: &SalonSettings) -> Result<SalonSettings, AppError>;
}
