//! Settings Service
//!
//! Reads and writes the salon configuration singleton through the
//! in-process cache.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::entities::{SalonSettings, SettingsRepository};
use crate::infrastructure::cache::SettingsCache;

/// Settings service trait.
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Current settings, seeding defaults on first access.
    async fn get(&self) -> Result<SalonSettings, SettingsError>;

    /// Persist new settings and refresh the cache.
    async fn update(&self, settings: SalonSettings) -> Result<SalonSettings, SettingsError>;
}

/// Settings service errors.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid settings: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

const ALL_DAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Settings service implementation.
pub struct SettingsServiceImpl<R>
where
    R: SettingsRepository,
{
    repo: Arc<R>,
    cache: SettingsCache,
}

impl<R> SettingsServiceImpl<R>
where
    R: SettingsRepository,
{
    pub fn new(repo: Arc<R>, cache: SettingsCache) -> Self {
        Self { repo, cache }
    }

    fn validate(settings: &SalonSettings) -> Result<(), SettingsError> {
        for day in ALL_DAYS {
            let Some(hours) = settings.opening_hours.get(day) else {
                return Err(SettingsError::Validation(format!(
                    "Missing opening hours for {}",
                    day
                )));
            };
            if hours.open && hours.end <= hours.start {
                return Err(SettingsError::Validation(format!(
                    "Closing time must be after opening time on {}",
                    day
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<R> SettingsService for SettingsServiceImpl<R>
where
    R: SettingsRepository + 'static,
{
    async fn get(&self) -> Result<SalonSettings, SettingsError> {
        self.cache
            .get_or_seed(self.repo.as_ref())
            .await
            .map_err(|e| SettingsError::Internal(e.to_string()))
    }

    async fn update(&self, settings: SalonSettings) -> Result<SalonSettings, SettingsError> {
        Self::validate(&settings)?;

        let saved = self
            .repo
            .upsert(&settings)
            .await
            .map_err(|e| SettingsError::Internal(e.to_string()))?;
        self.cache.refresh(saved.clone()).await;
        tracing::info!("Salon settings updated");

        Ok(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::salon_settings::MockSettingsRepository;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_get_seeds_defaults_on_first_read() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_get().returning(|| Ok(None));
        repo.expect_upsert().times(1).returning(|s| Ok(s.clone()));

        let service = SettingsServiceImpl::new(Arc::new(repo), SettingsCache::new());
        let settings = service.get().await.unwrap();
        assert_eq!(settings, SalonSettings::default());
    }

    #[tokio::test]
    async fn test_update_persists_and_serves_new_value() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_upsert().times(1).returning(|s| Ok(s.clone()));
        // cache is warm after update, so get never hits the repository
        repo.expect_get().times(0);

        let service = SettingsServiceImpl::new(Arc::new(repo), SettingsCache::new());
        let mut updated = SalonSettings::default();
        updated.salon_name = "Studio Laura".into();
        service.update(updated).await.unwrap();

        let settings = service.get().await.unwrap();
        assert_eq!(settings.salon_name, "Studio Laura");
    }

    #[tokio::test]
    async fn test_update_rejects_inverted_hours() {
        let service = SettingsServiceImpl::new(
            Arc::new(MockSettingsRepository::new()),
            SettingsCache::new(),
        );
        let mut settings = SalonSettings::default();
        if let Some(monday) = settings.opening_hours.get_mut("monday") {
            monday.start = "18:00".parse().unwrap();
            monday.end = "09:00".parse().unwrap();
        }
        let result = service.update(settings).await;
        assert!(matches!(result, Err(SettingsError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_rejects_missing_day() {
        let service = SettingsServiceImpl::new(
            Arc::new(MockSettingsRepository::new()),
            SettingsCache::new(),
        );
        let mut settings = SalonSettings::default();
        settings.opening_hours.remove("wednesday");
        let result = service.update(settings).await;
        assert!(matches!(result, Err(SettingsError::Validation(_))));
    }
}
