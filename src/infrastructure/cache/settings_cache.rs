//! In-process cache for the salon settings singleton.
//!
//! Settings are read on almost every request (the grid needs opening
//! hours) but change rarely, so they are kept behind an RwLock and
//! refreshed explicitly after updates.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::entities::{SalonSettings, SettingsRepository};
use crate::shared::error::AppError;

/// Cached copy of the settings singleton.
#[derive(Clone)]
pub struct SettingsCache {
    inner: Arc<RwLock<Option<SalonSettings>>>,
}

impl SettingsCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(None)),
        }
    }

    /// Return the cached settings, loading through `repo` on a miss.
    ///
    /// When the database has never been seeded, the defaults are written
    /// back so every later reader sees the same row.
    pub async fn get_or_seed(
        &self,
        repo: &dyn SettingsRepository,
    ) -> Result<SalonSettings, AppError> {
        if let Some(settings) = self.inner.read().await.clone() {
            return Ok(settings);
        }

        let settings = match repo.get().await? {
            Some(settings) => settings,
            None => {
                let defaults = SalonSettings::default();
                tracing::info!("Seeding salon settings with defaults");
                repo.upsert(&defaults).await?
            }
        };

        *self.inner.write().await = Some(settings.clone());
        Ok(settings)
    }

    /// Replace the cached copy after a successful update.
    pub async fn refresh(&self, settings: SalonSettings) {
        *self.inner.write().await = Some(settings);
    }

    /// Drop the cached copy; the next read goes to the database.
    pub async fn invalidate(&self) {
        *self.inner.write().await = None;
    }
}

impl Default for SettingsCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::salon_settings::MockSettingsRepository;

    #[tokio::test]
    async fn test_miss_seeds_defaults_once() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_get().times(1).returning(|| Ok(None));
        repo.expect_upsert()
            .times(1)
            .returning(|s| Ok(s.clone()));

        let cache = SettingsCache::new();
        let first = cache.get_or_seed(&repo).await.unwrap();
        assert_eq!(first, SalonSettings::default());

        // second read must come from the cache, not the repository
        let second = cache.get_or_seed(&repo).await.unwrap();
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn test_existing_row_is_not_reseeded() {
        let mut stored = SalonSettings::default();
        stored.salon_name = "Studio Glamour".into();
        let returned = stored.clone();

        let mut repo = MockSettingsRepository::new();
        repo.expect_get()
            .times(1)
            .returning(move || Ok(Some(returned.clone())));
        repo.expect_upsert().times(0);

        let cache = SettingsCache::new();
        let settings = cache.get_or_seed(&repo).await.unwrap();
        assert_eq!(settings.salon_name, "Studio Glamour");
    }

    #[tokio::test]
    async fn test_refresh_replaces_cached_copy() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_get().times(1).returning(|| Ok(None));
        repo.expect_upsert().returning(|s| Ok(s.clone()));

        let cache = SettingsCache::new();
        cache.get_or_seed(&repo).await.unwrap();

        let mut updated = SalonSettings::default();
        updated.operator_name = "Paula".into();
        cache.refresh(updated.clone()).await;

        let settings = cache.get_or_seed(&repo).await.unwrap();
        assert_eq!(settings.operator_name, "Paula");
    }

    #[tokio::test]
    async fn test_invalidate_forces_reload() {
        let mut repo = MockSettingsRepository::new();
        repo.expect_get().times(2).returning(|| Ok(None));
        repo.expect_upsert().returning(|s| Ok(s.clone()));

        let cache = SettingsCache::new();
        cache.get_or_seed(&repo).await.unwrap();
        cache.invalidate().await;
        cache.get_or_seed(&repo).await.unwrap();
    }
}
