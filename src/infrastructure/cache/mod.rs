//! Cache Module
//!
//! In-process caches for rarely-changing data.

mod settings_cache;

pub use settings_cache::SettingsCache;
