//! Domain Layer
//!
//! Entities, value objects and pure domain services.

pub mod entities;
pub mod services;
pub mod value_objects;
