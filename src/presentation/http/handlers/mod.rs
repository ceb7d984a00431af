//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod appointment;
pub mod catalog;
pub mod client;
pub mod finance;
pub mod health;
pub mod product;
pub mod professional;
pub mod settings;
