//! Infrastructure adapters. Implement outbound ports.
//!
//! Persistence, localization, terminal UI. Map errors to DomainError.

pub mod locale;
pub mod persistence;
pub mod ui;
