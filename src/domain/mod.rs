//! Core domain layer. No external I/O dependencies.
//!
//! Entities and business rules live here. Dependencies flow inward.

pub mod entities;
pub mod errors;

pub use entities::{
    AllocationTarget, DisasterVictim, FamilyGroup, Gender, Inquiry, Supply, SupplyKind,
    SupplyStatus, parse_iso_date, WATER_SHELF_LIFE_HOURS,
};
pub use errors::DomainError;
