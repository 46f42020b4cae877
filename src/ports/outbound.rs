//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DisasterVictim, DomainError, FamilyGroup, Gender, Inquiry, Supply};
use chrono::{DateTime, NaiveDate, Utc};

/// Outcome of a group-assignment attempt. The repository resolves current
/// membership atomically; the service maps this to a typed error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// Victim now belongs to the requested group (idempotent for repeats).
    Assigned,
    /// Victim already belongs to a different group; nothing changed.
    AlreadyGrouped,
    /// No victim with that name.
    NoSuchVictim,
}

/// Registry port. The single persistence surface for victims, family groups,
/// supplies and inquiries, keyed by natural identifiers.
#[async_trait::async_trait]
pub trait RegistryPort: Send + Sync {
    /// Look up a victim by first name. Name is the quasi-identifier in this
    /// model; first match wins.
    async fn find_victim(&self, name: &str) -> Result<Option<DisasterVictim>, DomainError>;

    async fn save_victim(&self, victim: &DisasterVictim) -> Result<(), DomainError>;

    /// Rename a victim. Returns false when no record matched.
    async fn update_victim_name(&self, name: &str, new_name: &str) -> Result<bool, DomainError>;

    /// Change a victim's entry date. Returns false when no record matched.
    async fn update_victim_entry_date(
        &self,
        name: &str,
        entry_date: NaiveDate,
    ) -> Result<bool, DomainError>;

    /// Persist a gender change. Returns false when no record matched.
    async fn update_victim_gender(&self, name: &str, gender: Gender) -> Result<bool, DomainError>;

    async fn victim_exists(&self, name: &str) -> Result<bool, DomainError>;

    /// All victims in registration order.
    async fn list_victims(&self) -> Result<Vec<DisasterVictim>, DomainError>;

    async fn find_group(&self, group_id: i64) -> Result<Option<FamilyGroup>, DomainError>;

    /// Persist a new group. Fails on a duplicate id; uniqueness is enforced
    /// here, not in the domain type.
    async fn save_group(&self, group: &FamilyGroup) -> Result<(), DomainError>;

    async fn list_groups(&self) -> Result<Vec<FamilyGroup>, DomainError>;

    /// Assign a victim to a group, checking current membership first.
    /// A victim in a different group is not moved.
    async fn set_victim_group(&self, name: &str, group_id: i64)
        -> Result<AssignOutcome, DomainError>;

    async fn save_supply(&self, supply: &Supply) -> Result<(), DomainError>;

    /// All allocations, active and expired, in allocation order.
    async fn list_supplies(&self) -> Result<Vec<Supply>, DomainError>;

    /// Mark water allocations older than the shelf life as expired.
    /// Idempotent. Returns the number of newly expired records.
    async fn expire_stale_water(&self, now: DateTime<Utc>) -> Result<u64, DomainError>;

    /// Permanently discard expired records. Separate from the sweep so
    /// callers can retain expired allocations for audit.
    async fn purge_expired(&self) -> Result<u64, DomainError>;

    async fn save_inquiry(&self, inquiry: &Inquiry) -> Result<(), DomainError>;

    async fn list_inquiries(&self) -> Result<Vec<Inquiry>, DomainError>;
}

/// Localization lookup. Unresolved keys fall back to the key itself; a
/// missing catalog never fails a caller.
pub trait TranslatePort: Send + Sync {
    fn translate(&self, key: &str) -> String;
}
