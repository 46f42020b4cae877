//! Domain entities. Pure data structures for the core business.
//!
//! No storage/UI types here — validation happens at construction and
//! every invariant failure is a typed `DomainError` before any state change.

use crate::domain::DomainError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Shelf life of a water allocation. Older allocations are swept to `Expired`.
pub const WATER_SHELF_LIFE_HOURS: i64 = 24;

/// Closed gender enumeration. Parsed once at the boundary; stored as a value,
/// never string-compared downstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    NonBinary,
    #[default]
    Unspecified,
}

impl Gender {
    /// Parse user/storage input. Case-insensitive; rejects anything outside
    /// the closed set.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "MALE" => Ok(Self::Male),
            "FEMALE" => Ok(Self::Female),
            "NON_BINARY" => Ok(Self::NonBinary),
            "UNSPECIFIED" => Ok(Self::Unspecified),
            other => Err(DomainError::Validation(format!("unknown gender '{other}'"))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::NonBinary => "NON_BINARY",
            Self::Unspecified => "UNSPECIFIED",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// A registered displaced person.
///
/// Name and entry date are validated at construction; a victim that fails
/// validation is never created. First name doubles as the lookup key at the
/// repository surface (no stronger identifier is enforced by the model).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisasterVictim {
    first_name: String,
    entry_date: NaiveDate,
    gender: Gender,
    family_group_id: Option<i64>,
}

impl DisasterVictim {
    /// Create a victim. Fails when the name is empty or carries characters
    /// outside letters/spaces/hyphens, or when the date is not a real
    /// `YYYY-MM-DD` calendar date.
    pub fn new(first_name: &str, entry_date: &str) -> Result<Self, DomainError> {
        Self::validate_name(first_name)?;
        let entry_date = parse_iso_date(entry_date)?;
        Ok(Self {
            first_name: first_name.to_string(),
            entry_date,
            gender: Gender::default(),
            family_group_id: None,
        })
    }

    /// Name rule: non-empty, `[A-Za-z \-]` only. Shared with the rename flow,
    /// which updates storage without reconstructing the victim.
    pub fn validate_name(name: &str) -> Result<(), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation("first name is empty".into()));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ' || c == '-')
        {
            return Err(DomainError::Validation(format!(
                "first name '{name}' contains characters outside letters, spaces and hyphens"
            )));
        }
        Ok(())
    }

    /// Set gender from raw input. On parse failure the previous value is
    /// left untouched.
    pub fn set_gender(&mut self, raw: &str) -> Result<(), DomainError> {
        self.gender = Gender::parse(raw)?;
        Ok(())
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn family_group_id(&self) -> Option<i64> {
        self.family_group_id
    }

    /// Membership bookkeeping for the store adapters. The single-group
    /// invariant is enforced at the repository, not here.
    pub fn assign_group(&mut self, group_id: i64) {
        self.family_group_id = Some(group_id);
    }

    /// Rebuild a record from storage. No validation re-run; the store is
    /// trusted to hold what `new` once accepted.
    pub(crate) fn from_parts(
        first_name: String,
        entry_date: NaiveDate,
        gender: Gender,
        family_group_id: Option<i64>,
    ) -> Self {
        Self {
            first_name,
            entry_date,
            gender,
            family_group_id,
        }
    }
}

/// Strict `YYYY-MM-DD` parse; must be a real calendar date (chrono rejects
/// 2025-02-30 and the like).
pub fn parse_iso_date(raw: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| DomainError::Validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

/// A family group: externally supplied id, head-of-family name, and the
/// member names in join order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FamilyGroup {
    group_id: i64,
    head_name: String,
    members: Vec<String>,
}

impl FamilyGroup {
    /// Ids are assumed externally unique; the repository enforces it.
    pub fn new(group_id: i64, head_name: &str) -> Self {
        Self {
            group_id,
            head_name: head_name.to_string(),
            members: Vec::new(),
        }
    }

    /// Appends unconditionally. The one-group-per-victim rule lives at the
    /// repository layer, which checks current membership before calling this.
    pub fn add_member(&mut self, victim: &DisasterVictim) {
        self.members.push(victim.first_name.clone());
    }

    pub(crate) fn add_member_name(&mut self, name: &str) {
        self.members.push(name.to_string());
    }

    /// Rewrite a member name in place. The member list and the victim
    /// records hold the same name; a rename must update both.
    pub(crate) fn rename_member(&mut self, from: &str, to: &str) {
        for member in &mut self.members {
            if member == from {
                *member = to.to_string();
            }
        }
    }

    pub fn group_id(&self) -> i64 {
        self.group_id
    }

    pub fn head_name(&self) -> &str {
        &self.head_name
    }

    /// Member names in join order. Read-only view.
    pub fn members(&self) -> &[String] {
        &self.members
    }
}

/// Closed supply-type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyKind {
    #[serde(rename = "personal belonging")]
    PersonalBelonging,
    Blanket,
    Cot,
    Water,
}

impl SupplyKind {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "personal belonging" => Ok(Self::PersonalBelonging),
            "blanket" => Ok(Self::Blanket),
            "cot" => Ok(Self::Cot),
            "water" => Ok(Self::Water),
            other => Err(DomainError::Validation(format!(
                "unknown supply type '{other}'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PersonalBelonging => "personal belonging",
            Self::Blanket => "blanket",
            Self::Cot => "cot",
            Self::Water => "water",
        }
    }

    /// Only water spoils.
    pub fn is_perishable(&self) -> bool {
        matches!(self, Self::Water)
    }
}

impl std::str::FromStr for SupplyKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Where an allocation goes: a named location XOR a named person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationTarget {
    Location(String),
    Person(String),
}

impl AllocationTarget {
    /// Resolve the location/person pair collected at the boundary. Both set
    /// or neither set is ambiguous and rejected.
    pub fn resolve(location: Option<String>, person: Option<String>) -> Result<Self, DomainError> {
        match (location, person) {
            (Some(l), None) => Ok(Self::Location(l)),
            (None, Some(p)) => Ok(Self::Person(p)),
            (Some(_), Some(_)) => Err(DomainError::Validation(
                "allocation target is ambiguous: both location and person given".into(),
            )),
            (None, None) => Err(DomainError::Validation(
                "allocation target missing: give a location or a person".into(),
            )),
        }
    }
}

/// Allocation lifecycle. `Expired` is one-way; removal happens through an
/// explicit purge, never as part of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyStatus {
    #[default]
    Active,
    Expired,
}

/// A quantified allocation of a supply kind to a target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supply {
    kind: SupplyKind,
    quantity: u32,
    target: AllocationTarget,
    allocated_at: DateTime<Utc>,
    status: SupplyStatus,
}

impl Supply {
    /// Allocate `quantity` units of `kind` to `target` at `now`.
    /// Quantity must be positive.
    pub fn allocate(
        kind: SupplyKind,
        quantity: u32,
        target: AllocationTarget,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if quantity == 0 {
            return Err(DomainError::Validation(
                "supply quantity must be positive".into(),
            ));
        }
        Ok(Self {
            kind,
            quantity,
            target,
            allocated_at: now,
            status: SupplyStatus::Active,
        })
    }

    /// Rebuild a record from storage. No validation re-run; the store is
    /// trusted to hold what `allocate` once accepted.
    pub(crate) fn from_parts(
        kind: SupplyKind,
        quantity: u32,
        target: AllocationTarget,
        allocated_at: DateTime<Utc>,
        status: SupplyStatus,
    ) -> Self {
        Self {
            kind,
            quantity,
            target,
            allocated_at,
            status,
        }
    }

    /// Expire a perishable allocation older than the shelf life. One-way and
    /// idempotent; returns whether this call changed the status.
    pub fn expire_if_stale(&mut self, now: DateTime<Utc>) -> bool {
        if self.status == SupplyStatus::Expired || !self.kind.is_perishable() {
            return false;
        }
        if now - self.allocated_at > Duration::hours(WATER_SHELF_LIFE_HOURS) {
            self.status = SupplyStatus::Expired;
            true
        } else {
            false
        }
    }

    pub fn kind(&self) -> SupplyKind {
        self.kind
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn target(&self) -> &AllocationTarget {
        &self.target
    }

    pub fn allocated_at(&self) -> DateTime<Utc> {
        self.allocated_at
    }

    pub fn status(&self) -> SupplyStatus {
        self.status
    }

    pub fn is_expired(&self) -> bool {
        self.status == SupplyStatus::Expired
    }
}

/// A missing-person inquiry. Immutable once built; the known-victim check
/// against the registry happens in the inquiry service before construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Inquiry {
    inquirer_name: String,
    known_victim: bool,
    missing_person: String,
    inquiry_date: NaiveDate,
}

impl Inquiry {
    pub fn new(
        inquirer_name: &str,
        known_victim: bool,
        missing_person: &str,
        inquiry_date: &str,
    ) -> Result<Self, DomainError> {
        let inquiry_date = parse_iso_date(inquiry_date)?;
        Ok(Self {
            inquirer_name: inquirer_name.to_string(),
            known_victim,
            missing_person: missing_person.to_string(),
            inquiry_date,
        })
    }

    pub(crate) fn from_parts(
        inquirer_name: String,
        known_victim: bool,
        missing_person: String,
        inquiry_date: NaiveDate,
    ) -> Self {
        Self {
            inquirer_name,
            known_victim,
            missing_person,
            inquiry_date,
        }
    }

    pub fn inquirer_name(&self) -> &str {
        &self.inquirer_name
    }

    pub fn known_victim(&self) -> bool {
        self.known_victim
    }

    pub fn missing_person(&self) -> &str {
        &self.missing_person
    }

    pub fn inquiry_date(&self) -> NaiveDate {
        self.inquiry_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 13, 12, 0, 0).unwrap()
    }

    #[test]
    fn victim_creation_rejects_empty_name() {
        let err = DisasterVictim::new("", "2025-03-13").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn victim_creation_rejects_symbols_and_digits() {
        assert!(DisasterVictim::new("J@hn", "2025-03-13").is_err());
        assert!(DisasterVictim::new("J0hn", "2025-03-13").is_err());
        assert!(DisasterVictim::new("John!", "2025-03-13").is_err());
    }

    #[test]
    fn victim_creation_accepts_spaces_and_hyphens() {
        let v = DisasterVictim::new("Mary-Anne Smith", "2025-03-13").unwrap();
        assert_eq!(v.first_name(), "Mary-Anne Smith");
        assert_eq!(v.gender(), Gender::Unspecified);
    }

    #[test]
    fn victim_creation_rejects_bad_dates() {
        assert!(DisasterVictim::new("Alice", "invalid-date").is_err());
        assert!(DisasterVictim::new("Alice", "2025-02-30").is_err());
        assert!(DisasterVictim::new("Alice", "13-03-2025").is_err());
    }

    #[test]
    fn set_gender_accepts_enumerated_values() {
        let mut v = DisasterVictim::new("Emily", "2025-03-13").unwrap();
        v.set_gender("NON_BINARY").unwrap();
        assert_eq!(v.gender(), Gender::NonBinary);
        v.set_gender("male").unwrap();
        assert_eq!(v.gender(), Gender::Male);
    }

    #[test]
    fn set_gender_rejects_unknown_and_keeps_previous() {
        let mut v = DisasterVictim::new("Sam", "2025-03-13").unwrap();
        v.set_gender("FEMALE").unwrap();
        let err = v.set_gender("INVALID_GENDER").unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(v.gender(), Gender::Female);
    }

    #[test]
    fn family_group_keeps_join_order() {
        let mut family = FamilyGroup::new(1, "Smith Family");
        let lily = DisasterVictim::new("Lily", "2025-03-13").unwrap();
        let rose = DisasterVictim::new("Rose", "2025-03-14").unwrap();
        family.add_member(&lily);
        family.add_member(&rose);
        assert_eq!(family.members(), ["Lily", "Rose"]);
    }

    #[test]
    fn renaming_a_member_updates_the_member_list() {
        let mut family = FamilyGroup::new(1, "Smith Family");
        let lily = DisasterVictim::new("Lily", "2025-03-13").unwrap();
        family.add_member(&lily);
        family.rename_member("Lily", "Lilly");
        assert_eq!(family.members(), ["Lilly"]);
        // Unknown names are a no-op.
        family.rename_member("Nobody", "Someone");
        assert_eq!(family.members(), ["Lilly"]);
    }

    #[test]
    fn supply_kind_parses_the_four_types_only() {
        assert_eq!(
            SupplyKind::parse("personal belonging").unwrap(),
            SupplyKind::PersonalBelonging
        );
        assert_eq!(SupplyKind::parse("Water").unwrap(), SupplyKind::Water);
        assert!(SupplyKind::parse("tent").is_err());
    }

    #[test]
    fn allocation_target_is_exclusive() {
        assert!(AllocationTarget::resolve(Some("Shelter A".into()), None).is_ok());
        assert!(AllocationTarget::resolve(None, Some("Lily".into())).is_ok());
        assert!(AllocationTarget::resolve(None, None).is_err());
        assert!(AllocationTarget::resolve(Some("Shelter A".into()), Some("Lily".into())).is_err());
    }

    #[test]
    fn supply_rejects_zero_quantity() {
        let target = AllocationTarget::Location("Shelter A".into());
        let err = Supply::allocate(SupplyKind::Cot, 0, target, t0()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn water_is_active_at_23h_and_expired_at_25h() {
        let target = AllocationTarget::Location("Shelter A".into());
        let mut s = Supply::allocate(SupplyKind::Water, 10, target, t0()).unwrap();

        assert!(!s.expire_if_stale(t0() + Duration::hours(23)));
        assert_eq!(s.status(), SupplyStatus::Active);

        assert!(s.expire_if_stale(t0() + Duration::hours(25)));
        assert_eq!(s.status(), SupplyStatus::Expired);
    }

    #[test]
    fn expiry_sweep_is_idempotent() {
        let target = AllocationTarget::Person("Lily".into());
        let mut s = Supply::allocate(SupplyKind::Water, 2, target, t0()).unwrap();
        let later = t0() + Duration::hours(26);
        assert!(s.expire_if_stale(later));
        assert!(!s.expire_if_stale(later));
        assert_eq!(s.status(), SupplyStatus::Expired);
    }

    #[test]
    fn non_perishables_never_expire() {
        let target = AllocationTarget::Location("Shelter B".into());
        let mut s = Supply::allocate(SupplyKind::Blanket, 5, target, t0()).unwrap();
        assert!(!s.expire_if_stale(t0() + Duration::days(30)));
        assert_eq!(s.status(), SupplyStatus::Active);
    }

    #[test]
    fn inquiry_validates_date_format() {
        assert!(Inquiry::new("Ana", false, "Luis", "2025-03-13").is_ok());
        assert!(Inquiry::new("Ana", false, "Luis", "not-a-date").is_err());
    }
}
