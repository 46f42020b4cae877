//! In-memory registry. Implements RegistryPort without a database.
//!
//! Selected by configuration for offline runs; also the store behind the
//! use-case tests. Same semantics as the SQLite adapter.

use crate::domain::{DisasterVictim, DomainError, FamilyGroup, Gender, Inquiry, Supply};
use crate::ports::{AssignOutcome, RegistryPort};
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Store {
    victims: Vec<DisasterVictim>,
    groups: Vec<FamilyGroup>,
    supplies: Vec<Supply>,
    inquiries: Vec<Inquiry>,
}

/// Volatile registry store. All vectors keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    store: RwLock<Store>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RegistryPort for MemoryRegistry {
    async fn find_victim(&self, name: &str) -> Result<Option<DisasterVictim>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .victims
            .iter()
            .find(|v| v.first_name() == name)
            .cloned())
    }

    async fn save_victim(&self, victim: &DisasterVictim) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        store.victims.push(victim.clone());
        Ok(())
    }

    async fn update_victim_name(&self, name: &str, new_name: &str) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;
        let Some(pos) = store.victims.iter().position(|v| v.first_name() == name) else {
            return Ok(false);
        };
        // Validation already happened upstream; rebuild with the new name.
        let (entry_date, gender, group_id) = {
            let v = &store.victims[pos];
            (v.entry_date(), v.gender(), v.family_group_id())
        };
        store.victims[pos] =
            DisasterVictim::from_parts(new_name.to_string(), entry_date, gender, group_id);
        // Group member lists carry the same name; keep both in step.
        for group in &mut store.groups {
            group.rename_member(name, new_name);
        }
        Ok(true)
    }

    async fn update_victim_entry_date(
        &self,
        name: &str,
        entry_date: NaiveDate,
    ) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;
        match store.victims.iter_mut().find(|v| v.first_name() == name) {
            Some(v) => {
                *v = DisasterVictim::from_parts(
                    v.first_name().to_string(),
                    entry_date,
                    v.gender(),
                    v.family_group_id(),
                );
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_victim_gender(&self, name: &str, gender: Gender) -> Result<bool, DomainError> {
        let mut store = self.store.write().await;
        match store.victims.iter_mut().find(|v| v.first_name() == name) {
            Some(v) => {
                v.set_gender(gender.as_str())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn victim_exists(&self, name: &str) -> Result<bool, DomainError> {
        let store = self.store.read().await;
        Ok(store.victims.iter().any(|v| v.first_name() == name))
    }

    async fn list_victims(&self) -> Result<Vec<DisasterVictim>, DomainError> {
        let store = self.store.read().await;
        Ok(store.victims.clone())
    }

    async fn find_group(&self, group_id: i64) -> Result<Option<FamilyGroup>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .groups
            .iter()
            .find(|g| g.group_id() == group_id)
            .cloned())
    }

    async fn save_group(&self, group: &FamilyGroup) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        if store.groups.iter().any(|g| g.group_id() == group.group_id()) {
            return Err(DomainError::Conflict(format!(
                "family group {} already exists",
                group.group_id()
            )));
        }
        store.groups.push(group.clone());
        Ok(())
    }

    async fn list_groups(&self) -> Result<Vec<FamilyGroup>, DomainError> {
        let store = self.store.read().await;
        Ok(store.groups.clone())
    }

    async fn set_victim_group(
        &self,
        name: &str,
        group_id: i64,
    ) -> Result<AssignOutcome, DomainError> {
        let mut store = self.store.write().await;
        let Some(pos) = store.victims.iter().position(|v| v.first_name() == name) else {
            return Ok(AssignOutcome::NoSuchVictim);
        };
        match store.victims[pos].family_group_id() {
            Some(current) if current == group_id => Ok(AssignOutcome::Assigned),
            Some(_) => Ok(AssignOutcome::AlreadyGrouped),
            None => {
                store.victims[pos].assign_group(group_id);
                if let Some(group) = store.groups.iter_mut().find(|g| g.group_id() == group_id) {
                    group.add_member_name(name);
                }
                Ok(AssignOutcome::Assigned)
            }
        }
    }

    async fn save_supply(&self, supply: &Supply) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        store.supplies.push(supply.clone());
        Ok(())
    }

    async fn list_supplies(&self) -> Result<Vec<Supply>, DomainError> {
        let store = self.store.read().await;
        Ok(store.supplies.clone())
    }

    async fn expire_stale_water(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let mut store = self.store.write().await;
        let mut expired = 0u64;
        for supply in &mut store.supplies {
            if supply.expire_if_stale(now) {
                expired += 1;
            }
        }
        Ok(expired)
    }

    async fn purge_expired(&self) -> Result<u64, DomainError> {
        let mut store = self.store.write().await;
        let before = store.supplies.len();
        store.supplies.retain(|s| !s.is_expired());
        Ok((before - store.supplies.len()) as u64)
    }

    async fn save_inquiry(&self, inquiry: &Inquiry) -> Result<(), DomainError> {
        let mut store = self.store.write().await;
        store.inquiries.push(inquiry.clone());
        Ok(())
    }

    async fn list_inquiries(&self) -> Result<Vec<Inquiry>, DomainError> {
        let store = self.store.read().await;
        Ok(store.inquiries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 13, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn assignment_checks_current_membership() {
        let repo = MemoryRegistry::new();
        let lily = DisasterVictim::new("Lily", "2025-03-13").unwrap();
        repo.save_victim(&lily).await.unwrap();
        repo.save_group(&FamilyGroup::new(1, "Smith Family"))
            .await
            .unwrap();
        repo.save_group(&FamilyGroup::new(2, "Jones Family"))
            .await
            .unwrap();

        assert_eq!(
            repo.set_victim_group("Lily", 1).await.unwrap(),
            AssignOutcome::Assigned
        );
        // Same group again: idempotent.
        assert_eq!(
            repo.set_victim_group("Lily", 1).await.unwrap(),
            AssignOutcome::Assigned
        );
        assert_eq!(
            repo.set_victim_group("Lily", 2).await.unwrap(),
            AssignOutcome::AlreadyGrouped
        );
        assert_eq!(
            repo.set_victim_group("Nobody", 1).await.unwrap(),
            AssignOutcome::NoSuchVictim
        );

        let group = repo.find_group(1).await.unwrap().unwrap();
        assert_eq!(group.members(), ["Lily"]);
    }

    #[tokio::test]
    async fn rename_preserves_gender_and_group() {
        let repo = MemoryRegistry::new();
        let mut ana = DisasterVictim::new("Ana", "2025-03-01").unwrap();
        ana.set_gender("FEMALE").unwrap();
        repo.save_victim(&ana).await.unwrap();
        repo.save_group(&FamilyGroup::new(7, "Reyes Family"))
            .await
            .unwrap();
        repo.set_victim_group("Ana", 7).await.unwrap();

        assert!(repo.update_victim_name("Ana", "Anna").await.unwrap());
        let renamed = repo.find_victim("Anna").await.unwrap().unwrap();
        assert_eq!(renamed.gender(), Gender::Female);
        assert_eq!(renamed.family_group_id(), Some(7));
        assert!(repo.find_victim("Ana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rename_rewrites_group_member_lists() {
        let repo = MemoryRegistry::new();
        let ana = DisasterVictim::new("Ana", "2025-03-01").unwrap();
        let luis = DisasterVictim::new("Luis", "2025-03-02").unwrap();
        repo.save_victim(&ana).await.unwrap();
        repo.save_victim(&luis).await.unwrap();
        repo.save_group(&FamilyGroup::new(7, "Reyes Family"))
            .await
            .unwrap();
        repo.set_victim_group("Ana", 7).await.unwrap();
        repo.set_victim_group("Luis", 7).await.unwrap();

        repo.update_victim_name("Ana", "Anna").await.unwrap();

        // Both copies of the name stay consistent: the victim record and
        // the group membership it appears in.
        let group = repo.find_group(7).await.unwrap().unwrap();
        assert_eq!(group.members(), ["Anna", "Luis"]);
    }

    #[tokio::test]
    async fn stale_water_sweep_counts_only_transitions() {
        let repo = MemoryRegistry::new();
        let water = Supply::allocate(
            crate::domain::SupplyKind::Water,
            10,
            crate::domain::AllocationTarget::Location("Shelter A".into()),
            t0(),
        )
        .unwrap();
        repo.save_supply(&water).await.unwrap();

        let now = t0() + Duration::hours(26);
        assert_eq!(repo.expire_stale_water(now).await.unwrap(), 1);
        assert_eq!(repo.expire_stale_water(now).await.unwrap(), 0);
        assert_eq!(repo.purge_expired().await.unwrap(), 1);
        assert!(repo.list_supplies().await.unwrap().is_empty());
    }
}
