//! Victim and family-group use cases: register, modify, group membership.
//!
//! Validation runs in the domain before any repository call, so a rejected
//! input never reaches storage. The single-group invariant is resolved by
//! the repository and mapped to typed errors here.

use crate::domain::{parse_iso_date, DisasterVictim, DomainError, FamilyGroup, Gender};
use crate::ports::{AssignOutcome, RegistryPort};
use std::sync::Arc;
use tracing::info;

/// Registry service. Coordinates victim records and family groups.
pub struct RegistryService {
    repo: Arc<dyn RegistryPort>,
}

impl RegistryService {
    pub fn new(repo: Arc<dyn RegistryPort>) -> Self {
        Self { repo }
    }

    /// Register a new victim. Name and entry date are validated by the
    /// domain constructor; nothing is persisted on failure.
    pub async fn add_victim(
        &self,
        first_name: &str,
        entry_date: &str,
    ) -> Result<DisasterVictim, DomainError> {
        let victim = DisasterVictim::new(first_name, entry_date)?;
        self.repo.save_victim(&victim).await?;
        info!(name = %victim.first_name(), "registered disaster victim");
        Ok(victim)
    }

    /// Rename a victim. The new name passes the same rule as registration.
    pub async fn rename_victim(&self, name: &str, new_name: &str) -> Result<(), DomainError> {
        DisasterVictim::validate_name(new_name)?;
        if !self.repo.update_victim_name(name, new_name).await? {
            return Err(DomainError::NotFound(format!("no victim named '{name}'")));
        }
        info!(from = %name, to = %new_name, "renamed victim");
        Ok(())
    }

    /// Change a victim's entry date.
    pub async fn update_entry_date(&self, name: &str, entry_date: &str) -> Result<(), DomainError> {
        let date = parse_iso_date(entry_date)?;
        if !self.repo.update_victim_entry_date(name, date).await? {
            return Err(DomainError::NotFound(format!("no victim named '{name}'")));
        }
        info!(name = %name, date = %date, "updated entry date");
        Ok(())
    }

    /// Set a victim's gender from raw input. The value is parsed against the
    /// closed enumeration before storage is touched.
    pub async fn set_gender(&self, name: &str, raw: &str) -> Result<(), DomainError> {
        let gender = Gender::parse(raw)?;
        if !self.repo.update_victim_gender(name, gender).await? {
            return Err(DomainError::NotFound(format!("no victim named '{name}'")));
        }
        info!(name = %name, gender = gender.as_str(), "updated gender");
        Ok(())
    }

    /// Create a family group with an externally supplied id. Duplicate ids
    /// are refused by the repository.
    pub async fn create_group(
        &self,
        group_id: i64,
        head_name: &str,
    ) -> Result<FamilyGroup, DomainError> {
        let group = FamilyGroup::new(group_id, head_name);
        self.repo.save_group(&group).await?;
        info!(group_id, head = %head_name, "created family group");
        Ok(group)
    }

    /// Assign a victim to a family group. The group must exist; a victim
    /// already in a different group stays where it is.
    pub async fn assign_to_group(&self, name: &str, group_id: i64) -> Result<(), DomainError> {
        if self.repo.find_group(group_id).await?.is_none() {
            return Err(DomainError::NotFound(format!("no family group {group_id}")));
        }
        match self.repo.set_victim_group(name, group_id).await? {
            AssignOutcome::Assigned => {
                info!(name = %name, group_id, "assigned victim to family group");
                Ok(())
            }
            AssignOutcome::AlreadyGrouped => Err(DomainError::Conflict(format!(
                "'{name}' already belongs to a different family group"
            ))),
            AssignOutcome::NoSuchVictim => {
                Err(DomainError::NotFound(format!("no victim named '{name}'")))
            }
        }
    }

    pub async fn list_victims(&self) -> Result<Vec<DisasterVictim>, DomainError> {
        self.repo.list_victims().await
    }

    pub async fn list_groups(&self) -> Result<Vec<FamilyGroup>, DomainError> {
        self.repo.list_groups().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_repo::MemoryRegistry;

    fn service() -> RegistryService {
        RegistryService::new(Arc::new(MemoryRegistry::new()))
    }

    #[tokio::test]
    async fn add_victim_persists_valid_record() {
        let svc = service();
        svc.add_victim("Alice", "2025-03-13").await.unwrap();
        let victims = svc.list_victims().await.unwrap();
        assert_eq!(victims.len(), 1);
        assert_eq!(victims[0].first_name(), "Alice");
    }

    #[tokio::test]
    async fn add_victim_rejects_invalid_name_without_persisting() {
        let svc = service();
        let err = svc.add_victim("J@hn", "2025-03-13").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.list_victims().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rename_unknown_victim_is_not_found() {
        let svc = service();
        let err = svc.rename_victim("Ghost", "Casper").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn set_gender_parses_before_touching_storage() {
        let svc = service();
        svc.add_victim("Emily", "2025-03-13").await.unwrap();
        svc.set_gender("Emily", "NON_BINARY").await.unwrap();

        let victims = svc.list_victims().await.unwrap();
        assert_eq!(victims[0].gender(), Gender::NonBinary);

        let err = svc.set_gender("Emily", "INVALID_GENDER").await.unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        let victims = svc.list_victims().await.unwrap();
        assert_eq!(victims[0].gender(), Gender::NonBinary);
    }

    #[tokio::test]
    async fn reassigning_to_second_group_is_a_conflict() {
        let svc = service();
        svc.add_victim("Lily", "2025-03-13").await.unwrap();
        svc.create_group(1, "Smith Family").await.unwrap();
        svc.create_group(2, "Jones Family").await.unwrap();

        svc.assign_to_group("Lily", 1).await.unwrap();
        let err = svc.assign_to_group("Lily", 2).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        // Original membership unaffected.
        let groups = svc.list_groups().await.unwrap();
        let g1 = groups.iter().find(|g| g.group_id() == 1).unwrap();
        let g2 = groups.iter().find(|g| g.group_id() == 2).unwrap();
        assert_eq!(g1.members(), ["Lily"]);
        assert!(g2.members().is_empty());
    }

    #[tokio::test]
    async fn assigning_to_missing_group_is_not_found() {
        let svc = service();
        svc.add_victim("Lily", "2025-03-13").await.unwrap();
        let err = svc.assign_to_group("Lily", 99).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn duplicate_group_id_is_refused() {
        let svc = service();
        svc.create_group(1, "Smith Family").await.unwrap();
        let err = svc.create_group(1, "Jones Family").await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }
}
