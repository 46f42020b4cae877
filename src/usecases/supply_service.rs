//! Supply allocation lifecycle: allocate, expire, purge, inventory.
//!
//! Expire and purge are independent operations. The sweep runs at startup
//! and after every new water allocation; purging is an explicit retention
//! decision left to the caller.

use crate::domain::{AllocationTarget, DomainError, Supply, SupplyKind};
use crate::ports::RegistryPort;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::info;

/// Supply service. Validates allocations and drives perishable sweeps.
pub struct SupplyService {
    repo: Arc<dyn RegistryPort>,
}

impl SupplyService {
    pub fn new(repo: Arc<dyn RegistryPort>) -> Self {
        Self { repo }
    }

    /// Allocate supplies to a location or a person. Kind and target come in
    /// raw from the boundary and are validated here; a water allocation
    /// additionally triggers a stale-water sweep.
    pub async fn allocate(
        &self,
        kind: &str,
        quantity: u32,
        location: Option<String>,
        person: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Supply, DomainError> {
        let kind = SupplyKind::parse(kind)?;
        let target = AllocationTarget::resolve(location, person)?;
        let supply = Supply::allocate(kind, quantity, target, now)?;
        self.repo.save_supply(&supply).await?;
        info!(kind = kind.as_str(), quantity, "allocated supplies");

        if kind.is_perishable() {
            self.sweep_expired(now).await?;
        }
        Ok(supply)
    }

    /// Mark stale water allocations expired. Idempotent; repeated sweeps
    /// with the same `now` change nothing further.
    pub async fn sweep_expired(&self, now: DateTime<Utc>) -> Result<u64, DomainError> {
        let expired = self.repo.expire_stale_water(now).await?;
        if expired > 0 {
            info!(expired, "marked stale water allocations expired");
        }
        Ok(expired)
    }

    /// Permanently discard expired allocations. Destroys audit history, so
    /// it is never run implicitly.
    pub async fn purge_expired(&self) -> Result<u64, DomainError> {
        let purged = self.repo.purge_expired().await?;
        if purged > 0 {
            info!(purged, "purged expired allocations");
        }
        Ok(purged)
    }

    pub async fn inventory(&self) -> Result<Vec<Supply>, DomainError> {
        self.repo.list_supplies().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_repo::MemoryRegistry;
    use crate::domain::SupplyStatus;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 13, 8, 0, 0).unwrap()
    }

    fn service() -> SupplyService {
        SupplyService::new(Arc::new(MemoryRegistry::new()))
    }

    #[tokio::test]
    async fn allocate_to_location_then_expire_after_26h() {
        let svc = service();
        svc.allocate("water", 10, Some("Shelter A".into()), None, t0())
            .await
            .unwrap();

        svc.sweep_expired(t0() + Duration::hours(26)).await.unwrap();

        let inventory = svc.inventory().await.unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].status(), SupplyStatus::Expired);
    }

    #[tokio::test]
    async fn sweep_is_idempotent() {
        let svc = service();
        svc.allocate("water", 3, Some("Shelter A".into()), None, t0())
            .await
            .unwrap();

        let now = t0() + Duration::hours(26);
        assert_eq!(svc.sweep_expired(now).await.unwrap(), 1);
        assert_eq!(svc.sweep_expired(now).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn fresh_water_survives_the_sweep() {
        let svc = service();
        svc.allocate("water", 3, Some("Shelter A".into()), None, t0())
            .await
            .unwrap();

        svc.sweep_expired(t0() + Duration::hours(23)).await.unwrap();
        let inventory = svc.inventory().await.unwrap();
        assert_eq!(inventory[0].status(), SupplyStatus::Active);
    }

    #[tokio::test]
    async fn invalid_kind_and_ambiguous_target_are_rejected() {
        let svc = service();
        let err = svc
            .allocate("tent", 1, Some("Shelter A".into()), None, t0())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = svc
            .allocate("cot", 1, Some("Shelter A".into()), Some("Lily".into()), t0())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        let err = svc.allocate("cot", 0, Some("Shelter A".into()), None, t0())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));

        assert!(svc.inventory().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn purge_removes_only_expired_records() {
        let svc = service();
        svc.allocate("water", 10, Some("Shelter A".into()), None, t0())
            .await
            .unwrap();
        svc.allocate("blanket", 4, None, Some("Lily".into()), t0())
            .await
            .unwrap();

        svc.sweep_expired(t0() + Duration::hours(30)).await.unwrap();
        assert_eq!(svc.purge_expired().await.unwrap(), 1);

        let inventory = svc.inventory().await.unwrap();
        assert_eq!(inventory.len(), 1);
        assert_eq!(inventory[0].kind().as_str(), "blanket");
    }
}
