//! Missing-person inquiry use case.
//!
//! An inquirer claiming to be a registered victim must resolve against the
//! victim set before the inquiry is accepted; nothing is persisted on failure.

use crate::domain::{DomainError, Inquiry};
use crate::ports::RegistryPort;
use std::sync::Arc;
use tracing::info;

/// Inquiry service. Verifies inquirer identity and records inquiries.
pub struct InquiryService {
    repo: Arc<dyn RegistryPort>,
}

impl InquiryService {
    pub fn new(repo: Arc<dyn RegistryPort>) -> Self {
        Self { repo }
    }

    /// Log a missing-person inquiry. When `known_victim` is set, the
    /// inquirer's name must match a registered victim.
    pub async fn log_inquiry(
        &self,
        inquirer_name: &str,
        known_victim: bool,
        missing_person: &str,
        inquiry_date: &str,
    ) -> Result<Inquiry, DomainError> {
        if known_victim && !self.repo.victim_exists(inquirer_name).await? {
            return Err(DomainError::NotFound(format!(
                "no disaster victim named '{inquirer_name}'"
            )));
        }
        let inquiry = Inquiry::new(inquirer_name, known_victim, missing_person, inquiry_date)?;
        self.repo.save_inquiry(&inquiry).await?;
        info!(
            inquirer = %inquirer_name,
            missing = %missing_person,
            "logged missing-person inquiry"
        );
        Ok(inquiry)
    }

    pub async fn list_inquiries(&self) -> Result<Vec<Inquiry>, DomainError> {
        self.repo.list_inquiries().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::memory_repo::MemoryRegistry;
    use crate::domain::DisasterVictim;

    #[tokio::test]
    async fn unknown_self_reported_victim_is_rejected_and_nothing_persists() {
        let repo = Arc::new(MemoryRegistry::new());
        let svc = InquiryService::new(repo.clone());

        let err = svc
            .log_inquiry("Ghost", true, "Luis", "2025-03-13")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        assert!(svc.list_inquiries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn known_victim_inquirer_resolves() {
        let repo = Arc::new(MemoryRegistry::new());
        let victim = DisasterVictim::new("Ana", "2025-03-01").unwrap();
        repo.save_victim(&victim).await.unwrap();

        let svc = InquiryService::new(repo);
        let inquiry = svc
            .log_inquiry("Ana", true, "Luis", "2025-03-13")
            .await
            .unwrap();
        assert_eq!(inquiry.inquirer_name(), "Ana");
        assert!(inquiry.known_victim());
    }

    #[tokio::test]
    async fn outside_inquirer_skips_the_victim_check() {
        let repo = Arc::new(MemoryRegistry::new());
        let svc = InquiryService::new(repo);

        svc.log_inquiry("Reporter", false, "Luis", "2025-03-13")
            .await
            .unwrap();
        assert_eq!(svc.list_inquiries().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn malformed_date_is_rejected() {
        let repo = Arc::new(MemoryRegistry::new());
        let svc = InquiryService::new(repo);

        let err = svc
            .log_inquiry("Reporter", false, "Luis", "03/13/2025")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert!(svc.list_inquiries().await.unwrap().is_empty());
    }
}
