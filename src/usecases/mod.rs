//! Application use cases. Orchestrate domain logic via ports.

pub mod inquiry_service;
pub mod registry_service;
pub mod supply_service;

pub use inquiry_service::InquiryService;
pub use registry_service::RegistryService;
pub use supply_service::SupplyService;
