pub mod client;
pub mod pagination;
pub mod types;

pub use client::{CreateResponse, FugueClient, ENVIRONMENT_PAGE_SIZE};
pub use pagination::Paginator;
pub use types::{
    CreatedEnvironment, Environment, FailedResource, FailedResourceType, Page, ProviderSettings,
    ResourceRef, RuleCompliance, Scan,
};
