pub mod definition;
pub mod index;
pub mod onboarder;
pub mod provider;
pub mod resource_types;
pub mod target;

pub use definition::{AwsOptions, AzureOptions, EnvironmentDefinition, GoogleOptions, ProviderOptions};
pub use index::ExistingEnvironmentIndex;
pub use onboarder::{expand_regions, Onboarder, OnboardingSummary, SubmissionOutcome};
pub use provider::{DefinitionTemplate, Provider, ALL_REGIONS};
pub use resource_types::{resolve_resource_types, wants_full_catalog, ALL_RESOURCE_TYPES};
pub use target::{apply_client_secret, AccountTarget, TargetDetail};
