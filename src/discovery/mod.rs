pub mod aws_org;
pub mod gcp;
pub mod gcp_auth;

pub use aws_org::{active_targets, OrgAccount, OrganizationsDiscovery};
pub use gcp::{project_targets, Project, ProjectDiscovery};
pub use gcp_auth::{GoogleCredentials, ServiceAccountKey};

use crate::config::{OnboardingConfig, SourceConfig};
use crate::error::Result;
use crate::onboarding::target::AccountTarget;

/// Where the targets of an onboarding run come from.
pub enum AccountSource {
    Static(Vec<AccountTarget>),
    AwsOrganizations(OrganizationsDiscovery),
    GoogleProjects(ProjectDiscovery),
}

impl AccountSource {
    pub fn from_config(config: &OnboardingConfig) -> Result<Self> {
        Ok(match &config.source {
            SourceConfig::Static => AccountSource::Static(config.static_targets()),
            SourceConfig::AwsOrganizations { profile } => {
                AccountSource::AwsOrganizations(OrganizationsDiscovery::new(profile.clone()))
            }
            SourceConfig::GoogleProjects { key_file } => {
                let credentials = GoogleCredentials::resolve(key_file.as_deref())?;
                AccountSource::GoogleProjects(ProjectDiscovery::new(credentials)?)
            }
        })
    }

    /// Resolve the target list. Discovery errors abort the run.
    pub async fn targets(self) -> Result<Vec<AccountTarget>> {
        match self {
            AccountSource::Static(targets) => Ok(targets),
            AccountSource::AwsOrganizations(discovery) => discovery.discover().await,
            AccountSource::GoogleProjects(discovery) => discovery.discover().await,
        }
    }
}
