use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{FugueError, Result};
use crate::onboarding::provider::{Provider, ALL_REGIONS};
use crate::onboarding::target::{AccountTarget, TargetDetail};

pub const CONFIG_PATH_VAR: &str = "FUGUE_ONBOARD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "onboarding.toml";
const ENV_PREFIX: &str = "FUGUE_ONBOARD";

/// Onboarding file as written by the operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingConfig {
    pub provider: Provider,
    #[serde(default = "default_regions")]
    pub regions: Vec<String>,
    #[serde(default = "default_role_name")]
    pub role_name: String,
    /// Scan interval in seconds; 0 disables scheduled scans.
    #[serde(default = "default_interval")]
    pub interval: u64,
    #[serde(default = "default_resource_types")]
    pub resource_types: Vec<String>,
    #[serde(default)]
    pub compliance_families: Vec<String>,
    #[serde(default)]
    pub allow_dups: bool,
    #[serde(default)]
    pub service_account_email: Option<String>,
    #[serde(default)]
    pub prompt_client_secret: bool,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub accounts: Vec<AccountEntry>,
    #[serde(default)]
    pub subscriptions: Vec<SubscriptionEntry>,
    #[serde(default)]
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceConfig {
    #[default]
    Static,
    AwsOrganizations {
        #[serde(default)]
        profile: Option<String>,
    },
    GoogleProjects {
        #[serde(default)]
        key_file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountEntry {
    pub name: String,
    pub account_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionEntry {
    pub name: String,
    pub tenant_id: String,
    pub subscription_id: String,
    pub application_id: String,
    #[serde(default)]
    pub client_secret: Option<String>,
    #[serde(default = "default_resource_groups")]
    pub resource_groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub name: String,
    pub project_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegionSelection {
    All,
    Explicit(Vec<String>),
}

/// Validated template shared by every target of a run.
#[derive(Debug, Clone)]
pub struct OnboardingSettings {
    pub provider: Provider,
    pub regions: RegionSelection,
    pub role_name: String,
    pub interval: u64,
    pub resource_types: Vec<String>,
    pub compliance_families: Vec<String>,
    pub allow_dups: bool,
    pub service_account_email: Option<String>,
}

fn default_regions() -> Vec<String> {
    vec![ALL_REGIONS.to_string()]
}

fn default_role_name() -> String {
    "FugueRiskManager".to_string()
}

fn default_interval() -> u64 {
    86400
}

fn default_resource_types() -> Vec<String> {
    vec!["All".to_string()]
}

fn default_resource_groups() -> Vec<String> {
    vec!["*".to_string()]
}

impl OnboardingConfig {
    /// Load from the file named by `FUGUE_ONBOARD_CONFIG` (default
    /// `onboarding.toml`), with `FUGUE_ONBOARD_*` variables layered on top.
    pub fn from_env() -> Result<Self> {
        super::load_dotenv();
        let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(Path::new(&path))
    }

    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading onboarding configuration from {}", path.display());

        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn parse(content: &str, format: config::FileFormat) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(content, format))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<OnboardingSettings> {
        let regions = if self.provider.is_aws_family() {
            if self.role_name.trim().is_empty() {
                return Err(invalid("role_name must not be empty"));
            }
            parse_regions(&self.regions)?
        } else {
            RegionSelection::All
        };

        if self.resource_types.is_empty() {
            return Err(invalid("resource_types must list at least one type or \"All\""));
        }

        if self.provider == Provider::Google
            && self.service_account_email.as_deref().map_or(true, |e| e.trim().is_empty())
        {
            return Err(invalid("service_account_email is required for provider google"));
        }

        if self.prompt_client_secret && self.provider != Provider::Azure {
            return Err(invalid("prompt_client_secret only applies to provider azure"));
        }

        self.validate_source()?;

        Ok(OnboardingSettings {
            provider: self.provider,
            regions,
            role_name: self.role_name.clone(),
            interval: self.interval,
            resource_types: self.resource_types.clone(),
            compliance_families: self.compliance_families.clone(),
            allow_dups: self.allow_dups,
            service_account_email: self.service_account_email.clone(),
        })
    }

    fn validate_source(&self) -> Result<()> {
        let provider = self.provider;
        let static_lists = [
            ("accounts", !self.accounts.is_empty(), provider.is_aws_family()),
            ("subscriptions", !self.subscriptions.is_empty(), provider == Provider::Azure),
            ("projects", !self.projects.is_empty(), provider == Provider::Google),
        ];
        for (key, present, allowed) in static_lists {
            if present && !allowed {
                return Err(invalid(&format!("{} cannot be used with provider {}", key, provider)));
            }
        }

        match &self.source {
            SourceConfig::Static => {
                if self.static_target_count() == 0 {
                    return Err(invalid(&format!("no targets configured for provider {}", provider)));
                }
            }
            SourceConfig::AwsOrganizations { .. } if !provider.is_aws_family() => {
                return Err(invalid("aws_organizations discovery requires an AWS provider"));
            }
            SourceConfig::GoogleProjects { .. } if provider != Provider::Google => {
                return Err(invalid("google_projects discovery requires provider google"));
            }
            _ => {}
        }

        if provider == Provider::Azure && !self.prompt_client_secret {
            if let Some(sub) = self
                .subscriptions
                .iter()
                .find(|s| s.client_secret.as_deref().map_or(true, str::is_empty))
            {
                return Err(invalid(&format!(
                    "subscription {} has no client_secret; set it or enable prompt_client_secret",
                    sub.name
                )));
            }
        }

        Ok(())
    }

    fn static_target_count(&self) -> usize {
        match self.provider {
            Provider::Aws | Provider::AwsGovcloud => self.accounts.len(),
            Provider::Azure => self.subscriptions.len(),
            Provider::Google => self.projects.len(),
        }
    }

    /// Targets listed in the file, in file order.
    pub fn static_targets(&self) -> Vec<AccountTarget> {
        match self.provider {
            Provider::Aws | Provider::AwsGovcloud => self
                .accounts
                .iter()
                .map(|a| AccountTarget::aws(&a.name, &a.account_id))
                .collect(),
            Provider::Azure => self
                .subscriptions
                .iter()
                .map(|s| AccountTarget {
                    name: s.name.clone(),
                    detail: TargetDetail::Azure {
                        tenant_id: s.tenant_id.clone(),
                        subscription_id: s.subscription_id.clone(),
                        application_id: s.application_id.clone(),
                        client_secret: s.client_secret.clone(),
                        resource_groups: s.resource_groups.clone(),
                    },
                })
                .collect(),
            Provider::Google => self
                .projects
                .iter()
                .map(|p| AccountTarget::google(&p.name, &p.project_id))
                .collect(),
        }
    }
}

fn parse_regions(regions: &[String]) -> Result<RegionSelection> {
    if regions.is_empty() {
        return Err(invalid("regions must not be empty; use [\"*\"] for all regions"));
    }
    if regions.iter().any(|r| r == ALL_REGIONS) {
        if regions.len() > 1 {
            return Err(invalid("the \"*\" region cannot be combined with explicit regions"));
        }
        return Ok(RegionSelection::All);
    }
    Ok(RegionSelection::Explicit(regions.to_vec()))
}

fn invalid(message: &str) -> FugueError {
    FugueError::Config(message.to_string())
}
