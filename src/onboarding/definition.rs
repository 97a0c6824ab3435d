use serde::{Deserialize, Serialize};

use crate::onboarding::provider::Provider;

/// Request body for `POST environments`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnvironmentDefinition {
    pub name: String,
    pub provider: Provider,
    pub provider_options: ProviderOptions,
    pub compliance_families: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub survey_resource_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediate_resource_types: Option<Vec<String>>,
    pub scan_schedule_enabled: bool,
    pub scan_interval: u64,
}

/// Serialized as `{"<provider>": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ProviderOptions {
    Aws(AwsOptions),
    AwsGovcloud(AwsOptions),
    Azure(AzureOptions),
    Google(GoogleOptions),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AwsOptions {
    pub regions: Vec<String>,
    pub role_arn: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AzureOptions {
    pub tenant_id: String,
    pub subscription_id: String,
    pub application_id: String,
    pub client_secret: String,
    pub survey_resource_groups: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoogleOptions {
    pub service_account_email: String,
    pub project_id: String,
}
