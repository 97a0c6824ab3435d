use serde::{Deserialize, Serialize};
use std::fmt;

use crate::api::Environment;
use crate::onboarding::definition::{
    AwsOptions, AzureOptions, EnvironmentDefinition, GoogleOptions, ProviderOptions,
};
use crate::onboarding::target::{AccountTarget, TargetDetail};

/// Region value that asks Fugue to survey every supported region.
pub const ALL_REGIONS: &str = "*";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Aws,
    AwsGovcloud,
    Azure,
    Google,
}

/// Everything a definition needs besides the target itself.
#[derive(Debug, Clone)]
pub struct DefinitionTemplate<'a> {
    pub role_name: &'a str,
    pub compliance_families: &'a [String],
    pub interval: u64,
    pub service_account_email: Option<&'a str>,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Aws => "aws",
            Provider::AwsGovcloud => "aws_govcloud",
            Provider::Azure => "azure",
            Provider::Google => "google",
        }
    }

    pub fn is_aws_family(&self) -> bool {
        matches!(self, Provider::Aws | Provider::AwsGovcloud)
    }

    /// Region used for the resource type lookup when every region is surveyed.
    pub fn anchor_region(&self) -> Option<&'static str> {
        match self {
            Provider::Aws => Some("us-east-1"),
            Provider::AwsGovcloud => Some("us-gov-east-1"),
            Provider::Azure | Provider::Google => None,
        }
    }

    /// Whether catalog lookups include beta resource types. GovCloud only
    /// surveys generally available types.
    pub fn includes_beta_resources(&self) -> bool {
        !matches!(self, Provider::AwsGovcloud)
    }

    /// ARN partition for IAM roles in this provider's accounts.
    pub fn arn_partition(&self) -> Option<&'static str> {
        match self {
            Provider::Aws => Some("aws"),
            Provider::AwsGovcloud => Some("aws-us-gov"),
            Provider::Azure | Provider::Google => None,
        }
    }

    pub fn role_arn(&self, account_id: &str, role_name: &str) -> Option<String> {
        self.arn_partition()
            .map(|partition| format!("arn:{}:iam::{}:role/{}", partition, account_id, role_name))
    }

    /// Identifier that ties an existing Fugue environment back to a target:
    /// the role ARN's account segment for AWS, the application id for Azure
    /// and the project id for Google.
    pub fn existing_identifier(&self, environment: &Environment) -> Option<String> {
        let settings = environment.provider_options.get(self.as_str())?;
        match self {
            Provider::Aws | Provider::AwsGovcloud => settings
                .role_arn
                .as_deref()
                .and_then(|arn| arn.split(':').nth(4))
                .map(str::to_string),
            Provider::Azure => settings.application_id.clone(),
            Provider::Google => settings.project_id.clone(),
        }
    }

    /// Environment name for a target; AWS names carry the account and region.
    pub fn environment_name(&self, target: &AccountTarget, region: Option<&str>) -> String {
        match self {
            Provider::Aws | Provider::AwsGovcloud => {
                let region_label = match region {
                    Some(ALL_REGIONS) | None => "All Regions",
                    Some(r) => r,
                };
                format!("{} - {} - {}", target.name, target.identifier(), region_label)
            }
            Provider::Azure => target.name.clone(),
            Provider::Google => target.identifier().to_string(),
        }
    }

    /// Build the creation body for one target. `region` and
    /// `survey_resource_types` are only consulted for the AWS family.
    pub fn build_definition(
        &self,
        target: &AccountTarget,
        region: Option<&str>,
        survey_resource_types: &[String],
        template: &DefinitionTemplate<'_>,
    ) -> Option<EnvironmentDefinition> {
        let name = self.environment_name(target, region);

        let (provider_options, survey, remediate) = match (self, &target.detail) {
            (Provider::Aws | Provider::AwsGovcloud, TargetDetail::Aws { account_id }) => {
                let region = region.unwrap_or(ALL_REGIONS).to_lowercase();
                let options = AwsOptions {
                    regions: vec![region],
                    role_arn: self.role_arn(account_id, template.role_name)?,
                };
                let provider_options = if *self == Provider::Aws {
                    ProviderOptions::Aws(options)
                } else {
                    ProviderOptions::AwsGovcloud(options)
                };
                (
                    provider_options,
                    Some(survey_resource_types.to_vec()),
                    Some(Vec::new()),
                )
            }
            (
                Provider::Azure,
                TargetDetail::Azure {
                    tenant_id,
                    subscription_id,
                    application_id,
                    client_secret,
                    resource_groups,
                },
            ) => (
                ProviderOptions::Azure(AzureOptions {
                    tenant_id: tenant_id.clone(),
                    subscription_id: subscription_id.clone(),
                    application_id: application_id.clone(),
                    client_secret: client_secret.clone().unwrap_or_default(),
                    survey_resource_groups: resource_groups.clone(),
                }),
                None,
                None,
            ),
            (Provider::Google, TargetDetail::Google { project_id }) => (
                ProviderOptions::Google(GoogleOptions {
                    service_account_email: template
                        .service_account_email
                        .unwrap_or_default()
                        .to_string(),
                    project_id: project_id.clone(),
                }),
                None,
                None,
            ),
            _ => return None,
        };

        Some(EnvironmentDefinition {
            name,
            provider: *self,
            provider_options,
            compliance_families: template.compliance_families.to_vec(),
            survey_resource_types: survey,
            remediate_resource_types: remediate,
            scan_schedule_enabled: template.interval != 0,
            scan_interval: template.interval,
        })
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
