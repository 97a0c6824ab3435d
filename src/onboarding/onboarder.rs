use log::{info, warn};
use std::collections::HashMap;

use crate::api::{CreateResponse, FugueClient};
use crate::config::{OnboardingSettings, RegionSelection};
use crate::error::{FugueError, Result};
use crate::onboarding::index::ExistingEnvironmentIndex;
use crate::onboarding::provider::{DefinitionTemplate, Provider, ALL_REGIONS};
use crate::onboarding::resource_types::resolve_resource_types;
use crate::onboarding::target::AccountTarget;

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Created {
        target: String,
        environment_name: String,
        environment_id: String,
    },
    Skipped {
        target: String,
        identifier: String,
    },
    Failed {
        target: String,
        environment_name: String,
        status: Option<u16>,
        reason: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct OnboardingSummary {
    pub outcomes: Vec<SubmissionOutcome>,
}

impl OnboardingSummary {
    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, SubmissionOutcome::Created { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, SubmissionOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, SubmissionOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&SubmissionOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(*o)).count()
    }
}

/// Regions to create environments for. The wildcard collapses to a single
/// entry; providers without regions get one `None` entry.
pub fn expand_regions(provider: Provider, selection: &RegionSelection) -> Vec<Option<String>> {
    if !provider.is_aws_family() {
        return vec![None];
    }
    match selection {
        RegionSelection::All => vec![Some(ALL_REGIONS.to_string())],
        RegionSelection::Explicit(regions) => regions.iter().cloned().map(Some).collect(),
    }
}

/// Registers targets as Fugue environments, one request at a time.
pub struct Onboarder<'a> {
    client: &'a FugueClient,
    settings: &'a OnboardingSettings,
}

impl<'a> Onboarder<'a> {
    pub fn new(client: &'a FugueClient, settings: &'a OnboardingSettings) -> Self {
        Onboarder { client, settings }
    }

    /// Build the duplicate filter, or `None` when duplicates are allowed.
    pub async fn existing_index(&self) -> Result<Option<ExistingEnvironmentIndex>> {
        if self.settings.allow_dups {
            return Ok(None);
        }

        info!(
            "Duplicate environments are not allowed. Retrieving existing {} environments",
            self.settings.provider
        );
        let index = ExistingEnvironmentIndex::fetch(self.client, self.settings.provider).await?;
        info!("Existing identifier list retrieved ({})", index.len());
        Ok(Some(index))
    }

    pub async fn run(&self, targets: &[AccountTarget]) -> Result<OnboardingSummary> {
        let index = self.existing_index().await?;
        self.run_with_index(targets, index.as_ref()).await
    }

    pub async fn run_with_index(
        &self,
        targets: &[AccountTarget],
        index: Option<&ExistingEnvironmentIndex>,
    ) -> Result<OnboardingSummary> {
        let provider = self.settings.provider;
        let template = DefinitionTemplate {
            role_name: &self.settings.role_name,
            compliance_families: &self.settings.compliance_families,
            interval: self.settings.interval,
            service_account_email: self.settings.service_account_email.as_deref(),
        };
        let regions = expand_regions(provider, &self.settings.regions);
        let mut catalog: HashMap<String, Vec<String>> = HashMap::new();
        let mut summary = OnboardingSummary::default();

        for target in targets {
            let identifier = target.identifier();

            if index.map_or(false, |idx| idx.contains(identifier)) {
                info!(
                    "Found {} in existing environment list. Skipping environment creation for - {}: {}",
                    identifier, target.name, identifier
                );
                summary.outcomes.push(SubmissionOutcome::Skipped {
                    target: target.name.clone(),
                    identifier: identifier.to_string(),
                });
                continue;
            }

            info!("Creating environments for: {}", identifier);
            for region in &regions {
                let survey_types = match region {
                    Some(region) => self.survey_resource_types(region, &mut catalog).await?,
                    None => Vec::new(),
                };

                let definition = provider
                    .build_definition(target, region.as_deref(), &survey_types, &template)
                    .ok_or_else(|| {
                        FugueError::Config(format!(
                            "target {} does not match provider {}",
                            target.name, provider
                        ))
                    })?;

                info!("Creating environment {}", definition.name);
                let outcome = match self.client.create_environment(&definition).await {
                    Ok(CreateResponse::Created(created)) => {
                        info!(
                            "Environment created for {}: {} with environment name: {} and environment id: {}",
                            target.name, identifier, created.name, created.id
                        );
                        SubmissionOutcome::Created {
                            target: target.name.clone(),
                            environment_name: created.name,
                            environment_id: created.id,
                        }
                    }
                    Ok(CreateResponse::Rejected { status, body }) => {
                        warn!(
                            "Environment creation failed for {}: {} with response code: {} and reason: {}",
                            target.name, identifier, status, body
                        );
                        SubmissionOutcome::Failed {
                            target: target.name.clone(),
                            environment_name: definition.name,
                            status: Some(status),
                            reason: body,
                        }
                    }
                    Err(e) => {
                        warn!("Environment creation failed for {}: {}: {}", target.name, identifier, e);
                        SubmissionOutcome::Failed {
                            target: target.name.clone(),
                            environment_name: definition.name,
                            status: None,
                            reason: e.to_string(),
                        }
                    }
                };
                summary.outcomes.push(outcome);
            }
        }

        Ok(summary)
    }

    /// Resource types for one AWS region selection, fetched once per lookup region.
    async fn survey_resource_types(
        &self,
        region: &str,
        catalog: &mut HashMap<String, Vec<String>>,
    ) -> Result<Vec<String>> {
        let provider = self.settings.provider;
        let lookup_region = if region == ALL_REGIONS {
            provider.anchor_region().unwrap_or(ALL_REGIONS).to_string()
        } else {
            region.to_lowercase()
        };

        if let Some(types) = catalog.get(&lookup_region) {
            return Ok(types.clone());
        }

        let types = resolve_resource_types(
            self.client,
            provider,
            &lookup_region,
            &self.settings.resource_types,
        )
        .await?;
        catalog.insert(lookup_region, types.clone());
        Ok(types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_expands_to_single_region() {
        assert_eq!(
            expand_regions(Provider::Aws, &RegionSelection::All),
            vec![Some("*".to_string())]
        );
    }

    #[test]
    fn test_explicit_regions_expand_one_each() {
        let selection = RegionSelection::Explicit(vec!["us-east-1".to_string(), "us-west-2".to_string()]);
        assert_eq!(
            expand_regions(Provider::AwsGovcloud, &selection),
            vec![Some("us-east-1".to_string()), Some("us-west-2".to_string())]
        );
    }

    #[test]
    fn test_regionless_providers() {
        assert_eq!(expand_regions(Provider::Azure, &RegionSelection::All), vec![None]);
        let selection = RegionSelection::Explicit(vec!["us-east-1".to_string()]);
        assert_eq!(expand_regions(Provider::Google, &selection), vec![None]);
    }

    #[test]
    fn test_summary_counts() {
        let summary = OnboardingSummary {
            outcomes: vec![
                SubmissionOutcome::Skipped {
                    target: "a".to_string(),
                    identifier: "1".to_string(),
                },
                SubmissionOutcome::Failed {
                    target: "b".to_string(),
                    environment_name: "b".to_string(),
                    status: Some(400),
                    reason: "bad".to_string(),
                },
                SubmissionOutcome::Created {
                    target: "c".to_string(),
                    environment_name: "c".to_string(),
                    environment_id: "e".to_string(),
                },
            ],
        };

        assert_eq!(summary.created(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.failed(), 1);
    }
}
