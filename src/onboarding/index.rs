use std::collections::HashSet;

use crate::api::{Environment, FugueClient};
use crate::error::Result;
use crate::onboarding::provider::Provider;

/// Identifiers of targets that already have a Fugue environment.
#[derive(Debug, Clone, Default)]
pub struct ExistingEnvironmentIndex {
    identifiers: HashSet<String>,
}

impl ExistingEnvironmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the index from environments of one provider. Environments whose
    /// options carry no identifier are ignored.
    pub fn from_environments<'a, I>(provider: Provider, environments: I) -> Self
    where
        I: IntoIterator<Item = &'a Environment>,
    {
        environments
            .into_iter()
            .filter_map(|env| provider.existing_identifier(env))
            .collect()
    }

    /// Walk every environment of `provider` and index its identifier.
    pub async fn fetch(client: &FugueClient, provider: Provider) -> Result<Self> {
        let environments = client.list_all_environments(Some(provider)).await?;
        Ok(Self::from_environments(provider, &environments))
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl FromIterator<String> for ExistingEnvironmentIndex {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        ExistingEnvironmentIndex {
            identifiers: iter.into_iter().collect(),
        }
    }
}
