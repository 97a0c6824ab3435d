use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One page of an offset-paginated listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub next_offset: Option<u64>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Page {
            items,
            is_truncated: false,
            next_offset: None,
        }
    }

    pub fn truncated(items: Vec<T>, next_offset: u64) -> Self {
        Page {
            items,
            is_truncated: true,
            next_offset: Some(next_offset),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
    pub provider: String,
    /// Keyed by provider tag, e.g. `{"aws": {"role_arn": ..., "regions": [...]}}`.
    #[serde(default)]
    pub provider_options: HashMap<String, ProviderSettings>,
}

/// Union of the provider option fields the tools read back.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderSettings {
    #[serde(default)]
    pub role_arn: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub regions: Option<Vec<String>>,
    #[serde(default)]
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl Environment {
    /// Options stored under the environment's own provider tag.
    pub fn settings(&self) -> Option<&ProviderSettings> {
        self.provider_options.get(&self.provider)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scan {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub finished_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleCompliance {
    pub family: String,
    pub rule: String,
    #[serde(default)]
    pub failed_resource_types: Vec<FailedResourceType>,
    #[serde(default)]
    pub failed_resources: Vec<FailedResource>,
    #[serde(default)]
    pub unsurveyed_resource_types: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedResourceType {
    pub resource_type: String,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedResource {
    pub resource: ResourceRef,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRef {
    pub resource_type: String,
    #[serde(default)]
    pub resource_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedEnvironment {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResourceTypeCatalog {
    pub resource_types: Vec<String>,
}
