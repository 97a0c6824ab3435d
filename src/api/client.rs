use log::debug;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::pagination::Paginator;
use crate::api::types::{
    CreatedEnvironment, Environment, Page, ResourceTypeCatalog, RuleCompliance, Scan,
};
use crate::config::ApiConfig;
use crate::error::{FugueError, Result};
use crate::onboarding::definition::EnvironmentDefinition;
use crate::onboarding::provider::Provider;

/// Page size used when walking environment listings.
pub const ENVIRONMENT_PAGE_SIZE: u32 = 100;

/// Authenticated client for the Fugue REST API.
#[derive(Debug, Clone)]
pub struct FugueClient {
    http: reqwest::Client,
    config: ApiConfig,
}

/// Result of `POST environments`. Anything but 201 is reported, not raised.
#[derive(Debug, Clone)]
pub enum CreateResponse {
    Created(CreatedEnvironment),
    Rejected { status: u16, body: String },
}

impl FugueClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("fugue-automation/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(FugueClient { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.version,
            path.trim_matches('/')
        )
    }

    async fn get<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let url = self.url(path);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .query(query)
            .send()
            .await?;

        Self::read_json(response).await
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FugueError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    /// Single, unpaginated `GET environments`.
    pub async fn list_environments(&self) -> Result<Vec<Environment>> {
        let page: Page<Environment> = self.get("environments", &[] as &[(&str, &str)]).await?;
        Ok(page.items)
    }

    /// One page of environments, optionally filtered by provider.
    pub async fn list_environments_page(
        &self,
        provider: Option<Provider>,
        offset: u64,
        max_items: u32,
    ) -> Result<Page<Environment>> {
        let mut query = vec![
            ("offset", offset.to_string()),
            ("max_items", max_items.to_string()),
        ];
        if let Some(provider) = provider {
            query.insert(0, ("q.provider", provider.as_str().to_string()));
        }
        self.get("environments", &query).await
    }

    /// Every environment, walking all pages.
    pub async fn list_all_environments(&self, provider: Option<Provider>) -> Result<Vec<Environment>> {
        Paginator::new(move |offset| self.list_environments_page(provider, offset, ENVIRONMENT_PAGE_SIZE))
            .collect_all()
            .await
    }

    pub async fn list_scans(
        &self,
        environment_id: &str,
        status: &str,
        max_items: u32,
    ) -> Result<Vec<Scan>> {
        let query = [
            ("environment_id", environment_id.to_string()),
            ("status", status.to_string()),
            ("max_items", max_items.to_string()),
        ];
        let page: Page<Scan> = self.get("scans", &query).await?;
        Ok(page.items)
    }

    /// Most recent successful scan, or `None` if the environment has none yet.
    pub async fn latest_successful_scan(&self, environment_id: &str) -> Result<Option<Scan>> {
        let scans = self.list_scans(environment_id, "SUCCESS", 1).await?;
        Ok(scans.into_iter().next())
    }

    pub async fn compliance_by_rules_page(&self, scan_id: &str, offset: u64) -> Result<Page<RuleCompliance>> {
        let path = format!("scans/{}/compliance_by_rules", scan_id);
        self.get(&path, &[("offset", offset)]).await
    }

    /// All compliance-by-rule results for a scan.
    pub async fn compliance_by_rules(&self, scan_id: &str) -> Result<Vec<RuleCompliance>> {
        Paginator::new(move |offset| self.compliance_by_rules_page(scan_id, offset))
            .collect_all()
            .await
    }

    /// Supported resource types for a provider in one region. Beta types
    /// are included unless the provider opts out.
    pub async fn resource_types(&self, provider: Provider, region: &str) -> Result<Vec<String>> {
        let path = format!("metadata/{}/resource_types", provider.as_str());
        let beta = if provider.includes_beta_resources() { "true" } else { "false" };
        let query = [("region", region), ("beta_resources", beta)];
        let catalog: ResourceTypeCatalog = self.get(&path, &query).await?;
        Ok(catalog.resource_types)
    }

    pub async fn create_environment(&self, definition: &EnvironmentDefinition) -> Result<CreateResponse> {
        let url = self.url("environments");
        debug!("POST {} ({})", url, definition.name);

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .json(definition)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CREATED {
            Ok(CreateResponse::Created(response.json().await?))
        } else {
            Ok(CreateResponse::Rejected {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            })
        }
    }
}
