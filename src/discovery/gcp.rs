use log::{debug, info};
use serde::Deserialize;

use crate::discovery::gcp_auth::GoogleCredentials;
use crate::error::{FugueError, Result};
use crate::onboarding::target::AccountTarget;

pub const RESOURCE_MANAGER_URL: &str = "https://cloudresourcemanager.googleapis.com";
const ACTIVE_FILTER: &str = "lifecycleState:ACTIVE";

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsResponse {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Lists active projects through the Cloud Resource Manager v1 API.
pub struct ProjectDiscovery {
    http: reqwest::Client,
    base_url: String,
    credentials: GoogleCredentials,
}

impl ProjectDiscovery {
    pub fn new(credentials: GoogleCredentials) -> Result<Self> {
        Ok(ProjectDiscovery {
            http: reqwest::Client::builder().build()?,
            base_url: RESOURCE_MANAGER_URL.to_string(),
            credentials,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Active projects, following `nextPageToken` until exhausted.
    pub async fn list_projects(&self) -> Result<Vec<Project>> {
        let token = self.credentials.access_token(&self.http).await?;
        let url = format!("{}/v1/projects", self.base_url.trim_end_matches('/'));
        info!("Listing active Google Cloud projects");

        let mut projects = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("filter", ACTIVE_FILTER.to_string())];
            if let Some(t) = page_token.take() {
                query.push(("pageToken", t));
            }

            let response = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(FugueError::Discovery(format!(
                    "Resource Manager returned {}: {}",
                    status, body
                )));
            }

            let page: ListProjectsResponse = response.json().await?;
            debug!("Resource Manager page with {} projects", page.projects.len());
            projects.extend(page.projects);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(t) => page_token = Some(t),
                None => break,
            }
        }

        Ok(projects)
    }

    pub async fn discover(&self) -> Result<Vec<AccountTarget>> {
        Ok(project_targets(self.list_projects().await?))
    }
}

/// Projects to targets; a project without a display name is named by its id.
pub fn project_targets(projects: Vec<Project>) -> Vec<AccountTarget> {
    projects
        .into_iter()
        .filter(|p| p.lifecycle_state.as_deref().map_or(true, |s| s == "ACTIVE"))
        .map(|p| {
            let name = p.name.unwrap_or_else(|| p.project_id.clone());
            AccountTarget::google(name, p.project_id)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_targets() {
        let projects: Vec<Project> = serde_json::from_str(
            r#"[
                {"projectId": "web-prod", "name": "Web Prod", "lifecycleState": "ACTIVE"},
                {"projectId": "old", "name": "Old", "lifecycleState": "DELETE_REQUESTED"},
                {"projectId": "bare"}
            ]"#,
        )
        .unwrap();

        let targets = project_targets(projects);

        assert_eq!(
            targets,
            vec![
                AccountTarget::google("Web Prod", "web-prod"),
                AccountTarget::google("bare", "bare"),
            ]
        );
    }
}
