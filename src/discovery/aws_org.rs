use aws_config::meta::region::RegionProviderChain;
use aws_config::BehaviorVersion;
use aws_sdk_organizations::error::DisplayErrorContext;
use aws_sdk_organizations::types::AccountStatus;
use log::{debug, info};
use std::future::Future;

use crate::error::{FugueError, Result};
use crate::onboarding::target::AccountTarget;

/// Organizations is a global service served from us-east-1.
const ORGANIZATIONS_REGION: &str = "us-east-1";

/// Member account as listed by Organizations.
#[derive(Debug, Clone, PartialEq)]
pub struct OrgAccount {
    pub name: String,
    pub id: String,
    pub active: bool,
}

/// Lists the member accounts of an AWS Organization.
pub struct OrganizationsDiscovery {
    profile: Option<String>,
}

impl OrganizationsDiscovery {
    pub fn new(profile: Option<String>) -> Self {
        OrganizationsDiscovery { profile }
    }

    async fn client(&self) -> aws_sdk_organizations::Client {
        let region = RegionProviderChain::default_provider().or_else(ORGANIZATIONS_REGION);
        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region);
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        let config = loader.load().await;
        aws_sdk_organizations::Client::new(&config)
    }

    /// Every account in the organization, following `NextToken` until the
    /// listing is complete.
    pub async fn list_accounts(&self) -> Result<Vec<OrgAccount>> {
        info!(
            "Listing AWS Organizations accounts (profile: {})",
            self.profile.as_deref().unwrap_or("default")
        );
        let client = self.client().await;

        let accounts = walk_account_pages(|next_token| {
            let request = client.list_accounts().set_next_token(next_token);
            async move {
                let response = request
                    .send()
                    .await
                    .map_err(|e| FugueError::Discovery(DisplayErrorContext(&e).to_string()))?;

                let accounts: Vec<OrgAccount> = response
                    .accounts()
                    .iter()
                    .map(|account| OrgAccount {
                        name: account.name().unwrap_or_default().to_string(),
                        id: account.id().unwrap_or_default().to_string(),
                        active: account.status() == Some(&AccountStatus::Active),
                    })
                    .collect();
                Ok::<_, FugueError>((accounts, response.next_token().map(str::to_string)))
            }
        })
        .await?;

        debug!("Organizations returned {} accounts", accounts.len());
        Ok(accounts)
    }

    pub async fn discover(&self) -> Result<Vec<AccountTarget>> {
        let accounts = self.list_accounts().await?;
        Ok(active_targets(accounts))
    }
}

/// Drive a `NextToken`-paged listing: each fetch gets the previous page's
/// token (`None` first) and the walk ends on the first page without one.
pub async fn walk_account_pages<F, Fut>(mut fetch: F) -> Result<Vec<OrgAccount>>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<OrgAccount>, Option<String>)>>,
{
    let mut accounts = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let (page, token) = fetch(next_token.take()).await?;
        accounts.extend(page);

        match token.filter(|t| !t.is_empty()) {
            Some(token) => next_token = Some(token),
            None => break,
        }
    }
    Ok(accounts)
}

/// Keep active accounts, in listing order.
pub fn active_targets(accounts: Vec<OrgAccount>) -> Vec<AccountTarget> {
    accounts
        .into_iter()
        .filter(|a| a.active && !a.id.is_empty())
        .map(|a| AccountTarget::aws(a.name, a.id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn account(id: &str) -> OrgAccount {
        OrgAccount {
            name: format!("acct-{}", id),
            id: id.to_string(),
            active: true,
        }
    }

    #[tokio::test]
    async fn test_walk_follows_next_token() {
        let requested = RefCell::new(Vec::new());

        let accounts = walk_account_pages(|token: Option<String>| {
            requested.borrow_mut().push(token.clone());
            let page = match token.as_deref() {
                None => (vec![account("1"), account("2")], Some("t1".to_string())),
                Some("t1") => (vec![account("3")], Some("t2".to_string())),
                _ => (vec![account("4")], None),
            };
            async move { Ok::<_, FugueError>(page) }
        })
        .await
        .unwrap();

        let ids: Vec<&str> = accounts.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
        assert_eq!(
            requested.into_inner(),
            vec![None, Some("t1".to_string()), Some("t2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_walk_stops_on_error() {
        let calls = RefCell::new(0);

        let result = walk_account_pages(|_token| {
            *calls.borrow_mut() += 1;
            let n = *calls.borrow();
            async move {
                if n == 1 {
                    Ok((vec![account("1")], Some("t1".to_string())))
                } else {
                    Err(FugueError::Discovery("AccessDenied".to_string()))
                }
            }
        })
        .await;

        assert!(matches!(result, Err(FugueError::Discovery(_))));
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn test_only_active_accounts_are_kept() {
        let accounts = vec![
            OrgAccount {
                name: "Prod".to_string(),
                id: "111111111111".to_string(),
                active: true,
            },
            OrgAccount {
                name: "Closed".to_string(),
                id: "222222222222".to_string(),
                active: false,
            },
            OrgAccount {
                name: "Sandbox".to_string(),
                id: "333333333333".to_string(),
                active: true,
            },
        ];

        let targets = active_targets(accounts);

        assert_eq!(
            targets,
            vec![
                AccountTarget::aws("Prod", "111111111111"),
                AccountTarget::aws("Sandbox", "333333333333"),
            ]
        );
    }
}
