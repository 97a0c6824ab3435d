use serde::{Deserialize, Serialize};

use crate::error::{FugueError, Result};

/// A cloud account, subscription or project to register as an environment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountTarget {
    pub name: String,
    pub detail: TargetDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TargetDetail {
    Aws {
        account_id: String,
    },
    Azure {
        tenant_id: String,
        subscription_id: String,
        application_id: String,
        #[serde(skip_serializing)]
        client_secret: Option<String>,
        resource_groups: Vec<String>,
    },
    Google {
        project_id: String,
    },
}

impl AccountTarget {
    pub fn aws(name: impl Into<String>, account_id: impl Into<String>) -> Self {
        AccountTarget {
            name: name.into(),
            detail: TargetDetail::Aws {
                account_id: account_id.into(),
            },
        }
    }

    pub fn google(name: impl Into<String>, project_id: impl Into<String>) -> Self {
        AccountTarget {
            name: name.into(),
            detail: TargetDetail::Google {
                project_id: project_id.into(),
            },
        }
    }

    /// Account id, application id or project id, depending on the provider.
    pub fn identifier(&self) -> &str {
        match &self.detail {
            TargetDetail::Aws { account_id } => account_id,
            TargetDetail::Azure { application_id, .. } => application_id,
            TargetDetail::Google { project_id } => project_id,
        }
    }

    pub fn needs_client_secret(&self) -> bool {
        matches!(&self.detail, TargetDetail::Azure { client_secret, .. }
            if client_secret.as_deref().map_or(true, str::is_empty))
    }

    pub fn set_client_secret(&mut self, secret: &str) {
        if let TargetDetail::Azure { client_secret, .. } = &mut self.detail {
            *client_secret = Some(secret.to_string());
        }
    }
}

/// Apply one prompted client secret to every Azure target that has none.
/// Surrounding whitespace is dropped; a blank secret is rejected. Returns
/// the number of targets updated.
pub fn apply_client_secret(targets: &mut [AccountTarget], secret: &str) -> Result<usize> {
    let secret = secret.trim();
    if secret.is_empty() {
        return Err(FugueError::SecretNotEntered);
    }

    let mut applied = 0;
    for target in targets.iter_mut().filter(|t| t.needs_client_secret()) {
        target.set_client_secret(secret);
        applied += 1;
    }
    Ok(applied)
}
