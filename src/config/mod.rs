pub mod onboarding;

pub use onboarding::{
    AccountEntry, OnboardingConfig, OnboardingSettings, ProjectEntry, RegionSelection,
    SourceConfig, SubscriptionEntry,
};

use crate::error::{FugueError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "https://api.riskmanager.fugue.co";
pub const DEFAULT_API_VERSION: &str = "v0";

pub const CLIENT_ID_VAR: &str = "FUGUE_API_ID";
pub const CLIENT_SECRET_VAR: &str = "FUGUE_API_SECRET";

/// Printed when the API credentials are not set.
pub const CREDENTIALS_USAGE: &str = "Please follow the user guide at https://docs.fugue.co/api.html#api-user-guide to set 'FUGUE_API_ID' and 'FUGUE_API_SECRET'";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub version: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    pub output_dir: PathBuf,
    pub paginate_environments: bool,
}

impl ApiConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        ApiConfig {
            base_url: DEFAULT_API_URL.to_string(),
            version: DEFAULT_API_VERSION.to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_env() -> Result<Self> {
        load_dotenv();

        let client_id = non_empty_var(CLIENT_ID_VAR)
            .ok_or(FugueError::MissingCredential(CLIENT_ID_VAR))?;
        let client_secret = non_empty_var(CLIENT_SECRET_VAR)
            .ok_or(FugueError::MissingCredential(CLIENT_SECRET_VAR))?;

        Ok(ApiConfig {
            base_url: env::var("FUGUE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            version: env::var("FUGUE_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string()),
            client_id,
            client_secret,
        })
    }
}

impl ExportConfig {
    pub fn from_env() -> Self {
        load_dotenv();

        ExportConfig {
            output_dir: env::var("FUGUE_EXPORT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            paginate_environments: env::var("FUGUE_EXPORT_PAGINATE_ENVIRONMENTS")
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        ExportConfig {
            output_dir: PathBuf::from("."),
            paginate_environments: false,
        }
    }
}

/// Load .env.local first (local overrides), then .env
pub(crate) fn load_dotenv() {
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
