use thiserror::Error;

#[derive(Debug, Error)]
pub enum FugueError {
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("account discovery failed: {0}")]
    Discovery(String),

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("Secret was not entered.")]
    SecretNotEntered,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<config::ConfigError> for FugueError {
    fn from(err: config::ConfigError) -> Self {
        FugueError::Config(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for FugueError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        FugueError::Auth(format!("could not sign token assertion: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, FugueError>;
