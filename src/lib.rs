pub mod api;
pub mod config;
pub mod discovery;
pub mod error;
pub mod onboarding;
pub mod report;

pub use error::{FugueError, Result};
