use anyhow::{Context, Result};
use log::{error, info};
use rpassword::read_password;
use std::io::{self, Write};

use fugue_automation::api::FugueClient;
use fugue_automation::config::{ApiConfig, OnboardingConfig, CREDENTIALS_USAGE};
use fugue_automation::discovery::AccountSource;
use fugue_automation::error::FugueError;
use fugue_automation::onboarding::{apply_client_secret, AccountTarget, Onboarder};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let api_config = match ApiConfig::from_env() {
        Ok(config) => config,
        Err(FugueError::MissingCredential(_)) => {
            eprintln!("{}", CREDENTIALS_USAGE);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let config = OnboardingConfig::from_env().context("Failed to load onboarding configuration")?;
    let settings = config.validate()?;
    info!(
        "Onboarding {} targets (source: {:?})",
        settings.provider, config.source
    );

    let mut targets = AccountSource::from_config(&config)?.targets().await?;
    info!("{} targets to onboard", targets.len());

    if config.prompt_client_secret {
        apply_prompted_secret(&mut targets)?;
    }

    let client = FugueClient::new(api_config)?;
    let summary = Onboarder::new(&client, &settings).run(&targets).await?;

    info!(
        "Onboarding finished: {} created, {} skipped, {} failed",
        summary.created(),
        summary.skipped(),
        summary.failed()
    );
    if summary.failed() > 0 {
        error!("{} environment(s) could not be created", summary.failed());
    }

    Ok(())
}

/// Ask once for the Azure client secret when some target has none.
fn apply_prompted_secret(targets: &mut [AccountTarget]) -> Result<()> {
    if !targets.iter().any(AccountTarget::needs_client_secret) {
        return Ok(());
    }

    print!("Enter client secret: ");
    io::stdout().flush()?;
    let secret = read_password()?;

    let applied = apply_client_secret(targets, &secret)?;
    info!("Client secret applied to {} subscription(s)", applied);
    Ok(())
}
