use anyhow::Result;
use log::info;

use fugue_automation::api::FugueClient;
use fugue_automation::config::{ApiConfig, ExportConfig, CREDENTIALS_USAGE};
use fugue_automation::error::FugueError;
use fugue_automation::report::ComplianceExporter;

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
    let export_config = ExportConfig::from_env();

    let client = FugueClient::new(api_config)?;
    let (path, summary) = ComplianceExporter::from_config(&client, &export_config)
        .export_to_dir(&export_config.output_dir)
        .await?;

    info!(
        "{} environments exported, {} without a successful scan",
        summary.environments, summary.skipped_environments
    );
    println!("Wrote {}", path.display());
    Ok(())
}
