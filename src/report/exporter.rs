use chrono::{DateTime, Local};
use log::{info, warn};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::api::{Environment, FugueClient};
use crate::config::ExportConfig;
use crate::error::Result;
use crate::report::format::ComplianceCsvWriter;
use crate::report::records::{failures_from_rule, ComplianceRecord, ScanContext};

/// Counts for one export run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub environments: usize,
    pub skipped_environments: usize,
    pub rows: usize,
}

/// Walks every environment's latest successful scan into CSV rows.
pub struct ComplianceExporter<'a> {
    client: &'a FugueClient,
    paginate_environments: bool,
}

impl<'a> ComplianceExporter<'a> {
    pub fn new(client: &'a FugueClient) -> Self {
        ComplianceExporter {
            client,
            paginate_environments: false,
        }
    }

    pub fn from_config(client: &'a FugueClient, config: &ExportConfig) -> Self {
        ComplianceExporter {
            client,
            paginate_environments: config.paginate_environments,
        }
    }

    pub fn paginate_environments(mut self, paginate: bool) -> Self {
        self.paginate_environments = paginate;
        self
    }

    async fn environments(&self) -> Result<Vec<Environment>> {
        if self.paginate_environments {
            self.client.list_all_environments(None).await
        } else {
            self.client.list_environments().await
        }
    }

    /// Write every row to `writer`. The header is written by the writer
    /// itself, so an empty tenant still yields a header-only file.
    pub async fn export<W: Write>(&self, writer: &mut ComplianceCsvWriter<W>) -> Result<ExportSummary> {
        let environments = self.environments().await?;
        info!("Exporting compliance for {} environments", environments.len());

        let mut summary = ExportSummary::default();
        for environment in &environments {
            let scan = match self.client.latest_successful_scan(&environment.id).await? {
                Some(scan) => scan,
                None => {
                    warn!(
                        "No successful scan for environment {} ({}); skipping",
                        environment.name, environment.id
                    );
                    summary.skipped_environments += 1;
                    continue;
                }
            };

            let context = ScanContext::new(environment, &scan);
            let rules = self.client.compliance_by_rules(&scan.id).await?;
            let before = writer.rows();
            for rule in &rules {
                for failure in failures_from_rule(rule) {
                    writer.write(&ComplianceRecord::new(failure, &context))?;
                }
            }

            info!(
                "Environment {}: scan {} produced {} rows",
                environment.name,
                scan.id,
                writer.rows() - before
            );
            summary.environments += 1;
        }

        summary.rows = writer.rows();
        Ok(summary)
    }

    /// Export into a new timestamped file under `dir` and return its path.
    pub async fn export_to_dir(&self, dir: &Path) -> Result<(PathBuf, ExportSummary)> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(output_file_name(Local::now()));

        let file = BufWriter::new(File::create(&path)?);
        let mut writer = ComplianceCsvWriter::new(file)?;
        let summary = self.export(&mut writer).await?;
        writer.finish()?;

        info!("Wrote {} rows to {}", summary.rows, path.display());
        Ok((path, summary))
    }
}

/// `compliance-YYYYMMDD-HHMMSS.csv` in local time.
pub fn output_file_name(now: DateTime<Local>) -> String {
    format!("compliance-{}.csv", now.format("%Y%m%d-%H%M%S"))
}
