use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::api::{Environment, RuleCompliance, Scan};
use crate::report::format::sanitize_message;

/// Message used for resource types the scan never surveyed.
pub const UNSURVEYED_MESSAGE: &str = "Resource type was not scanned";

const NO_VALUE: &str = "-";

/// One failure message of one rule, before scan metadata is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFailure {
    pub family: String,
    pub control: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub message: String,
}

/// Environment and scan fields shared by every row of one scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanContext {
    pub environment_id: String,
    pub environment_name: String,
    pub account: String,
    pub region: Option<String>,
    pub scan_id: String,
    pub day: Option<String>,
    pub time: Option<String>,
}

/// One CSV row: a single failure message with its scan metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceRecord {
    pub family: String,
    pub control: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub message: String,
    pub environment_id: String,
    pub environment_name: String,
    pub account: String,
    pub region: Option<String>,
    pub scan_id: String,
    pub day: Option<String>,
    pub time: Option<String>,
}

impl ComplianceRecord {
    pub fn new(failure: RuleFailure, context: &ScanContext) -> Self {
        ComplianceRecord {
            family: failure.family,
            control: failure.control,
            resource_type: failure.resource_type,
            resource_id: failure.resource_id,
            message: failure.message,
            environment_id: context.environment_id.clone(),
            environment_name: context.environment_name.clone(),
            account: context.account.clone(),
            region: context.region.clone(),
            scan_id: context.scan_id.clone(),
            day: context.day.clone(),
            time: context.time.clone(),
        }
    }

    /// Raw value of a named column; `None` renders as `-`.
    pub fn field(&self, column: &str) -> Option<&str> {
        match column {
            "environment_name" => Some(&self.environment_name),
            "account" => Some(&self.account),
            "region" => self.region.as_deref(),
            "family" => Some(&self.family),
            "control" => Some(&self.control),
            "resource_type" => Some(&self.resource_type),
            "resource_id" => self.resource_id.as_deref(),
            "day" => self.day.as_deref(),
            "time" => self.time.as_deref(),
            "message" => Some(&self.message),
            "environment_id" => Some(&self.environment_id),
            "scan_id" => Some(&self.scan_id),
            _ => None,
        }
    }
}

/// Flatten a rule into one failure per message: failed resource types,
/// then failed resources, then unsurveyed resource types.
pub fn failures_from_rule(rule: &RuleCompliance) -> Vec<RuleFailure> {
    let failure = |resource_type: &str, resource_id: Option<&str>, message: &str| RuleFailure {
        family: rule.family.clone(),
        control: rule.rule.clone(),
        resource_type: resource_type.to_string(),
        resource_id: resource_id.map(str::to_string),
        message: sanitize_message(message),
    };

    let mut failures = Vec::new();
    for failed in &rule.failed_resource_types {
        for message in &failed.messages {
            failures.push(failure(&failed.resource_type, None, message));
        }
    }
    for failed in &rule.failed_resources {
        for message in &failed.messages {
            failures.push(failure(
                &failed.resource.resource_type,
                failed.resource.resource_id.as_deref(),
                message,
            ));
        }
    }
    for resource_type in &rule.unsurveyed_resource_types {
        failures.push(failure(resource_type, None, UNSURVEYED_MESSAGE));
    }
    failures
}

impl ScanContext {
    pub fn new(environment: &Environment, scan: &Scan) -> Self {
        let (day, time) = match scan.finished_at.and_then(split_timestamp) {
            Some((day, time)) => (Some(day), Some(time)),
            None => (None, None),
        };

        ScanContext {
            environment_id: environment.id.clone(),
            environment_name: environment.name.clone(),
            account: account_from_environment(environment),
            region: region_from_environment(environment),
            scan_id: scan.id.clone(),
            day,
            time,
        }
    }
}

/// AWS account id or Azure subscription id; `-` for anything else.
pub fn account_from_environment(environment: &Environment) -> String {
    let settings = environment.settings();
    let account = match environment.provider.as_str() {
        "aws" | "aws_govcloud" => settings
            .and_then(|s| s.role_arn.as_deref())
            .map(account_from_role_arn),
        "azure" => settings.and_then(|s| s.subscription_id.clone()),
        _ => None,
    };
    account.unwrap_or_else(|| NO_VALUE.to_string())
}

/// Region list for AWS environments, the single region for GovCloud.
pub fn region_from_environment(environment: &Environment) -> Option<String> {
    let settings = environment.settings()?;
    match environment.provider.as_str() {
        "aws" => settings
            .region
            .clone()
            .or_else(|| settings.regions.as_ref().map(|r| r.join(","))),
        "aws_govcloud" => settings.region.clone(),
        _ => None,
    }
}

/// Account segment of a well-formed (six field) IAM role ARN.
pub fn account_from_role_arn(role_arn: &str) -> String {
    let parts: Vec<&str> = role_arn.split(':').collect();
    if parts.len() == 6 {
        parts[4].to_string()
    } else {
        NO_VALUE.to_string()
    }
}

/// UTC `(YYYY-MM-DD, HH:MM:SS)` for a unix timestamp.
pub fn split_timestamp(ts: i64) -> Option<(String, String)> {
    let dt = DateTime::<Utc>::from_timestamp(ts, 0)?;
    Some((dt.format("%Y-%m-%d").to_string(), dt.format("%H:%M:%S").to_string()))
}
