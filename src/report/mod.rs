pub mod exporter;
pub mod format;
pub mod records;

pub use exporter::{output_file_name, ComplianceExporter, ExportSummary};
pub use format::{format_value, quote_for_spreadsheet, sanitize_message, ComplianceCsvWriter, COLUMNS};
pub use records::{
    account_from_role_arn, failures_from_rule, ComplianceRecord, RuleFailure, ScanContext,
    UNSURVEYED_MESSAGE,
};
