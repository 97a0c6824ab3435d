use std::io::Write;

use crate::error::Result;
use crate::report::records::ComplianceRecord;

/// Output column order.
pub const COLUMNS: [&str; 12] = [
    "environment_name",
    "account",
    "region",
    "family",
    "control",
    "resource_type",
    "resource_id",
    "day",
    "time",
    "message",
    "environment_id",
    "scan_id",
];

const MESSAGE_COLUMN: &str = "message";
const MISSING_VALUE: &str = "-";

/// Values this long or longer are left unwrapped.
const FORMULA_WRAP_LIMIT: usize = 64;

/// Commas become spaces and double quotes are dropped.
pub fn sanitize_message(message: &str) -> String {
    message.replace(',', " ").replace('"', "")
}

/// Wrap short values as `"=""value"""` so spreadsheets keep them as text.
pub fn quote_for_spreadsheet(value: &str) -> String {
    if value.chars().count() < FORMULA_WRAP_LIMIT {
        format!("\"=\"\"{}\"\"\"", value)
    } else {
        value.to_string()
    }
}

/// Render one field: default missing values, wrap non-message columns,
/// then collapse whitespace runs to single spaces.
pub fn format_value(column: &str, value: Option<&str>) -> String {
    let value = value.unwrap_or(MISSING_VALUE);
    let value = if column == MESSAGE_COLUMN {
        value.to_string()
    } else {
        quote_for_spreadsheet(value)
    };
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn format_record(record: &ComplianceRecord) -> Vec<String> {
    COLUMNS
        .iter()
        .map(|column| format_value(column, record.field(column)))
        .collect()
}

/// Writes the header and pre-formatted rows. Fields already carry their
/// own quoting, so the writer never adds any.
pub struct ComplianceCsvWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> ComplianceCsvWriter<W> {
    pub fn new(writer: W) -> Result<Self> {
        let mut inner = csv::WriterBuilder::new()
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(writer);
        inner.write_record(COLUMNS)?;
        Ok(ComplianceCsvWriter { inner, rows: 0 })
    }

    pub fn write(&mut self, record: &ComplianceRecord) -> Result<()> {
        self.inner.write_record(format_record(record))?;
        self.rows += 1;
        Ok(())
    }

    /// Rows written so far, header excluded.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<usize> {
        self.inner.flush()?;
        Ok(self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ComplianceRecord {
        ComplianceRecord {
            family: "CIS".to_string(),
            control: "CIS 2.1".to_string(),
            resource_type: "AWS.S3.Bucket".to_string(),
            resource_id: None,
            message: "bucket  is\tpublic".to_string(),
            environment_id: "env-1".to_string(),
            environment_name: "Prod".to_string(),
            account: "123456789012".to_string(),
            region: Some("us-east-1".to_string()),
            scan_id: "scan-1".to_string(),
            day: Some("2020-01-02".to_string()),
            time: Some("03:04:05".to_string()),
        }
    }

    #[test]
    fn test_sanitize_message() {
        assert_eq!(sanitize_message("a,b \"c\""), "a b c");
    }

    #[test]
    fn test_short_values_are_wrapped() {
        assert_eq!(quote_for_spreadsheet("abc"), "\"=\"\"abc\"\"\"");
        let long = "x".repeat(64);
        assert_eq!(quote_for_spreadsheet(&long), long);
        let just_under = "x".repeat(63);
        assert_eq!(quote_for_spreadsheet(&just_under), format!("\"=\"\"{}\"\"\"", just_under));
    }

    #[test]
    fn test_missing_value_is_dash() {
        assert_eq!(format_value("resource_id", None), "\"=\"\"-\"\"\"");
        assert_eq!(format_value("message", None), "-");
    }

    #[test]
    fn test_message_is_not_wrapped_but_collapsed() {
        assert_eq!(format_value("message", Some("  a \n b\t c ")), "a b c");
    }

    #[test]
    fn test_whitespace_inside_wrapped_value() {
        assert_eq!(format_value("environment_name", Some("My  Env")), "\"=\"\"My Env\"\"\"");
    }

    #[test]
    fn test_format_record_column_order() {
        let row = format_record(&record());
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(row[0], "\"=\"\"Prod\"\"\"");
        assert_eq!(row[6], "\"=\"\"-\"\"\"");
        assert_eq!(row[9], "bucket is public");
        assert_eq!(row[11], "\"=\"\"scan-1\"\"\"");
    }

    #[test]
    fn test_commas_and_quotes_outside_message_stay_wrapped() {
        let mut rec = record();
        rec.environment_name = "a,\"b\",c".to_string();
        rec.message = sanitize_message("a,\"b\",c");

        let row = format_record(&rec);

        assert_eq!(row[0], "\"=\"\"a,\"b\",c\"\"\"");
        assert_eq!(row[9], "a b c");
    }

    #[test]
    fn test_writer_emits_header_and_unquoted_rows() {
        let mut buf = Vec::new();
        {
            let mut writer = ComplianceCsvWriter::new(&mut buf).unwrap();
            writer.write(&record()).unwrap();
            assert_eq!(writer.finish().unwrap(), 1);
        }
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], COLUMNS.join(","));
        assert!(lines[1].starts_with("\"=\"\"Prod\"\"\",\"=\"\"123456789012\"\"\","));
        assert!(lines[1].contains(",bucket is public,"));
    }
}
