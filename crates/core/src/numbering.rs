//! Instance number formatting.

use chrono::NaiveDate;

/// Format a workflow instance number: `{template_code}{YYYYMMDD}{seq:04}`.
///
/// The sequence is scoped to the template code and calendar day and must be
/// allocated atomically by the persistence layer; this function only formats.
pub fn instance_number(template_code: &str, day: NaiveDate, seq: i64) -> String {
    format!("{template_code}{}{seq:04}", day.format("%Y%m%d"))
}
