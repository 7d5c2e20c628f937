//! Shared utility functions for SNOTEL crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    /// Calendar date format used on the command line and in AWDB queries.
    pub const DATE_FORMAT: &str = "%Y-%m-%d";

    /// Timestamp format used by AWDB for record begin/end and hourly values.
    pub const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format(DATE_FORMAT).to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)?)
    }

    /// Parse an AWDB timestamp, which is either "YYYY-MM-DD HH:MM" or a
    /// bare "YYYY-MM-DD" (daily values). Bare dates resolve to midnight.
    pub fn parse_date_time(s: &str) -> chrono::ParseResult<NaiveDateTime> {
        let s = s.trim();
        match NaiveDateTime::parse_from_str(s, DATE_TIME_FORMAT) {
            Ok(dt) => Ok(dt),
            Err(_) => NaiveDate::parse_from_str(s, DATE_FORMAT)
                .map(|date| date.and_time(NaiveTime::MIN)),
        }
    }

}
