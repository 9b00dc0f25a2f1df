//! Calendar dates for time-range reports.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone};
use gridledger_common::{LedgerError, Result};

/// Accepted date input format.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Display format for transaction timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, DATE_FORMAT)
        .map_err(|e| LedgerError::InvalidDate(format!("{:?}: {}", input, e)))
}

/// Unix timestamps bounding `start 00:00:00 ..= end 23:59:59` in `tz`.
pub fn day_span_in<Tz: TimeZone>(tz: &Tz, start: NaiveDate, end: NaiveDate) -> Result<(i64, i64)> {
    if end < start {
        return Err(LedgerError::InvalidDate(format!(
            "end date {} is before start date {}",
            end, start
        )));
    }

    let from = tz
        .from_local_datetime(&start.and_time(NaiveTime::MIN))
        .earliest()
        .ok_or_else(|| LedgerError::InvalidDate(format!("{} has no local midnight", start)))?;

    let last_second = NaiveTime::from_hms_opt(23, 59, 59)
        .ok_or_else(|| LedgerError::Internal("invalid end-of-day time".to_string()))?;
    let to = tz
        .from_local_datetime(&end.and_time(last_second))
        .latest()
        .ok_or_else(|| LedgerError::InvalidDate(format!("{} has no local end of day", end)))?;

    Ok((from.timestamp(), to.timestamp()))
}

/// Parses two dates and returns their inclusive span in local time.
pub fn date_range(start: &str, end: &str) -> Result<(i64, i64)> {
    day_span_in(&Local, parse_date(start)?, parse_date(end)?)
}

/// Formats a unix timestamp in local time; out-of-range values print raw.
pub fn format_timestamp(timestamp: i64) -> String {
    match DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format(TIMESTAMP_FORMAT)
            .to_string(),
        None => timestamp.to_string(),
    }
}
