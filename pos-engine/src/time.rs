//! Time helpers for business timezone conversion
//!
//! Date→timestamp conversion happens at the engine boundary; everything
//! below it works on `i64` Unix millis.

use chrono::{NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use shared::{AppError, AppResult, ErrorCode};

/// Parse a date string (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
        AppError::with_message(ErrorCode::InvalidDate, format!("Invalid date format: {}", date))
            .with_detail("date", date)
    })
}

/// Date + hour/minute/second → Unix millis in the business timezone
///
/// DST gap fallback: when the local time does not exist (spring-forward
/// jump), fall back to interpreting the wall time as UTC.
pub fn date_hms_to_millis(date: NaiveDate, hour: u32, min: u32, sec: u32, tz: Tz) -> i64 {
    let naive = date.and_hms_opt(hour, min, sec).unwrap();
    tz.from_local_datetime(&naive)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// Start of day (00:00:00) → Unix millis in the business timezone
pub fn day_start_millis(date: NaiveDate, tz: Tz) -> i64 {
    date_hms_to_millis(date, 0, 0, 0, tz)
}

/// End of day → next day 00:00:00 in the business timezone.
/// Callers use `< end` (exclusive) semantics.
pub fn day_end_millis(date: NaiveDate, tz: Tz) -> i64 {
    let next_day = date.succ_opt().unwrap_or(date);
    date_hms_to_millis(next_day, 0, 0, 0, tz)
}

/// Parse a business-day cutoff string (HH:MM); falls back to 00:00
pub fn parse_cutoff(cutoff: &str) -> NaiveTime {
    NaiveTime::parse_from_str(cutoff, "%H:%M").unwrap_or_else(|e| {
        tracing::warn!(
            "Failed to parse business_day_cutoff '{}': {}, falling back to 00:00",
            cutoff,
            e
        );
        NaiveTime::MIN
    })
}

/// Current business date in the business timezone
///
/// Before the cutoff the venue is still trading on "yesterday's"
/// business day; at or after the cutoff the business date is today.
pub fn current_business_date(now_millis: i64, cutoff: NaiveTime, tz: Tz) -> NaiveDate {
    let now = chrono::DateTime::from_timestamp_millis(now_millis)
        .unwrap_or_else(chrono::Utc::now)
        .with_timezone(&tz);
    if now.time() < cutoff {
        (now - chrono::Duration::days(1)).date_naive()
    } else {
        now.date_naive()
    }
}

/// Year of a timestamp in the business timezone (invoice numbering)
pub fn year_of(now_millis: i64, tz: Tz) -> i32 {
    use chrono::Datelike;
    chrono::DateTime::from_timestamp_millis(now_millis)
        .unwrap_or_else(chrono::Utc::now)
        .with_timezone(&tz)
        .year()
}
