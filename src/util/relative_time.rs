//! Elapsed-time formatting for post timestamps.

use time::OffsetDateTime;

const SECONDS_PER_MINUTE: i64 = 60;
const MINUTES_PER_HOUR: i64 = 60;
const HOURS_PER_DAY: i64 = 24;
const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = 365;

/// Format the time elapsed since `instant` as a Japanese "〜前" string.
///
/// Evaluated against the wall clock at call time, so the result is only
/// stable within the page's revalidation window and must not be memoized
/// beyond it. Future timestamps clamp to `0秒前`.
pub fn format_relative(instant: OffsetDateTime) -> String {
    let elapsed = OffsetDateTime::now_utc().unix_timestamp() - instant.unix_timestamp();
    format_elapsed(elapsed)
}

/// Bucket an elapsed duration in seconds, first match wins, floor division
/// throughout.
///
/// The month bucket divides the day count by 30 while the year bucket
/// divides by 365; the two disagree between 360 and 364 days, which
/// therefore format as `0年前`. The mismatch is part of the observed
/// output contract and is kept as-is.
pub fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    if seconds < SECONDS_PER_MINUTE {
        return format!("{seconds}秒前");
    }
    let minutes = seconds / SECONDS_PER_MINUTE;
    if minutes < MINUTES_PER_HOUR {
        return format!("{minutes}分前");
    }
    let hours = minutes / MINUTES_PER_HOUR;
    if hours < HOURS_PER_DAY {
        return format!("{hours}時間前");
    }
    let days = hours / HOURS_PER_DAY;
    if days < DAYS_PER_MONTH {
        return format!("{days}日前");
    }
    let months = days / DAYS_PER_MONTH;
    if months < 12 {
        return format!("{months}ヶ月前");
    }
    format!("{}年前", days / DAYS_PER_YEAR)
}
