use chrono::{DateTime, Duration, TimeZone, Utc};

pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Minimum wait between identity changes for one (purchaser, system).
pub fn cooldown_period() -> Duration {
    Duration::days(30)
}

/// Convert a timestamp to epoch milliseconds.
pub fn to_epoch_ms(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

/// Convert epoch milliseconds to a timestamp, falling back to the epoch itself
/// for out-of-range values.
pub fn from_epoch_ms(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Whole days left until `until`, rounded up; zero once it has passed.
pub fn days_remaining(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let diff = to_epoch_ms(until) - to_epoch_ms(now);
    if diff <= 0 {
        0
    } else {
        (diff + DAY_MS - 1) / DAY_MS
    }
}

/// Discord timestamp markup, e.g. `<t:1700000000:D>`.
pub fn discord_timestamp(dt: DateTime<Utc>, style: char) -> String {
    format!("<t:{}:{}>", dt.timestamp(), style)
}
