/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Activation period granted by an admin-approved payment (365 days)
pub const ONE_YEAR_MILLIS: i64 = 365 * 24 * 60 * 60 * 1000;
