/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Display format used for timestamps in admin pages.
pub const DISPLAY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Format a timestamp for display in a listing or detail page.
pub fn display_timestamp(ts: &Timestamp) -> String {
    ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string()
}
