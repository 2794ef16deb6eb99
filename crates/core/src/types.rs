/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Maximum length of a setting record name (primary key column width).
pub const MAX_SETTING_NAME_LENGTH: usize = 128;
