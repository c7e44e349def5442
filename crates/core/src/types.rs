/// Primary keys and allocated uid/gid values; BIGSERIAL/BIGINT in the
/// membership schema.
pub type DbId = i64;

/// All timestamps are stored and handled in UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
