/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Note IDs assigned by Anki are millisecond epoch integers.
pub type NoteId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
