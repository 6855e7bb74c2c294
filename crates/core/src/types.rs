/// Primary keys are generated application-side as UUIDv7 so both storage
/// backends hand out the same kind of identifier.
pub type RecordId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Generate a new time-ordered record identifier.
pub fn new_record_id() -> RecordId {
    uuid::Uuid::now_v7()
}
