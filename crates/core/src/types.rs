/// Every entity is keyed by a random v4 UUID.
pub type EntityId = uuid::Uuid;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (event and planning dates) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Generate a fresh, globally unique entity identifier.
pub fn new_id() -> EntityId {
    uuid::Uuid::new_v4()
}
