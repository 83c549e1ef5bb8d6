//! Database rows and their conversion into domain records.

use chrono::{DateTime, Utc};
use rsvp_core::store::StoreError;
use rsvp_core::types::{
    Capacity, Event, EventDate, EventId, Registration, User, UserId, UserRegistration,
};
use sqlx::FromRow;

/// Column list matching [`EventRow`].
pub(crate) const EVENT_COLUMNS: &str =
    "event_id, title, description, date, location, capacity, organizer, status, has_waitlist";

/// Column list matching [`RegistrationRow`].
pub(crate) const REGISTRATION_COLUMNS: &str = "user_id, event_id, status, registered_at";

fn decode<E: std::fmt::Display>(table: &'static str) -> impl Fn(E) -> StoreError {
    move |e| StoreError::SerializationError(format!("invalid {table} row: {e}"))
}

#[derive(Debug, FromRow)]
pub(crate) struct EventRow {
    event_id: String,
    title: String,
    description: String,
    date: String,
    location: String,
    capacity: i32,
    organizer: String,
    status: String,
    has_waitlist: bool,
}

impl TryFrom<EventRow> for Event {
    type Error = StoreError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            event_id: EventId::new(row.event_id),
            title: row.title,
            description: row.description,
            date: EventDate::new(row.date).map_err(decode("event"))?,
            location: row.location,
            capacity: Capacity::new(i64::from(row.capacity)).map_err(decode("event"))?,
            organizer: row.organizer,
            status: row.status.parse().map_err(decode("event"))?,
            has_waitlist: row.has_waitlist,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct UserRow {
    user_id: String,
    name: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            user_id: UserId::new(row.user_id),
            name: row.name,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RegistrationRow {
    user_id: String,
    event_id: String,
    status: String,
    registered_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = StoreError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::new(row.user_id),
            event_id: EventId::new(row.event_id),
            status: row.status.parse().map_err(decode("registration"))?,
            registered_at: row.registered_at,
        })
    }
}

/// A registration joined with its event's title.
#[derive(Debug, FromRow)]
pub(crate) struct UserRegistrationRow {
    #[sqlx(flatten)]
    registration: RegistrationRow,
    event_title: Option<String>,
}

impl TryFrom<UserRegistrationRow> for UserRegistration {
    type Error = StoreError;

    fn try_from(row: UserRegistrationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            registration: row.registration.try_into()?,
            event_title: row.event_title,
        })
    }
}

/// Convert a batch of rows, failing on the first undecodable one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>, StoreError>
where
    T: TryFrom<R, Error = StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}
